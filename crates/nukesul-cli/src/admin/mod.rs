//! Back-office command handlers.
//!
//! Every subcommand opens an [`AdminConsole`] first, which validates the
//! stored token and loads all collections. A missing or rejected token ends
//! the command with the login route instead of running it.

mod catalog;
mod products;

use std::sync::Arc;

use anyhow::bail;
use clap::{Args, Subcommand};
use nukesul_api::ApiClient;
use nukesul_core::AppConfig;
use nukesul_store::{AdminConsole, AdminGate, AdminOptions, AdminTab, KeyValueStore, StoreError};

/// Sub-commands available under `admin`.
#[derive(Debug, Subcommand)]
pub enum AdminCommands {
    /// Show every tab with its item count
    Overview,
    /// Registered users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Branches
    Branches {
        #[command(subcommand)]
        command: BranchCommands,
    },
    /// Categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Subcategories
    Subcategories {
        #[command(subcommand)]
        command: SubcategoryCommands,
    },
    /// Products
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserCommands {
    List,
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum BranchCommands {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        city: String,
    },
    /// Update a branch; omitted fields keep their current value
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommands {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        emoji: String,
    },
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum SubcategoryCommands {
    List,
    Create {
        #[arg(long)]
        name: String,
        /// Parent category id
        #[arg(long)]
        category: i64,
    },
    /// Update a subcategory; omitted fields keep their current value
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<i64>,
    },
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProductCommands {
    List,
    Create {
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Update a product. Without `--id` the saved draft is used.
    Update {
        #[arg(long)]
        id: Option<i64>,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Start editing a product and save it as the draft
    Edit {
        #[arg(long)]
        id: i64,
    },
    /// Drop the saved draft
    CancelEdit,
    Delete {
        #[arg(long)]
        id: i64,
    },
}

/// Product form inputs. Omitted fields keep the form's current value.
#[derive(Debug, Default, Args)]
pub struct ProductFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub branch: Option<i64>,
    #[arg(long)]
    pub category: Option<i64>,
    #[arg(long)]
    pub subcategory: Option<i64>,
    /// Price for subcategories without size tiers
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub small: Option<String>,
    #[arg(long)]
    pub medium: Option<String>,
    #[arg(long)]
    pub large: Option<String>,
    /// Image file to upload
    #[arg(long)]
    pub image: Option<std::path::PathBuf>,
}

/// Dispatch an `admin` subcommand.
///
/// # Errors
///
/// Returns an error if there is no valid admin session or the action fails.
pub(crate) async fn run_admin(
    config: &AppConfig,
    api: &ApiClient,
    store: Arc<dyn KeyValueStore>,
    command: AdminCommands,
) -> anyhow::Result<()> {
    let mut console = open_console(config, api, store).await?;
    if let Some(banner) = console.error() {
        eprintln!("warning: {banner}");
    }

    match command {
        AdminCommands::Overview => {
            run_overview(&console);
            Ok(())
        }
        AdminCommands::Users { command } => catalog::run_users(&mut console, command).await,
        AdminCommands::Branches { command } => catalog::run_branches(&mut console, command).await,
        AdminCommands::Categories { command } => {
            catalog::run_categories(&mut console, command).await
        }
        AdminCommands::Subcategories { command } => {
            catalog::run_subcategories(&mut console, command).await
        }
        AdminCommands::Products { command } => products::run_products(&mut console, command).await,
    }
}

async fn open_console(
    config: &AppConfig,
    api: &ApiClient,
    store: Arc<dyn KeyValueStore>,
) -> anyhow::Result<Box<AdminConsole>> {
    match AdminConsole::open(api, store, AdminOptions::from_config(config)).await? {
        AdminGate::Ready(console) => Ok(console),
        AdminGate::Redirect(route) => {
            bail!("not logged in or session expired; run `login` first ({route})")
        }
    }
}

fn run_overview(console: &AdminConsole) {
    println!("{:<28}{:<22}COUNT", "TAB", "KEY");
    for tab in AdminTab::ALL {
        let count = match tab {
            AdminTab::Users => console.users().len(),
            AdminTab::Branch | AdminTab::ManageBranches => console.branches().len(),
            AdminTab::Category => console.categories().len(),
            AdminTab::Subcategory | AdminTab::ManageSubcategories => {
                console.subcategories().len()
            }
        };
        println!("{:<28}{:<22}{count}", tab.label(), tab.as_str());
    }
    println!("{:<28}{:<22}{}", "Продукты", "products", console.products().len());
    if let Some(product) = console.editing_product() {
        println!();
        println!("draft: editing product {} ({})", product.id, product.display_name());
    }
}

/// Print the console's success message, or turn a failure into an error
/// carrying the banner text.
fn report(console: &AdminConsole, result: Result<(), StoreError>) -> anyhow::Result<()> {
    match result {
        Ok(()) => {
            if let Some(message) = console.message() {
                println!("{message}");
            }
            Ok(())
        }
        Err(e) => {
            let banner = console.error().map(str::to_owned);
            match banner {
                Some(banner) => Err(anyhow::Error::new(e).context(banner)),
                None => Err(e.into()),
            }
        }
    }
}
