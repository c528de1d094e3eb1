mod admin;
mod shop;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use nukesul_api::ApiClient;
use nukesul_core::{load_app_config, Size};
use nukesul_store::{FileStore, KeyValueStore};
use tracing_subscriber::EnvFilter;

use crate::admin::AdminCommands;

#[derive(Debug, Parser)]
#[command(name = "nukesul")]
#[command(about = "Storefront and back-office client for the nukesul food-ordering API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List branches
    Branches,
    /// Show a branch's menu grouped by category
    Menu {
        /// Branch id
        #[arg(long)]
        branch: i64,
    },
    /// Add a product to the cart
    Add {
        /// Branch id the product is ordered from
        #[arg(long)]
        branch: i64,
        /// Product id
        #[arg(long)]
        product: i64,
        /// small, medium or large (s/m/l accepted)
        #[arg(long, default_value = "small")]
        size: Size,
    },
    /// Inspect or reset the persisted cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
    /// Show the checkout summary and route
    Checkout,
    /// Log in to the admin API and store the token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "NUKESUL_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored admin token
    Logout,
    /// Back-office management (requires `login`)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Debug, Subcommand)]
enum CartCommands {
    /// Print cart lines and total
    Show {
        /// Print the persisted JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("nukesul: no command given; see --help");
        return Ok(());
    };

    tracing::debug!(env = %config.env, api = %config.api_base_url, "starting");
    let api = ApiClient::new(&config)?;
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.state_dir)?);

    match command {
        Commands::Branches => shop::run_branches(&config, api, store).await,
        Commands::Menu { branch } => shop::run_menu(&config, api, store, branch).await,
        Commands::Add {
            branch,
            product,
            size,
        } => shop::run_add(&config, api, store, branch, product, size).await,
        Commands::Cart { command } => match command {
            CartCommands::Show { json } => shop::run_cart_show(store, json),
            CartCommands::Clear => shop::run_cart_clear(store.as_ref()),
        },
        Commands::Checkout => shop::run_checkout(&config, store),
        Commands::Login { username, password } => {
            shop::run_login(&api, store, &username, &password).await
        }
        Commands::Logout => shop::run_logout(store),
        Commands::Admin { command } => admin::run_admin(&config, &api, store, command).await,
    }
}
