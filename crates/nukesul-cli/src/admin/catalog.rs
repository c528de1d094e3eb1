use nukesul_store::{AdminConsole, AdminTab};

use super::{report, BranchCommands, CategoryCommands, SubcategoryCommands, UserCommands};
use crate::shop::clip;

const DASH: &str = "\u{2014}";

pub(crate) async fn run_users(
    console: &mut AdminConsole,
    command: UserCommands,
) -> anyhow::Result<()> {
    console.set_tab(AdminTab::Users);
    match command {
        UserCommands::List => {
            if console.users().is_empty() {
                println!("no users");
                return Ok(());
            }
            println!("{:<6}{:<20}{:<24}{:<28}PHONE", "ID", "USERNAME", "NAME", "EMAIL");
            for user in console.users() {
                println!(
                    "{:<6}{:<20}{:<24}{:<28}{}",
                    user.id,
                    clip(&user.username, 16),
                    clip(user.name.as_deref().unwrap_or(DASH), 20),
                    clip(user.email.as_deref().unwrap_or(DASH), 24),
                    user.phone.as_deref().unwrap_or(DASH)
                );
            }
            Ok(())
        }
        UserCommands::Delete { id } => {
            let result = console.delete_user(id).await;
            report(console, result)
        }
    }
}

pub(crate) async fn run_branches(
    console: &mut AdminConsole,
    command: BranchCommands,
) -> anyhow::Result<()> {
    match command {
        BranchCommands::List => {
            console.set_tab(AdminTab::ManageBranches);
            println!("{:<6}{:<28}CITY", "ID", "NAME");
            for branch in console.branches() {
                println!(
                    "{:<6}{:<28}{}",
                    branch.id,
                    clip(&branch.name, 24),
                    branch.city.as_deref().unwrap_or(DASH)
                );
            }
            Ok(())
        }
        BranchCommands::Create { name, city } => {
            console.set_tab(AdminTab::Branch);
            console.branch_form.name = name;
            console.branch_form.city = city;
            let result = console.save_branch().await;
            report(console, result)
        }
        BranchCommands::Update { id, name, city } => {
            console.edit_branch(id)?;
            if let Some(name) = name {
                console.branch_form.name = name;
            }
            if let Some(city) = city {
                console.branch_form.city = city;
            }
            let result = console.save_branch().await;
            report(console, result)
        }
        BranchCommands::Delete { id } => {
            console.set_tab(AdminTab::ManageBranches);
            let result = console.delete_branch(id).await;
            report(console, result)
        }
    }
}

pub(crate) async fn run_categories(
    console: &mut AdminConsole,
    command: CategoryCommands,
) -> anyhow::Result<()> {
    console.set_tab(AdminTab::Category);
    match command {
        CategoryCommands::List => {
            println!("{:<6}CATEGORY", "ID");
            for category in console.categories() {
                println!("{:<6}{}", category.id, category.label());
            }
            Ok(())
        }
        CategoryCommands::Create { name, emoji } => {
            console.category_form.name = name;
            console.category_form.emoji = emoji;
            let result = console.save_category().await;
            report(console, result)
        }
        CategoryCommands::Delete { id } => {
            let result = console.delete_category(id).await;
            report(console, result)
        }
    }
}

pub(crate) async fn run_subcategories(
    console: &mut AdminConsole,
    command: SubcategoryCommands,
) -> anyhow::Result<()> {
    match command {
        SubcategoryCommands::List => {
            console.set_tab(AdminTab::ManageSubcategories);
            println!("{:<6}{:<28}{:<10}PRICING", "ID", "NAME", "CATEGORY");
            for sub in console.subcategories() {
                let pricing = if console.is_tiered(sub.id) { "tiered" } else { "flat" };
                println!(
                    "{:<6}{:<28}{:<10}{pricing}",
                    sub.id,
                    clip(&sub.name, 24),
                    sub.category.id()
                );
            }
            Ok(())
        }
        SubcategoryCommands::Create { name, category } => {
            console.set_tab(AdminTab::Subcategory);
            console.subcategory_form.name = name;
            console.subcategory_form.category = Some(category);
            let result = console.save_subcategory().await;
            report(console, result)
        }
        SubcategoryCommands::Update { id, name, category } => {
            console.edit_subcategory(id)?;
            if let Some(name) = name {
                console.subcategory_form.name = name;
            }
            if category.is_some() {
                console.subcategory_form.category = category;
            }
            let result = console.save_subcategory().await;
            report(console, result)
        }
        SubcategoryCommands::Delete { id } => {
            console.set_tab(AdminTab::ManageSubcategories);
            let result = console.delete_subcategory(id).await;
            report(console, result)
        }
    }
}
