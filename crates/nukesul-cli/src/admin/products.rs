use anyhow::bail;
use nukesul_store::AdminConsole;

use super::{report, ProductCommands, ProductFields};
use crate::shop::clip;

pub(crate) async fn run_products(
    console: &mut AdminConsole,
    command: ProductCommands,
) -> anyhow::Result<()> {
    match command {
        ProductCommands::List => {
            if console.products().is_empty() {
                println!("Продукты не найдены.");
                return Ok(());
            }
            println!("{:<6}{:<32}{:<8}PRICE", "ID", "NAME", "BRANCH");
            for product in console.products() {
                let branch = product
                    .branch_id()
                    .map_or_else(|| "\u{2014}".to_owned(), |id| id.to_string());
                println!(
                    "{:<6}{:<32}{:<8}{}",
                    product.id,
                    clip(product.display_name(), 28),
                    branch,
                    console.price_summary(product)
                );
            }
            Ok(())
        }
        ProductCommands::Create { fields } => {
            if console.editing_product().is_some() {
                console.cancel_product_edit()?;
            }
            apply(console, fields);
            save(console).await
        }
        ProductCommands::Update { id, fields } => {
            let editing = console.editing_product().map(|p| p.id);
            match (id, editing) {
                (Some(id), Some(current)) if id == current => {}
                (Some(id), _) => console.edit_product(id)?,
                (None, Some(current)) => println!("updating draft product {current}"),
                (None, None) => bail!("no product draft; pass --id or run `products edit`"),
            }
            apply(console, fields);
            save(console).await
        }
        ProductCommands::Edit { id } => {
            console.edit_product(id)?;
            let form = &console.product_form;
            println!("editing product {id}: {}", form.name);
            if form.subcategory.is_some_and(|sub| console.is_tiered(sub)) {
                println!(
                    "  prices: S {} | M {} | L {}",
                    form.prices.small, form.prices.medium, form.prices.large
                );
            } else {
                println!("  price: {}", form.price);
            }
            Ok(())
        }
        ProductCommands::CancelEdit => {
            console.cancel_product_edit()?;
            println!("product draft discarded");
            Ok(())
        }
        ProductCommands::Delete { id } => {
            let result = console.delete_product(id).await;
            report(console, result)
        }
    }
}

fn apply(console: &mut AdminConsole, fields: ProductFields) {
    let form = &mut console.product_form;
    if let Some(name) = fields.name {
        form.name = name;
    }
    if fields.branch.is_some() {
        form.branch = fields.branch;
    }
    if fields.category.is_some() && fields.category != form.category {
        form.category = fields.category;
        form.subcategory = None;
    }
    if fields.subcategory.is_some() {
        form.subcategory = fields.subcategory;
    }
    if let Some(price) = fields.price {
        form.price = price;
    }
    if let Some(small) = fields.small {
        form.prices.small = small;
    }
    if let Some(medium) = fields.medium {
        form.prices.medium = medium;
    }
    if let Some(large) = fields.large {
        form.prices.large = large;
    }
    if fields.image.is_some() {
        form.image = fields.image;
    }
}

async fn save(console: &mut AdminConsole) -> anyhow::Result<()> {
    if console.product_form.subcategory.is_none() && console.product_form.category.is_some() {
        let choices = console.filtered_subcategories();
        if !choices.is_empty() {
            println!("subcategories in this category:");
            for sub in choices {
                println!("  {:<6}{}", sub.id, sub.name);
            }
        }
    }
    let result = console.save_product().await;
    report(console, result)
}
