//! Category command handlers

use crate::cli::{CategoryCommands, CliContext};
use crate::models::finance::CategoryInput;

pub async fn cmd_category(ctx: &CliContext, command: CategoryCommands) -> anyhow::Result<()> {
    let session = ctx.licensed_session().await?;
    let finance = &ctx.state.finance_service;
    let user_id = session.user_id;

    match command {
        CategoryCommands::Add { name, kind, icon } => {
            let category = finance
                .add_category(user_id, CategoryInput { name, kind, icon })
                .await?;
            println!(
                "✓ Added {} category: {} (ID: {})",
                category.kind, category.name, category.id
            );
        }

        CategoryCommands::List => {
            let categories = finance.list_categories(user_id).await?;
            if categories.is_empty() {
                println!("No categories.");
                return Ok(());
            }

            println!("Categories ({} total)", categories.len());
            println!("{:-<70}", "");
            for category in &categories {
                println!(
                    "[{:>3}] {:<24} {:<8} {}",
                    category.id, category.name, category.kind, category.icon
                );
            }
        }

        CategoryCommands::Delete { id } => {
            finance.delete_category(user_id, id).await?;
            println!("✓ Deleted category {id}");
        }
    }

    Ok(())
}
