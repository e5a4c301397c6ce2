//! Budget command handlers

use anyhow::anyhow;

use super::currency;
use crate::cli::{BudgetCommands, CliContext};
use crate::models::finance::BudgetInput;
use crate::reports::{BudgetState, category_name, format_amount};

pub async fn cmd_budget(ctx: &CliContext, command: BudgetCommands) -> anyhow::Result<()> {
    let session = ctx.licensed_session().await?;
    let finance = &ctx.state.finance_service;
    let user_id = session.user_id;

    match command {
        BudgetCommands::Add {
            category,
            amount,
            period,
        } => {
            let budget = finance
                .add_budget(
                    user_id,
                    BudgetInput {
                        category_id: category,
                        amount,
                        period,
                    },
                )
                .await?;
            let currency = currency(ctx, user_id).await?;
            println!(
                "✓ {} budget of {} set (ID: {})",
                budget.period,
                format_amount(budget.amount, &currency),
                budget.id
            );
        }

        BudgetCommands::List => {
            let statuses = finance.list_budgets(user_id).await?;
            if statuses.is_empty() {
                println!("No budgets set.");
                println!();
                println!("Add one with: pesaflow budget add 500 --category <id>");
                return Ok(());
            }

            let categories = finance.list_categories(user_id).await?;
            let currency = currency(ctx, user_id).await?;

            println!("Budgets ({} total)", statuses.len());
            println!("{:-<70}", "");
            for status in &statuses {
                let indicator = match status.state {
                    BudgetState::OnTrack => "🟢",
                    BudgetState::NearLimit => "🟡",
                    BudgetState::OverBudget => "🔴",
                };
                println!(
                    "{} {} ({}) {:.0}%",
                    indicator,
                    category_name(&categories, status.category_id),
                    status.period,
                    status.percentage
                );
                println!(
                    "  ID: {} | Spent: {} of {} | Remaining: {} | {}",
                    status.budget_id,
                    format_amount(status.spent, &currency),
                    format_amount(status.limit, &currency),
                    format_amount(status.remaining, &currency),
                    status.state.label()
                );
            }
        }

        BudgetCommands::Edit {
            id,
            category,
            amount,
            period,
        } => {
            let existing = finance
                .list_budgets(user_id)
                .await?
                .into_iter()
                .find(|b| b.budget_id == id)
                .ok_or_else(|| anyhow!("Budget {id} not found"))?;

            let budget = finance
                .update_budget(
                    user_id,
                    id,
                    BudgetInput {
                        category_id: category.unwrap_or(existing.category_id),
                        amount: amount.unwrap_or(existing.limit),
                        period: period.unwrap_or(existing.period),
                    },
                )
                .await?;
            println!("✓ Updated budget {}", budget.id);
        }

        BudgetCommands::Delete { id } => {
            finance.delete_budget(user_id, id).await?;
            println!("✓ Deleted budget {id}");
        }
    }

    Ok(())
}
