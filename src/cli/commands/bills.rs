//! Bill command handlers

use anyhow::anyhow;

use super::currency;
use crate::cli::{BillCommands, CliContext};
use crate::domain::Recurrence;
use crate::models::finance::BillInput;
use crate::reports::{BillState, format_amount};

pub async fn cmd_bill(ctx: &CliContext, command: BillCommands) -> anyhow::Result<()> {
    let session = ctx.licensed_session().await?;
    let finance = &ctx.state.finance_service;
    let user_id = session.user_id;

    match command {
        BillCommands::Add {
            name,
            amount,
            due,
            category,
            recurrence,
        } => {
            let bill = finance
                .add_bill(
                    user_id,
                    BillInput {
                        name,
                        amount,
                        due_date: due,
                        recurrence,
                        category_id: category,
                    },
                )
                .await?;
            let currency = currency(ctx, user_id).await?;
            println!(
                "✓ Added bill: {} {} due {} (ID: {})",
                bill.name,
                format_amount(bill.amount, &currency),
                bill.due_date,
                bill.id
            );
        }

        BillCommands::List => {
            let statuses = finance.list_bills(user_id).await?;
            if statuses.is_empty() {
                println!("No bills.");
                println!();
                println!("Add one with: pesaflow bill add \"Rent\" 800 --due 2024-02-01 --category <id>");
                return Ok(());
            }

            let currency = currency(ctx, user_id).await?;

            println!("Bills ({} total)", statuses.len());
            println!("{:-<70}", "");
            for status in &statuses {
                let indicator = match status.state {
                    BillState::Paid => "✓",
                    BillState::Overdue => "🔴",
                    BillState::DueSoon => "🟡",
                    BillState::Upcoming => "•",
                };
                let bill = &status.bill;
                println!(
                    "{} {} {} [{}]",
                    indicator,
                    bill.name,
                    format_amount(bill.amount, &currency),
                    status.state.label()
                );

                let due = match status.days_until_due {
                    Some(days) if !bill.paid && days < 0 => {
                        format!("{} ({} days overdue)", bill.due_date, -days)
                    }
                    Some(days) if !bill.paid => format!("{} (in {days} days)", bill.due_date),
                    _ => bill.due_date.clone(),
                };
                let repeats = match bill.recurrence {
                    Recurrence::None => String::new(),
                    other => format!(" | Repeats: {other}"),
                };
                println!("  ID: {} | Due: {}{}", bill.id, due, repeats);
            }
        }

        BillCommands::Edit {
            id,
            name,
            amount,
            due,
            category,
            recurrence,
        } => {
            let existing = finance
                .list_bills(user_id)
                .await?
                .into_iter()
                .map(|status| status.bill)
                .find(|bill| bill.id == id)
                .ok_or_else(|| anyhow!("Bill {id} not found"))?;

            let bill = finance
                .update_bill(
                    user_id,
                    id,
                    BillInput {
                        name: name.unwrap_or(existing.name),
                        amount: amount.unwrap_or(existing.amount),
                        due_date: due.unwrap_or(existing.due_date),
                        recurrence: recurrence.unwrap_or(existing.recurrence),
                        category_id: category.unwrap_or(existing.category_id),
                    },
                )
                .await?;
            println!("✓ Updated bill {}", bill.id);
        }

        BillCommands::Pay { id } => {
            let payment = finance.pay_bill(user_id, id).await?;
            let currency = currency(ctx, user_id).await?;

            println!(
                "✓ Paid {} ({})",
                payment.bill.name,
                format_amount(payment.transaction.amount, &currency)
            );
            println!("  Expense recorded (ID: {})", payment.transaction.id);
            if let Some(next) = &payment.successor {
                println!("  Next due: {} (ID: {})", next.due_date, next.id);
            }
        }

        BillCommands::Unpay { id } => {
            let bill = finance.unpay_bill(user_id, id).await?;
            println!("✓ Marked {} unpaid", bill.name);
        }

        BillCommands::Delete { id } => {
            finance.delete_bill(user_id, id).await?;
            println!("✓ Deleted bill {id}");
        }
    }

    Ok(())
}
