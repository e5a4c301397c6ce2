//! Transaction command handlers

use anyhow::anyhow;

use super::currency;
use crate::cli::{CliContext, TxCommands};
use crate::domain::TransactionKind;
use crate::models::finance::TransactionInput;
use crate::reports::{DATE_FORMAT, TransactionFilter, category_name, format_amount};

pub async fn cmd_tx(ctx: &CliContext, command: TxCommands) -> anyhow::Result<()> {
    let session = ctx.licensed_session().await?;
    let finance = &ctx.state.finance_service;
    let user_id = session.user_id;

    match command {
        TxCommands::Add {
            kind,
            amount,
            category,
            date,
            note,
        } => {
            let date = date.unwrap_or_else(|| {
                ctx.state
                    .clock
                    .now()
                    .date_naive()
                    .format(DATE_FORMAT)
                    .to_string()
            });
            let tx = finance
                .add_transaction(
                    user_id,
                    TransactionInput {
                        kind,
                        amount,
                        category_id: category,
                        date,
                        note,
                    },
                )
                .await?;

            let currency = currency(ctx, user_id).await?;
            println!(
                "✓ Recorded {} of {} on {} (ID: {})",
                tx.kind,
                format_amount(tx.amount, &currency),
                tx.date,
                tx.id
            );
        }

        TxCommands::List {
            kind,
            category,
            period,
            search,
        } => {
            let filter = TransactionFilter {
                kind,
                category_id: category,
                period,
                search,
            };
            let rows = finance.list_transactions(user_id, &filter).await?;
            if rows.is_empty() {
                println!("No transactions found.");
                println!();
                println!("Add one with: pesaflow tx add expense 12.50 --category <id>");
                return Ok(());
            }

            let categories = finance.list_categories(user_id).await?;
            let currency = currency(ctx, user_id).await?;

            println!("Transactions ({} total)", rows.len());
            println!("{:-<70}", "");
            for tx in &rows {
                let sign = match tx.kind {
                    TransactionKind::Income => "+",
                    TransactionKind::Expense => "-",
                };
                println!(
                    "{} {}{} [{}]",
                    tx.date,
                    sign,
                    format_amount(tx.amount, &currency),
                    category_name(&categories, tx.category_id)
                );
                if tx.note.is_empty() {
                    println!("  ID: {}", tx.id);
                } else {
                    println!("  ID: {} | {}", tx.id, tx.note);
                }
            }
        }

        TxCommands::Edit {
            id,
            kind,
            amount,
            category,
            date,
            note,
        } => {
            let existing = finance
                .list_transactions(user_id, &TransactionFilter::default())
                .await?
                .into_iter()
                .find(|tx| tx.id == id)
                .ok_or_else(|| anyhow!("Transaction {id} not found"))?;

            let tx = finance
                .update_transaction(
                    user_id,
                    id,
                    TransactionInput {
                        kind: kind.unwrap_or(existing.kind),
                        amount: amount.unwrap_or(existing.amount),
                        category_id: category.unwrap_or(existing.category_id),
                        date: date.unwrap_or(existing.date),
                        note: note.unwrap_or(existing.note),
                    },
                )
                .await?;
            println!("✓ Updated transaction {}", tx.id);
        }

        TxCommands::Delete { id } => {
            finance.delete_transaction(user_id, id).await?;
            println!("✓ Deleted transaction {id}");
        }
    }

    Ok(())
}
