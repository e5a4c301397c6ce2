use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};

use crate::entities::{bills, budgets, categories, transactions};

/// Records read from an export file, still carrying their original ids.
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    pub categories: Vec<categories::Model>,
    pub transactions: Vec<transactions::Model>,
    pub budgets: Vec<budgets::Model>,
    pub bills: Vec<bills::Model>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub categories: usize,
    pub transactions: usize,
    pub budgets: usize,
    pub bills: usize,
}

pub struct BackupRepository {
    conn: DatabaseConnection,
}

impl BackupRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Re-inserts every record under `user_id` with fresh ids.
    ///
    /// Category references pointing at a category from the same batch follow it
    /// to its new id; others are kept as written.
    pub async fn import(
        &self,
        user_id: i32,
        batch: ImportBatch,
        imported_at: &str,
    ) -> Result<ImportCounts> {
        let txn = self.conn.begin().await?;
        let mut remap: HashMap<i32, i32> = HashMap::new();
        let mut counts = ImportCounts::default();

        for category in batch.categories {
            let inserted = categories::ActiveModel {
                user_id: Set(user_id),
                name: Set(category.name),
                kind: Set(category.kind),
                icon: Set(category.icon),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .context("Failed to import category")?;
            remap.insert(category.id, inserted.id);
            counts.categories += 1;
        }

        let category_for = |old: i32| remap.get(&old).copied().unwrap_or(old);

        for tx in batch.transactions {
            transactions::ActiveModel {
                user_id: Set(user_id),
                kind: Set(tx.kind),
                amount: Set(tx.amount),
                category_id: Set(category_for(tx.category_id)),
                date: Set(tx.date),
                note: Set(tx.note),
                updated_at: Set(imported_at.to_string()),
                synced: Set(false),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .context("Failed to import transaction")?;
            counts.transactions += 1;
        }

        for budget in batch.budgets {
            budgets::ActiveModel {
                user_id: Set(user_id),
                category_id: Set(category_for(budget.category_id)),
                amount: Set(budget.amount),
                period: Set(budget.period),
                created_at: Set(budget.created_at),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .context("Failed to import budget")?;
            counts.budgets += 1;
        }

        for bill in batch.bills {
            bills::ActiveModel {
                user_id: Set(user_id),
                name: Set(bill.name),
                amount: Set(bill.amount),
                due_date: Set(bill.due_date),
                recurrence: Set(bill.recurrence),
                category_id: Set(category_for(bill.category_id)),
                paid: Set(bill.paid),
                paid_at: Set(bill.paid_at),
                created_at: Set(bill.created_at),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .context("Failed to import bill")?;
            counts.bills += 1;
        }

        txn.commit().await?;
        Ok(counts)
    }
}
