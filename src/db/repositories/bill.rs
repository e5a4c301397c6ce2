use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::entities::{bills, prelude::*, transactions};
use crate::models::finance::{BillInput, TransactionInput};

pub struct BillRepository {
    conn: DatabaseConnection,
}

/// Rows written when a bill is marked paid.
#[derive(Debug, Clone)]
pub struct BillPayment {
    pub bill: bills::Model,
    pub transaction: transactions::Model,
    pub successor: Option<bills::Model>,
}

impl BillRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(
        &self,
        user_id: i32,
        input: &BillInput,
        created_at: &str,
    ) -> Result<bills::Model> {
        bills::ActiveModel {
            user_id: Set(user_id),
            name: Set(input.name.clone()),
            amount: Set(input.amount),
            due_date: Set(input.due_date.clone()),
            recurrence: Set(input.recurrence),
            category_id: Set(input.category_id),
            paid: Set(false),
            paid_at: Set(None),
            created_at: Set(created_at.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert bill")
    }

    pub async fn get(&self, user_id: i32, id: i32) -> Result<Option<bills::Model>> {
        Bills::find_by_id(id)
            .filter(bills::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query bill")
    }

    /// Soonest due first.
    pub async fn list(&self, user_id: i32) -> Result<Vec<bills::Model>> {
        Bills::find()
            .filter(bills::Column::UserId.eq(user_id))
            .order_by_asc(bills::Column::DueDate)
            .order_by_asc(bills::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list bills")
    }

    pub async fn update(&self, existing: bills::Model, input: &BillInput) -> Result<bills::Model> {
        let mut active: bills::ActiveModel = existing.into();
        active.name = Set(input.name.clone());
        active.amount = Set(input.amount);
        active.due_date = Set(input.due_date.clone());
        active.recurrence = Set(input.recurrence);
        active.category_id = Set(input.category_id);

        active
            .update(&self.conn)
            .await
            .context("Failed to update bill")
    }

    /// Flags the bill paid, records the expense and, for recurring bills,
    /// inserts the next unpaid occurrence. All three writes commit together.
    pub async fn mark_paid(
        &self,
        existing: bills::Model,
        expense: &TransactionInput,
        next_due: Option<String>,
        paid_at: &str,
    ) -> Result<BillPayment> {
        let txn = self.conn.begin().await?;

        let mut active: bills::ActiveModel = existing.clone().into();
        active.paid = Set(true);
        active.paid_at = Set(Some(paid_at.to_string()));
        let bill = active.update(&txn).await.context("Failed to mark bill paid")?;

        let transaction = transactions::ActiveModel {
            user_id: Set(existing.user_id),
            kind: Set(expense.kind),
            amount: Set(expense.amount),
            category_id: Set(expense.category_id),
            date: Set(expense.date.clone()),
            note: Set(expense.note.clone()),
            updated_at: Set(paid_at.to_string()),
            synced: Set(false),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to record bill payment")?;

        let successor = match next_due {
            Some(due_date) => Some(
                bills::ActiveModel {
                    user_id: Set(existing.user_id),
                    name: Set(existing.name.clone()),
                    amount: Set(existing.amount),
                    due_date: Set(due_date),
                    recurrence: Set(existing.recurrence),
                    category_id: Set(existing.category_id),
                    paid: Set(false),
                    paid_at: Set(None),
                    created_at: Set(paid_at.to_string()),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .context("Failed to insert next bill occurrence")?,
            ),
            None => None,
        };

        txn.commit().await?;

        Ok(BillPayment {
            bill,
            transaction,
            successor,
        })
    }

    pub async fn mark_unpaid(&self, existing: bills::Model) -> Result<bills::Model> {
        let mut active: bills::ActiveModel = existing.into();
        active.paid = Set(false);
        active.paid_at = Set(None);

        active
            .update(&self.conn)
            .await
            .context("Failed to mark bill unpaid")
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<bool> {
        let result = Bills::delete_many()
            .filter(bills::Column::Id.eq(id))
            .filter(bills::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete bill")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_by_category(&self, user_id: i32, category_id: i32) -> Result<u64> {
        Bills::find()
            .filter(bills::Column::UserId.eq(user_id))
            .filter(bills::Column::CategoryId.eq(category_id))
            .count(&self.conn)
            .await
            .context("Failed to count bills by category")
    }
}
