use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{prelude::*, transactions};
use crate::models::finance::TransactionInput;

pub struct TransactionRepository {
    conn: DatabaseConnection,
}

impl TransactionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(
        &self,
        user_id: i32,
        input: &TransactionInput,
        updated_at: &str,
    ) -> Result<transactions::Model> {
        transactions::ActiveModel {
            user_id: Set(user_id),
            kind: Set(input.kind),
            amount: Set(input.amount),
            category_id: Set(input.category_id),
            date: Set(input.date.clone()),
            note: Set(input.note.clone()),
            updated_at: Set(updated_at.to_string()),
            synced: Set(false),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert transaction")
    }

    pub async fn get(&self, user_id: i32, id: i32) -> Result<Option<transactions::Model>> {
        Transactions::find_by_id(id)
            .filter(transactions::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query transaction")
    }

    /// Newest first.
    pub async fn list(&self, user_id: i32) -> Result<Vec<transactions::Model>> {
        Transactions::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list transactions")
    }

    pub async fn update(
        &self,
        existing: transactions::Model,
        input: &TransactionInput,
        updated_at: &str,
    ) -> Result<transactions::Model> {
        let mut active: transactions::ActiveModel = existing.into();
        active.kind = Set(input.kind);
        active.amount = Set(input.amount);
        active.category_id = Set(input.category_id);
        active.date = Set(input.date.clone());
        active.note = Set(input.note.clone());
        active.updated_at = Set(updated_at.to_string());
        active.synced = Set(false);

        active
            .update(&self.conn)
            .await
            .context("Failed to update transaction")
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<bool> {
        let result = Transactions::delete_many()
            .filter(transactions::Column::Id.eq(id))
            .filter(transactions::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete transaction")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_by_category(&self, user_id: i32, category_id: i32) -> Result<u64> {
        Transactions::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::CategoryId.eq(category_id))
            .count(&self.conn)
            .await
            .context("Failed to count transactions by category")
    }
}
