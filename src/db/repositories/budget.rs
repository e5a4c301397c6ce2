use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::BudgetPeriod;
use crate::entities::{budgets, prelude::*};
use crate::models::finance::BudgetInput;

pub struct BudgetRepository {
    conn: DatabaseConnection,
}

impl BudgetRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(
        &self,
        user_id: i32,
        input: &BudgetInput,
        created_at: &str,
    ) -> Result<budgets::Model> {
        budgets::ActiveModel {
            user_id: Set(user_id),
            category_id: Set(input.category_id),
            amount: Set(input.amount),
            period: Set(input.period),
            created_at: Set(created_at.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert budget")
    }

    pub async fn get(&self, user_id: i32, id: i32) -> Result<Option<budgets::Model>> {
        Budgets::find_by_id(id)
            .filter(budgets::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query budget")
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<budgets::Model>> {
        Budgets::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .order_by_asc(budgets::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list budgets")
    }

    /// Another budget of this user for the same category and period, if any.
    pub async fn find_duplicate(
        &self,
        user_id: i32,
        category_id: i32,
        period: BudgetPeriod,
        excluding: Option<i32>,
    ) -> Result<Option<budgets::Model>> {
        let mut query = Budgets::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::CategoryId.eq(category_id))
            .filter(budgets::Column::Period.eq(period));

        if let Some(id) = excluding {
            query = query.filter(budgets::Column::Id.ne(id));
        }

        query
            .one(&self.conn)
            .await
            .context("Failed to query duplicate budget")
    }

    pub async fn update(
        &self,
        existing: budgets::Model,
        input: &BudgetInput,
    ) -> Result<budgets::Model> {
        let mut active: budgets::ActiveModel = existing.into();
        active.category_id = Set(input.category_id);
        active.amount = Set(input.amount);
        active.period = Set(input.period);

        active
            .update(&self.conn)
            .await
            .context("Failed to update budget")
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<bool> {
        let result = Budgets::delete_many()
            .filter(budgets::Column::Id.eq(id))
            .filter(budgets::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete budget")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_by_category(&self, user_id: i32, category_id: i32) -> Result<u64> {
        Budgets::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::CategoryId.eq(category_id))
            .count(&self.conn)
            .await
            .context("Failed to count budgets by category")
    }
}
