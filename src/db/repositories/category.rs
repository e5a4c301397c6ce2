use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::TransactionKind;
use crate::entities::{categories, prelude::*};
use crate::models::finance::CategoryInput;

pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, user_id: i32, input: &CategoryInput) -> Result<categories::Model> {
        categories::ActiveModel {
            user_id: Set(user_id),
            name: Set(input.name.clone()),
            kind: Set(input.kind),
            icon: Set(input.icon.clone()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert category")
    }

    pub async fn get(&self, user_id: i32, id: i32) -> Result<Option<categories::Model>> {
        Categories::find_by_id(id)
            .filter(categories::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query category")
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<categories::Model>> {
        Categories::find()
            .filter(categories::Column::UserId.eq(user_id))
            .order_by_asc(categories::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list categories")
    }

    /// Case-insensitive name match within one kind.
    pub async fn find_by_name(
        &self,
        user_id: i32,
        name: &str,
        kind: TransactionKind,
    ) -> Result<Option<categories::Model>> {
        let wanted = name.trim().to_lowercase();
        let rows = Categories::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::Kind.eq(kind))
            .all(&self.conn)
            .await
            .context("Failed to query categories by name")?;

        Ok(rows
            .into_iter()
            .find(|c| c.name.trim().to_lowercase() == wanted))
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<bool> {
        let result = Categories::delete_many()
            .filter(categories::Column::Id.eq(id))
            .filter(categories::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete category")?;

        Ok(result.rows_affected > 0)
    }
}
