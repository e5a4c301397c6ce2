use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{events, prelude::*};
use crate::models::finance::EventInput;

pub struct EventRepository {
    conn: DatabaseConnection,
}

impl EventRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, user_id: i32, input: &EventInput) -> Result<events::Model> {
        events::ActiveModel {
            user_id: Set(user_id),
            title: Set(input.title.clone()),
            date: Set(input.date.clone()),
            time: Set(input.time.clone()),
            notes: Set(input.notes.clone()),
            datetime: Set(input.datetime()),
            notified_at: Set(None),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert event")
    }

    pub async fn get(&self, user_id: i32, id: i32) -> Result<Option<events::Model>> {
        Events::find_by_id(id)
            .filter(events::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query event")
    }

    /// Earliest first.
    pub async fn list(&self, user_id: i32) -> Result<Vec<events::Model>> {
        Events::find()
            .filter(events::Column::UserId.eq(user_id))
            .order_by_asc(events::Column::Datetime)
            .order_by_asc(events::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list events")
    }

    /// Rescheduling clears the notification stamp so the new time can fire.
    pub async fn update(&self, existing: events::Model, input: &EventInput) -> Result<events::Model> {
        let rescheduled = existing.datetime != input.datetime();

        let mut active: events::ActiveModel = existing.into();
        active.title = Set(input.title.clone());
        active.date = Set(input.date.clone());
        active.time = Set(input.time.clone());
        active.notes = Set(input.notes.clone());
        active.datetime = Set(input.datetime());
        if rescheduled {
            active.notified_at = Set(None);
        }

        active
            .update(&self.conn)
            .await
            .context("Failed to update event")
    }

    pub async fn mark_notified(&self, id: i32, notified_at: &str) -> Result<()> {
        Events::update_many()
            .col_expr(
                events::Column::NotifiedAt,
                sea_orm::sea_query::Expr::value(notified_at),
            )
            .filter(events::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to stamp event notification")?;

        Ok(())
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<bool> {
        let result = Events::delete_many()
            .filter(events::Column::Id.eq(id))
            .filter(events::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete event")?;

        Ok(result.rows_affected > 0)
    }
}
