use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{prelude::*, sync_queue};

pub struct SyncQueueRepository {
    conn: DatabaseConnection,
}

impl SyncQueueRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn push(
        &self,
        kind: &str,
        payload: &str,
        created_at: &str,
    ) -> Result<sync_queue::Model> {
        sync_queue::ActiveModel {
            kind: Set(kind.to_string()),
            payload: Set(payload.to_string()),
            created_at: Set(created_at.to_string()),
            delivered: Set(false),
            attempts: Set(0),
            last_attempt_at: Set(None),
            last_error: Set(None),
            delivered_at: Set(None),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to enqueue mutation")
    }

    pub async fn list_pending(&self) -> Result<Vec<sync_queue::Model>> {
        SyncQueue::find()
            .filter(sync_queue::Column::Delivered.eq(false))
            .order_by_asc(sync_queue::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list pending queue entries")
    }

    pub async fn pending_count(&self) -> Result<u64> {
        SyncQueue::find()
            .filter(sync_queue::Column::Delivered.eq(false))
            .count(&self.conn)
            .await
            .context("Failed to count pending queue entries")
    }

    pub async fn total_count(&self) -> Result<u64> {
        SyncQueue::find()
            .count(&self.conn)
            .await
            .context("Failed to count queue entries")
    }

    pub async fn mark_delivered(&self, entry: sync_queue::Model, at: &str) -> Result<()> {
        let attempts = entry.attempts + 1;
        let mut active: sync_queue::ActiveModel = entry.into();
        active.delivered = Set(true);
        active.delivered_at = Set(Some(at.to_string()));
        active.attempts = Set(attempts);
        active.last_attempt_at = Set(Some(at.to_string()));
        active.last_error = Set(None);
        active
            .update(&self.conn)
            .await
            .context("Failed to mark queue entry delivered")?;

        Ok(())
    }

    pub async fn record_failure(&self, entry: sync_queue::Model, error: &str, at: &str) -> Result<()> {
        let attempts = entry.attempts + 1;
        let mut active: sync_queue::ActiveModel = entry.into();
        active.attempts = Set(attempts);
        active.last_attempt_at = Set(Some(at.to_string()));
        active.last_error = Set(Some(error.to_string()));
        active
            .update(&self.conn)
            .await
            .context("Failed to record queue delivery failure")?;

        Ok(())
    }
}
