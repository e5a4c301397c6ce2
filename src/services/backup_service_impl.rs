//! `SeaORM` implementation of the `BackupService` trait.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::clock::Clock;
use crate::db::{ImportBatch, ImportCounts, Store};
use crate::domain::UserId;
use crate::domain::events::NotificationEvent;
use crate::domain::mutation::Mutation;
use crate::services::backup_service::{Backup, BackupError, BackupService};
use crate::services::sync_queue::MutationQueue;

pub struct SeaOrmBackupService {
    store: Store,
    queue: MutationQueue,
    clock: Arc<dyn Clock>,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl SeaOrmBackupService {
    #[must_use]
    pub fn new(
        store: Store,
        queue: MutationQueue,
        clock: Arc<dyn Clock>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            queue,
            clock,
            event_bus,
        }
    }
}

#[async_trait]
impl BackupService for SeaOrmBackupService {
    async fn export(&self, user_id: UserId) -> Result<Backup, BackupError> {
        let id = user_id.value();
        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or(BackupError::UserNotFound)?;

        Ok(Backup {
            user: Some(user),
            transactions: Some(self.store.list_transactions(id).await?),
            budgets: Some(self.store.list_budgets(id).await?),
            bills: Some(self.store.list_bills(id).await?),
            categories: Some(self.store.list_categories(id).await?),
            settings: self.store.get_settings(id).await?,
            exported_at: Some(self.clock.now().to_rfc3339()),
        })
    }

    async fn import(&self, user_id: UserId, backup: Backup) -> Result<ImportCounts, BackupError> {
        let transactions = backup
            .transactions
            .ok_or(BackupError::MissingField("transactions"))?;
        let categories = backup
            .categories
            .ok_or(BackupError::MissingField("categories"))?;

        let batch = ImportBatch {
            categories,
            transactions,
            budgets: backup.budgets.unwrap_or_default(),
            bills: backup.bills.unwrap_or_default(),
        };

        let counts = self
            .store
            .import_batch(user_id.value(), batch, &self.clock.now().to_rfc3339())
            .await?;

        self.queue
            .record(&Mutation::Import {
                user_id: user_id.value(),
                transactions: counts.transactions,
                budgets: counts.budgets,
                bills: counts.bills,
                categories: counts.categories,
            })
            .await;

        info!(
            user_id = %user_id,
            transactions = counts.transactions,
            budgets = counts.budgets,
            bills = counts.bills,
            categories = counts.categories,
            "Backup imported"
        );
        let _ = self.event_bus.send(NotificationEvent::ImportFinished {
            user_id: user_id.value(),
            transactions: counts.transactions,
            budgets: counts.budgets,
            bills: counts.bills,
            categories: counts.categories,
        });

        Ok(counts)
    }

    async fn export_to_path(&self, user_id: UserId, path: &Path) -> Result<Backup, BackupError> {
        let backup = self.export(user_id).await?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, backup.to_json()?).await?;
        info!(user_id = %user_id, path = %path.display(), "Backup exported");
        Ok(backup)
    }

    async fn import_from_path(
        &self,
        user_id: UserId,
        path: &Path,
    ) -> Result<ImportCounts, BackupError> {
        let raw = tokio::fs::read_to_string(path).await?;
        self.import(user_id, Backup::from_json(&raw)?).await
    }
}
