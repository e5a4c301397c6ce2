//! `SeaORM` implementation of the `LicenseService` trait.

use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::clock::Clock;
use crate::db::Store;
use crate::domain::UserId;
use crate::domain::events::NotificationEvent;
use crate::domain::mutation::Mutation;
use crate::entities::licenses;
use crate::license::{self, Expiry, LicenseInfo, LicensePlan, LicenseStatus};
use crate::services::license_service::{LicenseError, LicenseService};
use crate::services::sync_queue::MutationQueue;

pub struct SeaOrmLicenseService {
    store: Store,
    queue: MutationQueue,
    clock: Arc<dyn Clock>,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl SeaOrmLicenseService {
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

    async fn persist(&self, license: licenses::Model) -> Result<licenses::Model, LicenseError> {
        let saved = self.store.save_license(license).await.map_err(|e| {
            if is_unique_violation(&e) {
                LicenseError::CodeAlreadyUsed
            } else {
                LicenseError::from(e)
            }
        })?;

        self.queue.record(&Mutation::License(saved.clone())).await;
        Ok(saved)
    }
}

/// A concurrent activation of the same code loses the race on the
/// `redeemed_codes` primary key.
fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<DbErr>())
        .any(|db| matches!(db.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))))
}

#[async_trait]
impl LicenseService for SeaOrmLicenseService {
    async fn start_free_trial(&self, user_id: UserId) -> Result<licenses::Model, LicenseError> {
        if self.store.get_license(user_id.value()).await?.is_some() {
            return Err(LicenseError::TrialAlreadyUsed);
        }

        let now = self.clock.now();
        let trial = licenses::Model {
            user_id: user_id.value(),
            activation_code: None,
            plan: LicensePlan::Trial,
            is_trial: true,
            activated_at: now.to_rfc3339(),
            expires_at: Expiry::for_plan(LicensePlan::Trial, now).to_stored(),
            status: LicenseStatus::Active,
        };

        let saved = self.persist(trial).await?;
        info!(user_id = %user_id, "Free trial started");
        let _ = self.event_bus.send(NotificationEvent::TrialStarted {
            user_id: user_id.value(),
        });
        Ok(saved)
    }

    async fn activate(&self, user_id: UserId, code: &str) -> Result<licenses::Model, LicenseError> {
        let (code, plan) = license::parse_code(code)?;

        if self.store.is_code_redeemed(&code).await? {
            return Err(LicenseError::CodeAlreadyUsed);
        }

        let now = self.clock.now();
        let activated = licenses::Model {
            user_id: user_id.value(),
            activation_code: Some(code),
            plan,
            is_trial: false,
            activated_at: now.to_rfc3339(),
            expires_at: Expiry::for_plan(plan, now).to_stored(),
            status: LicenseStatus::Active,
        };

        let saved = self.persist(activated).await?;
        info!(user_id = %user_id, plan = %plan, "License activated");
        let _ = self.event_bus.send(NotificationEvent::LicenseActivated {
            user_id: user_id.value(),
            plan: plan.to_string(),
        });
        Ok(saved)
    }

    async fn check_valid(&self, user_id: UserId) -> Result<bool, LicenseError> {
        let stored = self.store.get_license(user_id.value()).await?;
        Ok(license::is_valid(stored.as_ref(), self.clock.now()))
    }

    async fn status(&self, user_id: UserId) -> Result<LicenseInfo, LicenseError> {
        let stored = self.store.get_license(user_id.value()).await?;
        Ok(license::describe(stored.as_ref(), self.clock.now()))
    }
}
