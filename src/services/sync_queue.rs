//! Offline mutation queue.
//!
//! Every local write appends a [`Mutation`] to the `sync_queue` table. A drain
//! walks the undelivered entries and hands each one to a [`SyncTransport`];
//! entries stay undelivered until a delivery succeeds. There is no backend yet,
//! so the default transport only logs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::db::Store;
use crate::domain::events::NotificationEvent;
use crate::domain::mutation::Mutation;
use crate::entities::sync_queue;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    #[error("Delivery rejected: {0}")]
    Rejected(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for DeliveryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for DeliveryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Sends one queued mutation to wherever it is synchronized.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    async fn deliver(&self, entry: &sync_queue::Model) -> Result<(), DeliveryError>;
}

/// Accepts every entry. Stands in until a real backend exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedTransport;

#[async_trait]
impl SyncTransport for SimulatedTransport {
    async fn deliver(&self, entry: &sync_queue::Model) -> Result<(), DeliveryError> {
        debug!(entry_id = entry.id, kind = %entry.kind, "Simulated delivery");
        Ok(())
    }
}

/// Decides whether an undelivered entry is attempted in the current drain.
pub trait RetryPolicy: Send + Sync {
    fn should_attempt(&self, entry: &sync_queue::Model, now: DateTime<Utc>) -> bool;
}

/// Retries every entry on every drain, forever.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnboundedRetry;

impl RetryPolicy for UnboundedRetry {
    fn should_attempt(&self, _entry: &sync_queue::Model, _now: DateTime<Utc>) -> bool {
        true
    }
}

/// Device connectivity. Cloning shares the same flag.
#[derive(Debug, Clone)]
pub struct Connectivity {
    online: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    #[must_use]
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self {
            online: Arc::new(tx),
        }
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    /// Returns true when the flag actually changed.
    pub fn set_online(&self, online: bool) -> bool {
        self.online.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        })
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online.subscribe()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DrainSkip {
    InProgress,
    Offline,
    Disabled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Set when the drain returned without looking at the queue.
    pub skipped: Option<DrainSkip>,
}

impl DrainReport {
    const fn skipped(reason: DrainSkip) -> Self {
        Self {
            attempted: 0,
            delivered: 0,
            failed: 0,
            skipped: Some(reason),
        }
    }
}

/// Queue entry as shown by `sync --status`.
#[derive(Debug, Clone, Serialize)]
pub struct PendingEntry {
    pub id: i32,
    pub kind: String,
    pub created_at: String,
    pub attempts: i32,
    pub last_error: Option<String>,
}

impl From<sync_queue::Model> for PendingEntry {
    fn from(model: sync_queue::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind,
            created_at: model.created_at,
            attempts: model.attempts,
            last_error: model.last_error,
        }
    }
}

/// Clears the in-progress flag when dropped, whatever way the drain ends.
struct DrainGuard {
    flag: Arc<AtomicBool>,
}

impl DrainGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct MutationQueue {
    store: Store,
    clock: Arc<dyn Clock>,
    connectivity: Connectivity,
    transport: Arc<dyn SyncTransport>,
    retry_policy: Arc<dyn RetryPolicy>,
    event_bus: broadcast::Sender<NotificationEvent>,
    draining: Arc<AtomicBool>,
    enabled: bool,
}

impl MutationQueue {
    #[must_use]
    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        connectivity: Connectivity,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            clock,
            connectivity,
            transport: Arc::new(SimulatedTransport),
            retry_policy: Arc::new(UnboundedRetry),
            event_bus,
            draining: Arc::new(AtomicBool::new(false)),
            enabled: true,
        }
    }

    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn SyncTransport>) -> Self {
        self.transport = transport;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.retry_policy = policy;
        self
    }

    #[must_use]
    pub const fn with_sync_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub const fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Appends the mutation as an undelivered entry. Payloads are not validated.
    pub async fn enqueue(&self, mutation: &Mutation) -> Result<sync_queue::Model, DeliveryError> {
        let payload = serde_json::to_string(mutation)
            .map_err(|e| DeliveryError::Internal(format!("Failed to serialize mutation: {e}")))?;
        let created_at = self.clock.now().to_rfc3339();

        let entry = self
            .store
            .push_queue_entry(mutation.kind(), &payload, &created_at)
            .await?;

        metrics::counter!("sync_queue_enqueued_total").increment(1);
        debug!(entry_id = entry.id, kind = mutation.kind(), "Mutation queued");
        Ok(entry)
    }

    /// Enqueues and then requests a drain. Called after the local write has
    /// committed, so queue problems are logged and never returned.
    pub async fn record(&self, mutation: &Mutation) {
        self.record_all(std::slice::from_ref(mutation)).await;
    }

    /// Enqueues each mutation in order, then requests a single drain.
    pub async fn record_all(&self, mutations: &[Mutation]) {
        for mutation in mutations {
            if let Err(e) = self.enqueue(mutation).await {
                warn!(kind = mutation.kind(), error = %e, "Failed to queue local write");
                metrics::counter!("sync_queue_enqueue_failed_total").increment(1);
            }
        }
        if let Err(e) = self.drain().await {
            warn!(error = %e, "Drain after local write failed");
        }
    }

    /// Attempts delivery of every undelivered entry.
    ///
    /// Returns at once when another drain is running, the device is offline or
    /// sync is disabled. Each entry is delivered independently; a failed
    /// delivery or bookkeeping write leaves that entry undelivered for the next
    /// drain and the rest are still attempted.
    pub async fn drain(&self) -> Result<DrainReport, DeliveryError> {
        if !self.enabled {
            return Ok(DrainReport::skipped(DrainSkip::Disabled));
        }
        if !self.connectivity.is_online() {
            debug!("Offline, drain skipped");
            return Ok(DrainReport::skipped(DrainSkip::Offline));
        }
        let Some(_guard) = DrainGuard::acquire(&self.draining) else {
            debug!("Drain already in progress");
            return Ok(DrainReport::skipped(DrainSkip::InProgress));
        };

        let pending = self.store.list_pending_queue().await?;
        let mut report = DrainReport::default();
        if pending.is_empty() {
            return Ok(report);
        }

        let _ = self.event_bus.send(NotificationEvent::SyncStarted {
            pending: pending.len(),
        });

        for entry in pending {
            let now = self.clock.now();
            if !self.retry_policy.should_attempt(&entry, now) {
                continue;
            }
            report.attempted += 1;

            let entry_id = entry.id;
            match self.transport.deliver(&entry).await {
                Ok(()) => {
                    // Left undelivered when the flag cannot be written; the
                    // next drain sends it again.
                    if let Err(e) = self
                        .store
                        .mark_queue_delivered(entry, &now.to_rfc3339())
                        .await
                    {
                        warn!(entry_id, error = %e, "Failed to mark queue entry delivered");
                        report.failed += 1;
                        metrics::counter!("sync_queue_failed_total").increment(1);
                        continue;
                    }
                    report.delivered += 1;
                    metrics::counter!("sync_queue_delivered_total").increment(1);
                }
                Err(e) => {
                    warn!(entry_id, error = %e, "Queue entry delivery failed");
                    if let Err(store_err) = self
                        .store
                        .record_queue_failure(entry, &e.to_string(), &now.to_rfc3339())
                        .await
                    {
                        warn!(entry_id, error = %store_err, "Failed to record delivery failure");
                    }
                    report.failed += 1;
                    metrics::counter!("sync_queue_failed_total").increment(1);
                }
            }
        }

        info!(
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed,
            "Sync queue drained"
        );
        let _ = self.event_bus.send(NotificationEvent::SyncFinished {
            attempted: report.attempted,
            delivered: report.delivered,
            failed: report.failed,
        });

        Ok(report)
    }

    pub async fn pending_count(&self) -> Result<u64, DeliveryError> {
        Ok(self.store.pending_queue_count().await?)
    }

    pub async fn list_pending(&self) -> Result<Vec<PendingEntry>, DeliveryError> {
        let entries = self.store.list_pending_queue().await?;
        Ok(entries.into_iter().map(PendingEntry::from).collect())
    }

    /// Flips connectivity and drains on an offline to online transition.
    pub async fn set_online(&self, online: bool) -> Result<DrainReport, DeliveryError> {
        if self.connectivity.set_online(online) {
            info!(online, "Connectivity changed");
            let _ = self
                .event_bus
                .send(NotificationEvent::ConnectivityChanged { online });
            if online {
                return self.drain().await;
            }
        }
        Ok(DrainReport::default())
    }
}
