use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info};

use crate::session::SessionStore;
use crate::state::SharedState;

/// How often the daemon re-reads the connectivity flag written by
/// `pesaflow online` / `pesaflow offline`.
const CONNECTIVITY_PROBE_SECS: u64 = 5;

/// Background loop for the daemon: periodic queue drains, reminder passes and
/// a drain on every offline to online transition.
pub struct Scheduler {
    state: SharedState,
    session: SessionStore,
    running: Arc<RwLock<bool>>,
    shutdown: Arc<Notify>,
}

impl Scheduler {
    #[must_use]
    pub fn new(state: SharedState, session: SessionStore) -> Self {
        Self {
            state,
            session,
            running: Arc::new(RwLock::new(false)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub async fn start(&self) -> Result<()> {
        let config = self.state.config().await;
        if !config.sync.enabled && !config.reminders.enabled {
            info!("Sync and reminders are both disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background scheduler");

        match config.sync.cron_expression.as_deref() {
            Some(cron_expr) if config.sync.enabled => self.run_with_cron(cron_expr).await,
            _ => self.run_with_interval().await,
        }
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let config = self.state.config().await;
        let mut sched = JobScheduler::new().await?;

        let state_for_sync = self.state.clone();
        let running = Arc::clone(&self.running);
        let sync_job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let state = state_for_sync.clone();
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                drain_queue(&state).await;
            })
        })?;
        sched.add(sync_job).await?;

        if config.reminders.enabled {
            let state_for_reminders = self.state.clone();
            let session = self.session.clone();
            let running = Arc::clone(&self.running);
            let reminder_job = Job::new_repeated_async(
                Duration::from_secs(config.reminders.poll_interval_seconds.max(1)),
                move |_uuid, _lock| {
                    let state = state_for_reminders.clone();
                    let session = session.clone();
                    let running = Arc::clone(&running);
                    Box::pin(async move {
                        if !*running.read().await {
                            return;
                        }
                        check_reminders(&state, &session).await;
                    })
                },
            )?;
            sched.add(reminder_job).await?;
        }

        sched.start().await?;
        info!("Scheduler running with cron: {}", cron_expr);

        let mut online_rx = self.state.queue.connectivity().subscribe();
        let mut probe = interval(Duration::from_secs(CONNECTIVITY_PROBE_SECS));

        loop {
            tokio::select! {
                () = self.shutdown.notified() => break,
                _ = probe.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                    self.probe_connectivity();
                }
                changed = online_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if *online_rx.borrow_and_update() {
                        drain_queue(&self.state).await;
                    }
                }
            }
        }

        sched.shutdown().await?;
        Ok(())
    }

    async fn run_with_interval(&self) -> Result<()> {
        let config = self.state.config().await;
        let sync_mins = config.sync.interval_minutes.max(1);
        let poll_secs = config.reminders.poll_interval_seconds.max(1);

        info!(
            "Scheduler running: Sync every {}m, Reminders every {}s",
            sync_mins, poll_secs
        );

        let mut sync_interval = interval(Duration::from_secs(u64::from(sync_mins) * 60));
        let mut reminder_interval = interval(Duration::from_secs(poll_secs));
        let mut probe = interval(Duration::from_secs(CONNECTIVITY_PROBE_SECS));
        let mut online_rx = self.state.queue.connectivity().subscribe();

        loop {
            tokio::select! {
                () = self.shutdown.notified() => break,
                _ = sync_interval.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                    if config.sync.enabled {
                        drain_queue(&self.state).await;
                    }
                }
                _ = reminder_interval.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                    if config.reminders.enabled {
                        check_reminders(&self.state, &self.session).await;
                    }
                }
                _ = probe.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                    self.probe_connectivity();
                }
                changed = online_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if *online_rx.borrow_and_update() && config.sync.enabled {
                        info!("Back online, draining sync queue");
                        drain_queue(&self.state).await;
                    }
                }
            }
        }

        Ok(())
    }

    /// Picks up connectivity changes made by other processes.
    fn probe_connectivity(&self) {
        match self.session.load() {
            Ok(local) => {
                if let Some(online) = local.online {
                    self.state.queue.connectivity().set_online(online);
                }
            }
            Err(e) => debug!(error = %e, "Could not read session file"),
        }
    }

    /// Asks the loop to exit. A drain or reminder pass already running is
    /// finished first; the loop checks for the request between jobs.
    pub async fn stop(&self) {
        *self.running.write().await = false;
        self.shutdown.notify_one();
        info!("Scheduler stop requested");
    }
}

async fn drain_queue(state: &SharedState) {
    let start = std::time::Instant::now();
    info!(event = "job_started", job_name = "sync_queue", "Starting scheduled queue drain");

    match state.queue.drain().await {
        Ok(report) => info!(
            event = "job_finished",
            job_name = "sync_queue",
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed,
            skipped = ?report.skipped,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Scheduled queue drain finished"
        ),
        Err(e) => {
            error!(event = "job_failed", job_name = "sync_queue", error = %e, "Scheduled queue drain failed");
        }
    }
}

async fn check_reminders(state: &SharedState, session: &SessionStore) {
    let user = match session.current() {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!(job_name = "reminders", "No user logged in, skipping reminder pass");
            return;
        }
        Err(e) => {
            error!(event = "job_failed", job_name = "reminders", error = %e, "Could not read session");
            return;
        }
    };

    match state.reminders.run_once(user.user_id).await {
        Ok(report) if report.fired > 0 => info!(
            event = "job_finished",
            job_name = "reminders",
            fired = report.fired,
            checked = report.checked,
            "Reminders fired"
        ),
        Ok(report) => debug!(
            job_name = "reminders",
            checked = report.checked,
            suppressed = report.suppressed,
            "Reminder pass finished"
        ),
        Err(e) => {
            error!(event = "job_failed", job_name = "reminders", error = %e, "Reminder pass failed");
        }
    }
}
