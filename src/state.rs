use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::Store;
use crate::domain::events::NotificationEvent;
use crate::services::{
    AccountService, BackupService, Connectivity, EventBusNotifier, FinanceService, LicenseService,
    MutationQueue, ReminderService, SeaOrmAccountService, SeaOrmBackupService,
    SeaOrmFinanceService, SeaOrmLicenseService, SimulatedTransport, SyncTransport,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub clock: Arc<dyn Clock>,

    pub event_bus: broadcast::Sender<NotificationEvent>,

    pub queue: MutationQueue,

    pub reminders: ReminderService,

    pub account_service: Arc<dyn AccountService>,

    pub license_service: Arc<dyn LicenseService>,

    pub finance_service: Arc<dyn FinanceService>,

    pub backup_service: Arc<dyn BackupService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_parts(config, Arc::new(SystemClock), Arc::new(SimulatedTransport)).await
    }

    /// Builds the state around a caller-supplied clock and sync transport.
    pub async fn with_parts(
        config: Config,
        clock: Arc<dyn Clock>,
        transport: Arc<dyn SyncTransport>,
    ) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size.max(1));

        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let queue = MutationQueue::new(
            store.clone(),
            clock.clone(),
            Connectivity::new(config.sync.start_online),
            event_bus.clone(),
        )
        .with_transport(transport)
        .with_sync_enabled(config.sync.enabled);

        let reminders = ReminderService::new(
            store.clone(),
            clock.clone(),
            Arc::new(EventBusNotifier::new(event_bus.clone())),
            &config.reminders,
        );

        let account_service = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AccountService + Send + Sync + 'static>;

        let license_service = Arc::new(SeaOrmLicenseService::new(
            store.clone(),
            queue.clone(),
            clock.clone(),
            event_bus.clone(),
        )) as Arc<dyn LicenseService + Send + Sync + 'static>;

        let finance_service = Arc::new(SeaOrmFinanceService::new(
            store.clone(),
            queue.clone(),
            clock.clone(),
        )) as Arc<dyn FinanceService + Send + Sync + 'static>;

        let backup_service = Arc::new(SeaOrmBackupService::new(
            store.clone(),
            queue.clone(),
            clock.clone(),
            event_bus.clone(),
        )) as Arc<dyn BackupService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            clock,
            event_bus,
            queue,
            reminders,
            account_service,
            license_service,
            finance_service,
            backup_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
