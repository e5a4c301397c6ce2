pub mod sync_queue;
pub use sync_queue::{
    Connectivity, DeliveryError, DrainReport, DrainSkip, MutationQueue, PendingEntry,
    RetryPolicy, SimulatedTransport, SyncTransport, UnboundedRetry,
};

pub mod reminder;
pub use reminder::{EventBusNotifier, Notifier, Reminder, ReminderReport, ReminderService};

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod account_service;
pub mod account_service_impl;
pub use account_service::{AccountError, AccountService};
pub use account_service_impl::SeaOrmAccountService;

pub mod license_service;
pub mod license_service_impl;
pub use license_service::{LicenseError, LicenseService};
pub use license_service_impl::SeaOrmLicenseService;

pub mod finance_service;
pub mod finance_service_impl;
pub use finance_service::{DashboardView, FinanceError, FinanceService, Report};
pub use finance_service_impl::SeaOrmFinanceService;

pub mod backup_service;
pub mod backup_service_impl;
pub use backup_service::{Backup, BackupError, BackupService};
pub use backup_service_impl::SeaOrmBackupService;
