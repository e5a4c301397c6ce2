pub mod backup;
pub mod bill;
pub mod budget;
pub mod category;
pub mod event;
pub mod license;
pub mod settings;
pub mod sync_queue;
pub mod transaction;
pub mod user;
