pub use super::bills::Entity as Bills;
pub use super::budgets::Entity as Budgets;
pub use super::categories::Entity as Categories;
pub use super::events::Entity as Events;
pub use super::licenses::Entity as Licenses;
pub use super::redeemed_codes::Entity as RedeemedCodes;
pub use super::settings::Entity as Settings;
pub use super::sync_queue::Entity as SyncQueue;
pub use super::transactions::Entity as Transactions;
pub use super::users::Entity as Users;
