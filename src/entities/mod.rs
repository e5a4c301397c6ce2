pub mod prelude;

pub mod bills;
pub mod budgets;
pub mod categories;
pub mod events;
pub mod licenses;
pub mod redeemed_codes;
pub mod settings;
pub mod sync_queue;
pub mod transactions;
pub mod users;
