//! Change records appended to the sync queue.
//!
//! Each variant carries the full row (or the deleted id) so a future backend
//! can replay the change without reading the local store.

use serde::{Deserialize, Serialize};

use crate::entities::{bills, budgets, categories, events, licenses, settings, transactions};

/// A single local write, serialized as `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Mutation {
    Transaction(transactions::Model),
    DeleteTransaction { id: i32 },

    Budget(budgets::Model),
    DeleteBudget { id: i32 },

    Bill(bills::Model),
    DeleteBill { id: i32 },

    Category(categories::Model),
    DeleteCategory { id: i32 },

    Event(events::Model),
    DeleteEvent { id: i32 },

    Settings(settings::Model),

    License(licenses::Model),

    Import {
        user_id: i32,
        transactions: usize,
        budgets: usize,
        bills: usize,
        categories: usize,
    },
}

impl Mutation {
    /// Type tag stored alongside the payload for quick inspection.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transaction(_) => "transaction",
            Self::DeleteTransaction { .. } => "delete_transaction",
            Self::Budget(_) => "budget",
            Self::DeleteBudget { .. } => "delete_budget",
            Self::Bill(_) => "bill",
            Self::DeleteBill { .. } => "delete_bill",
            Self::Category(_) => "category",
            Self::DeleteCategory { .. } => "delete_category",
            Self::Event(_) => "event",
            Self::DeleteEvent { .. } => "delete_event",
            Self::Settings(_) => "settings",
            Self::License(_) => "license",
            Self::Import { .. } => "import",
        }
    }
}
