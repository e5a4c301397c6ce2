//! Inputs for user-scoped writes. Ids and timestamps are assigned by the store.

use serde::{Deserialize, Serialize};

use crate::domain::{BudgetPeriod, Recurrence, Theme, TransactionKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub kind: TransactionKind,
    pub amount: f64,
    pub category_id: i32,
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetInput {
    pub category_id: i32,
    pub amount: f64,
    pub period: BudgetPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillInput {
    pub name: String,
    pub amount: f64,
    /// `YYYY-MM-DD`
    pub due_date: String,
    pub recurrence: Recurrence,
    pub category_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub kind: TransactionKind,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInput {
    pub title: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: Option<String>,
    #[serde(default)]
    pub notes: String,
}

impl EventInput {
    /// `{date}T{time or 00:00}`
    #[must_use]
    pub fn datetime(&self) -> String {
        format!("{}T{}", self.date, self.time.as_deref().unwrap_or("00:00"))
    }
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub currency: Option<String>,
    pub theme: Option<Theme>,
    pub notifications: Option<bool>,
    pub locale: Option<String>,
}

impl SettingsPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.currency.is_none()
            && self.theme.is_none()
            && self.notifications.is_none()
            && self.locale.is_none()
    }
}
