//! Domain service for the user's ledger: transactions, budgets, bills,
//! categories, events, settings and the derived dashboard and reports.
//!
//! Every successful write is queued for synchronization before returning.

use serde::Serialize;
use thiserror::Error;

use crate::db::BillPayment;
use crate::domain::UserId;
use crate::entities::{bills, budgets, categories, events, settings, transactions};
use crate::models::finance::{
    BillInput, BudgetInput, CategoryInput, EventInput, SettingsPatch, TransactionInput,
};
use crate::reports::{
    BillStatus, BudgetStatus, CategoryTotal, Dashboard, MonthTotals, TransactionFilter,
};

#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for FinanceError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for FinanceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Everything the dashboard screen shows.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub currency: String,
    pub summary: Dashboard,
    pub recent_transactions: Vec<transactions::Model>,
    pub upcoming_bills: Vec<BillStatus>,
    pub budget_alerts: Vec<BudgetStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub currency: String,
    pub breakdown: Vec<CategoryTotal>,
    /// Twelve months, oldest first.
    pub trend: Vec<MonthTotals>,
    /// Six months, oldest first.
    pub comparison: Vec<MonthTotals>,
}

#[async_trait::async_trait]
pub trait FinanceService: Send + Sync {
    // Transactions

    async fn add_transaction(
        &self,
        user_id: UserId,
        input: TransactionInput,
    ) -> Result<transactions::Model, FinanceError>;

    /// Newest first.
    async fn list_transactions(
        &self,
        user_id: UserId,
        filter: &TransactionFilter,
    ) -> Result<Vec<transactions::Model>, FinanceError>;

    async fn update_transaction(
        &self,
        user_id: UserId,
        id: i32,
        input: TransactionInput,
    ) -> Result<transactions::Model, FinanceError>;

    async fn delete_transaction(&self, user_id: UserId, id: i32) -> Result<(), FinanceError>;

    // Budgets

    /// # Errors
    ///
    /// Returns [`FinanceError::Conflict`] when a budget already exists for the
    /// same category and period.
    async fn add_budget(
        &self,
        user_id: UserId,
        input: BudgetInput,
    ) -> Result<budgets::Model, FinanceError>;

    async fn list_budgets(&self, user_id: UserId) -> Result<Vec<BudgetStatus>, FinanceError>;

    async fn update_budget(
        &self,
        user_id: UserId,
        id: i32,
        input: BudgetInput,
    ) -> Result<budgets::Model, FinanceError>;

    async fn delete_budget(&self, user_id: UserId, id: i32) -> Result<(), FinanceError>;

    // Bills

    async fn add_bill(&self, user_id: UserId, input: BillInput)
    -> Result<bills::Model, FinanceError>;

    async fn list_bills(&self, user_id: UserId) -> Result<Vec<BillStatus>, FinanceError>;

    async fn update_bill(
        &self,
        user_id: UserId,
        id: i32,
        input: BillInput,
    ) -> Result<bills::Model, FinanceError>;

    /// Marks the bill paid and records the payment as an expense dated today.
    /// Recurring bills get exactly one unpaid successor.
    async fn pay_bill(&self, user_id: UserId, id: i32) -> Result<BillPayment, FinanceError>;

    /// Clears the paid flag. The payment transaction is kept.
    async fn unpay_bill(&self, user_id: UserId, id: i32) -> Result<bills::Model, FinanceError>;

    async fn delete_bill(&self, user_id: UserId, id: i32) -> Result<(), FinanceError>;

    // Categories

    async fn add_category(
        &self,
        user_id: UserId,
        input: CategoryInput,
    ) -> Result<categories::Model, FinanceError>;

    async fn list_categories(&self, user_id: UserId)
    -> Result<Vec<categories::Model>, FinanceError>;

    /// # Errors
    ///
    /// Returns [`FinanceError::Conflict`] while any transaction, budget or bill
    /// references the category.
    async fn delete_category(&self, user_id: UserId, id: i32) -> Result<(), FinanceError>;

    // Events

    async fn add_event(
        &self,
        user_id: UserId,
        input: EventInput,
    ) -> Result<events::Model, FinanceError>;

    /// Earliest first.
    async fn list_events(&self, user_id: UserId) -> Result<Vec<events::Model>, FinanceError>;

    async fn update_event(
        &self,
        user_id: UserId,
        id: i32,
        input: EventInput,
    ) -> Result<events::Model, FinanceError>;

    async fn delete_event(&self, user_id: UserId, id: i32) -> Result<(), FinanceError>;

    // Settings

    async fn get_settings(&self, user_id: UserId) -> Result<settings::Model, FinanceError>;

    async fn update_settings(
        &self,
        user_id: UserId,
        patch: SettingsPatch,
    ) -> Result<settings::Model, FinanceError>;

    // Derived views

    async fn dashboard(&self, user_id: UserId) -> Result<DashboardView, FinanceError>;

    async fn report(&self, user_id: UserId) -> Result<Report, FinanceError>;
}
