use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::{BudgetPeriod, TransactionKind};
use crate::entities::{
    bills, budgets, categories, events, licenses, settings, sync_queue, transactions,
};
use crate::models::finance::{
    BillInput, BudgetInput, CategoryInput, EventInput, SettingsPatch, TransactionInput,
};
use crate::models::user::{NewUser, User};

pub mod migrator;
pub mod repositories;

pub use repositories::backup::{ImportBatch, ImportCounts};
pub use repositories::bill::BillPayment;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn license_repo(&self) -> repositories::license::LicenseRepository {
        repositories::license::LicenseRepository::new(self.conn.clone())
    }

    fn transaction_repo(&self) -> repositories::transaction::TransactionRepository {
        repositories::transaction::TransactionRepository::new(self.conn.clone())
    }

    fn budget_repo(&self) -> repositories::budget::BudgetRepository {
        repositories::budget::BudgetRepository::new(self.conn.clone())
    }

    fn bill_repo(&self) -> repositories::bill::BillRepository {
        repositories::bill::BillRepository::new(self.conn.clone())
    }

    fn category_repo(&self) -> repositories::category::CategoryRepository {
        repositories::category::CategoryRepository::new(self.conn.clone())
    }

    fn event_repo(&self) -> repositories::event::EventRepository {
        repositories::event::EventRepository::new(self.conn.clone())
    }

    fn settings_repo(&self) -> repositories::settings::SettingsRepository {
        repositories::settings::SettingsRepository::new(self.conn.clone())
    }

    fn queue_repo(&self) -> repositories::sync_queue::SyncQueueRepository {
        repositories::sync_queue::SyncQueueRepository::new(self.conn.clone())
    }

    fn backup_repo(&self) -> repositories::backup::BackupRepository {
        repositories::backup::BackupRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(&self, input: &NewUser, security: &SecurityConfig) -> Result<User> {
        self.user_repo().create(input, security).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn update_user_profile(
        &self,
        id: i32,
        name: Option<&str>,
        profile_image: Option<Option<String>>,
    ) -> Result<User> {
        self.user_repo()
            .update_profile(id, name, profile_image)
            .await
    }

    pub async fn update_user_password(
        &self,
        id: i32,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(id, new_password, security)
            .await
    }

    // Licenses

    pub async fn get_license(&self, user_id: i32) -> Result<Option<licenses::Model>> {
        self.license_repo().get(user_id).await
    }

    pub async fn is_code_redeemed(&self, code: &str) -> Result<bool> {
        self.license_repo().is_code_redeemed(code).await
    }

    pub async fn save_license(&self, license: licenses::Model) -> Result<licenses::Model> {
        self.license_repo().save(license).await
    }

    // Transactions

    pub async fn add_transaction(
        &self,
        user_id: i32,
        input: &TransactionInput,
        updated_at: &str,
    ) -> Result<transactions::Model> {
        self.transaction_repo()
            .insert(user_id, input, updated_at)
            .await
    }

    pub async fn get_transaction(
        &self,
        user_id: i32,
        id: i32,
    ) -> Result<Option<transactions::Model>> {
        self.transaction_repo().get(user_id, id).await
    }

    pub async fn list_transactions(&self, user_id: i32) -> Result<Vec<transactions::Model>> {
        self.transaction_repo().list(user_id).await
    }

    pub async fn update_transaction(
        &self,
        existing: transactions::Model,
        input: &TransactionInput,
        updated_at: &str,
    ) -> Result<transactions::Model> {
        self.transaction_repo()
            .update(existing, input, updated_at)
            .await
    }

    pub async fn delete_transaction(&self, user_id: i32, id: i32) -> Result<bool> {
        self.transaction_repo().delete(user_id, id).await
    }

    // Budgets

    pub async fn add_budget(
        &self,
        user_id: i32,
        input: &BudgetInput,
        created_at: &str,
    ) -> Result<budgets::Model> {
        self.budget_repo().insert(user_id, input, created_at).await
    }

    pub async fn get_budget(&self, user_id: i32, id: i32) -> Result<Option<budgets::Model>> {
        self.budget_repo().get(user_id, id).await
    }

    pub async fn list_budgets(&self, user_id: i32) -> Result<Vec<budgets::Model>> {
        self.budget_repo().list(user_id).await
    }

    pub async fn find_duplicate_budget(
        &self,
        user_id: i32,
        category_id: i32,
        period: BudgetPeriod,
        excluding: Option<i32>,
    ) -> Result<Option<budgets::Model>> {
        self.budget_repo()
            .find_duplicate(user_id, category_id, period, excluding)
            .await
    }

    pub async fn update_budget(
        &self,
        existing: budgets::Model,
        input: &BudgetInput,
    ) -> Result<budgets::Model> {
        self.budget_repo().update(existing, input).await
    }

    pub async fn delete_budget(&self, user_id: i32, id: i32) -> Result<bool> {
        self.budget_repo().delete(user_id, id).await
    }

    // Bills

    pub async fn add_bill(
        &self,
        user_id: i32,
        input: &BillInput,
        created_at: &str,
    ) -> Result<bills::Model> {
        self.bill_repo().insert(user_id, input, created_at).await
    }

    pub async fn get_bill(&self, user_id: i32, id: i32) -> Result<Option<bills::Model>> {
        self.bill_repo().get(user_id, id).await
    }

    pub async fn list_bills(&self, user_id: i32) -> Result<Vec<bills::Model>> {
        self.bill_repo().list(user_id).await
    }

    pub async fn update_bill(
        &self,
        existing: bills::Model,
        input: &BillInput,
    ) -> Result<bills::Model> {
        self.bill_repo().update(existing, input).await
    }

    pub async fn pay_bill(
        &self,
        existing: bills::Model,
        expense: &TransactionInput,
        next_due: Option<String>,
        paid_at: &str,
    ) -> Result<BillPayment> {
        self.bill_repo()
            .mark_paid(existing, expense, next_due, paid_at)
            .await
    }

    pub async fn unpay_bill(&self, existing: bills::Model) -> Result<bills::Model> {
        self.bill_repo().mark_unpaid(existing).await
    }

    pub async fn delete_bill(&self, user_id: i32, id: i32) -> Result<bool> {
        self.bill_repo().delete(user_id, id).await
    }

    // Categories

    pub async fn add_category(
        &self,
        user_id: i32,
        input: &CategoryInput,
    ) -> Result<categories::Model> {
        self.category_repo().insert(user_id, input).await
    }

    pub async fn get_category(&self, user_id: i32, id: i32) -> Result<Option<categories::Model>> {
        self.category_repo().get(user_id, id).await
    }

    pub async fn list_categories(&self, user_id: i32) -> Result<Vec<categories::Model>> {
        self.category_repo().list(user_id).await
    }

    pub async fn find_category_by_name(
        &self,
        user_id: i32,
        name: &str,
        kind: TransactionKind,
    ) -> Result<Option<categories::Model>> {
        self.category_repo().find_by_name(user_id, name, kind).await
    }

    /// Transactions, budgets and bills referencing the category.
    pub async fn count_category_references(&self, user_id: i32, category_id: i32) -> Result<u64> {
        let transactions = self
            .transaction_repo()
            .count_by_category(user_id, category_id)
            .await?;
        let budgets = self
            .budget_repo()
            .count_by_category(user_id, category_id)
            .await?;
        let bills = self
            .bill_repo()
            .count_by_category(user_id, category_id)
            .await?;
        Ok(transactions + budgets + bills)
    }

    pub async fn delete_category(&self, user_id: i32, id: i32) -> Result<bool> {
        self.category_repo().delete(user_id, id).await
    }

    // Events

    pub async fn add_event(&self, user_id: i32, input: &EventInput) -> Result<events::Model> {
        self.event_repo().insert(user_id, input).await
    }

    pub async fn get_event(&self, user_id: i32, id: i32) -> Result<Option<events::Model>> {
        self.event_repo().get(user_id, id).await
    }

    pub async fn list_events(&self, user_id: i32) -> Result<Vec<events::Model>> {
        self.event_repo().list(user_id).await
    }

    pub async fn update_event(
        &self,
        existing: events::Model,
        input: &EventInput,
    ) -> Result<events::Model> {
        self.event_repo().update(existing, input).await
    }

    pub async fn mark_event_notified(&self, id: i32, notified_at: &str) -> Result<()> {
        self.event_repo().mark_notified(id, notified_at).await
    }

    pub async fn delete_event(&self, user_id: i32, id: i32) -> Result<bool> {
        self.event_repo().delete(user_id, id).await
    }

    // Settings

    pub async fn get_settings(&self, user_id: i32) -> Result<Option<settings::Model>> {
        self.settings_repo().get(user_id).await
    }

    pub async fn apply_settings(
        &self,
        existing: settings::Model,
        patch: &SettingsPatch,
    ) -> Result<settings::Model> {
        self.settings_repo().apply(existing, patch).await
    }

    // Sync queue

    pub async fn push_queue_entry(
        &self,
        kind: &str,
        payload: &str,
        created_at: &str,
    ) -> Result<sync_queue::Model> {
        self.queue_repo().push(kind, payload, created_at).await
    }

    pub async fn list_pending_queue(&self) -> Result<Vec<sync_queue::Model>> {
        self.queue_repo().list_pending().await
    }

    pub async fn pending_queue_count(&self) -> Result<u64> {
        self.queue_repo().pending_count().await
    }

    pub async fn total_queue_count(&self) -> Result<u64> {
        self.queue_repo().total_count().await
    }

    pub async fn mark_queue_delivered(&self, entry: sync_queue::Model, at: &str) -> Result<()> {
        self.queue_repo().mark_delivered(entry, at).await
    }

    pub async fn record_queue_failure(
        &self,
        entry: sync_queue::Model,
        error: &str,
        at: &str,
    ) -> Result<()> {
        self.queue_repo().record_failure(entry, error, at).await
    }

    // Backup

    pub async fn import_batch(
        &self,
        user_id: i32,
        batch: ImportBatch,
        imported_at: &str,
    ) -> Result<ImportCounts> {
        self.backup_repo().import(user_id, batch, imported_at).await
    }
}
