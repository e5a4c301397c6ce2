//! `SeaORM` implementation of the `FinanceService` trait.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tracing::info;

use crate::clock::Clock;
use crate::constants::reports::{COMPARISON_MONTHS, RECENT_TRANSACTIONS, TREND_MONTHS};
use crate::db::{BillPayment, Store};
use crate::domain::mutation::Mutation;
use crate::domain::{TransactionKind, UserId};
use crate::entities::{bills, budgets, categories, events, settings, transactions};
use crate::models::finance::{
    BillInput, BudgetInput, CategoryInput, EventInput, SettingsPatch, TransactionInput,
};
use crate::reports::{
    self, BillStatus, BudgetStatus, DATE_FORMAT, TransactionFilter, budget_alerts, budget_status,
    classify_bill, upcoming_bills,
};
use crate::services::finance_service::{DashboardView, FinanceError, FinanceService, Report};
use crate::services::sync_queue::MutationQueue;

pub struct SeaOrmFinanceService {
    store: Store,
    queue: MutationQueue,
    clock: Arc<dyn Clock>,
}

impl SeaOrmFinanceService {
    #[must_use]
    pub fn new(store: Store, queue: MutationQueue, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            queue,
            clock,
        }
    }

    fn now_stamp(&self) -> String {
        self.clock.now().to_rfc3339()
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    async fn require_category(
        &self,
        user_id: UserId,
        id: i32,
    ) -> Result<categories::Model, FinanceError> {
        self.store
            .get_category(user_id.value(), id)
            .await?
            .ok_or_else(|| FinanceError::NotFound(format!("Category {id}")))
    }

    async fn check_transaction(
        &self,
        user_id: UserId,
        mut input: TransactionInput,
    ) -> Result<TransactionInput, FinanceError> {
        require_positive(input.amount, "Amount")?;
        input.date = normalize_date(&input.date)?;
        input.note = input.note.trim().to_string();
        self.require_category(user_id, input.category_id).await?;
        Ok(input)
    }

    async fn check_budget(
        &self,
        user_id: UserId,
        input: &BudgetInput,
        excluding: Option<i32>,
    ) -> Result<(), FinanceError> {
        require_positive(input.amount, "Budget limit")?;
        self.require_category(user_id, input.category_id).await?;

        let duplicate = self
            .store
            .find_duplicate_budget(user_id.value(), input.category_id, input.period, excluding)
            .await?;
        if duplicate.is_some() {
            return Err(FinanceError::Conflict(format!(
                "A {} budget already exists for this category",
                input.period
            )));
        }
        Ok(())
    }

    async fn check_bill(
        &self,
        user_id: UserId,
        mut input: BillInput,
    ) -> Result<BillInput, FinanceError> {
        input.name = input.name.trim().to_string();
        if input.name.is_empty() {
            return Err(FinanceError::Validation("Bill name is required".to_string()));
        }
        require_positive(input.amount, "Amount")?;
        input.due_date = normalize_date(&input.due_date)?;
        self.require_category(user_id, input.category_id).await?;
        Ok(input)
    }

    async fn require_bill(&self, user_id: UserId, id: i32) -> Result<bills::Model, FinanceError> {
        self.store
            .get_bill(user_id.value(), id)
            .await?
            .ok_or_else(|| FinanceError::NotFound(format!("Bill {id}")))
    }

    async fn require_settings(&self, user_id: UserId) -> Result<settings::Model, FinanceError> {
        self.store
            .get_settings(user_id.value())
            .await?
            .ok_or_else(|| FinanceError::NotFound("Settings".to_string()))
    }
}

fn require_positive(amount: f64, what: &str) -> Result<(), FinanceError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(FinanceError::Validation(format!(
            "{what} must be greater than zero"
        )))
    }
}

fn normalize_date(raw: &str) -> Result<String, FinanceError> {
    reports::parse_date(raw)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .ok_or_else(|| FinanceError::Validation(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

fn check_event(mut input: EventInput) -> Result<EventInput, FinanceError> {
    input.title = input.title.trim().to_string();
    if input.title.is_empty() {
        return Err(FinanceError::Validation("Event title is required".to_string()));
    }
    input.date = normalize_date(&input.date)?;
    input.time = match input.time.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let time = NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| {
                FinanceError::Validation(format!("Invalid time '{raw}', expected HH:MM"))
            })?;
            Some(time.format("%H:%M").to_string())
        }
    };
    input.notes = input.notes.trim().to_string();
    Ok(input)
}

#[async_trait]
impl FinanceService for SeaOrmFinanceService {
    async fn add_transaction(
        &self,
        user_id: UserId,
        input: TransactionInput,
    ) -> Result<transactions::Model, FinanceError> {
        let input = self.check_transaction(user_id, input).await?;
        let tx = self
            .store
            .add_transaction(user_id.value(), &input, &self.now_stamp())
            .await?;

        self.queue.record(&Mutation::Transaction(tx.clone())).await;
        info!(user_id = %user_id, transaction_id = tx.id, kind = %tx.kind, "Transaction added");
        Ok(tx)
    }

    async fn list_transactions(
        &self,
        user_id: UserId,
        filter: &TransactionFilter,
    ) -> Result<Vec<transactions::Model>, FinanceError> {
        let rows = self.store.list_transactions(user_id.value()).await?;
        Ok(reports::filter_transactions(&rows, filter, self.today()))
    }

    async fn update_transaction(
        &self,
        user_id: UserId,
        id: i32,
        input: TransactionInput,
    ) -> Result<transactions::Model, FinanceError> {
        let existing = self
            .store
            .get_transaction(user_id.value(), id)
            .await?
            .ok_or_else(|| FinanceError::NotFound(format!("Transaction {id}")))?;
        let input = self.check_transaction(user_id, input).await?;

        let tx = self
            .store
            .update_transaction(existing, &input, &self.now_stamp())
            .await?;

        self.queue.record(&Mutation::Transaction(tx.clone())).await;
        Ok(tx)
    }

    async fn delete_transaction(&self, user_id: UserId, id: i32) -> Result<(), FinanceError> {
        if !self.store.delete_transaction(user_id.value(), id).await? {
            return Err(FinanceError::NotFound(format!("Transaction {id}")));
        }

        self.queue.record(&Mutation::DeleteTransaction { id }).await;
        Ok(())
    }

    async fn add_budget(
        &self,
        user_id: UserId,
        input: BudgetInput,
    ) -> Result<budgets::Model, FinanceError> {
        self.check_budget(user_id, &input, None).await?;
        let budget = self
            .store
            .add_budget(user_id.value(), &input, &self.now_stamp())
            .await?;

        self.queue.record(&Mutation::Budget(budget.clone())).await;
        Ok(budget)
    }

    async fn list_budgets(&self, user_id: UserId) -> Result<Vec<BudgetStatus>, FinanceError> {
        let budgets = self.store.list_budgets(user_id.value()).await?;
        let transactions = self.store.list_transactions(user_id.value()).await?;
        let today = self.today();

        Ok(budgets
            .iter()
            .map(|b| budget_status(b, &transactions, today))
            .collect())
    }

    async fn update_budget(
        &self,
        user_id: UserId,
        id: i32,
        input: BudgetInput,
    ) -> Result<budgets::Model, FinanceError> {
        let existing = self
            .store
            .get_budget(user_id.value(), id)
            .await?
            .ok_or_else(|| FinanceError::NotFound(format!("Budget {id}")))?;
        self.check_budget(user_id, &input, Some(id)).await?;

        let budget = self.store.update_budget(existing, &input).await?;
        self.queue.record(&Mutation::Budget(budget.clone())).await;
        Ok(budget)
    }

    async fn delete_budget(&self, user_id: UserId, id: i32) -> Result<(), FinanceError> {
        if !self.store.delete_budget(user_id.value(), id).await? {
            return Err(FinanceError::NotFound(format!("Budget {id}")));
        }

        self.queue.record(&Mutation::DeleteBudget { id }).await;
        Ok(())
    }

    async fn add_bill(
        &self,
        user_id: UserId,
        input: BillInput,
    ) -> Result<bills::Model, FinanceError> {
        let input = self.check_bill(user_id, input).await?;
        let bill = self
            .store
            .add_bill(user_id.value(), &input, &self.now_stamp())
            .await?;

        self.queue.record(&Mutation::Bill(bill.clone())).await;
        Ok(bill)
    }

    async fn list_bills(&self, user_id: UserId) -> Result<Vec<BillStatus>, FinanceError> {
        let now = self.clock.now();
        let bills = self.store.list_bills(user_id.value()).await?;
        Ok(bills.iter().map(|b| classify_bill(b, now)).collect())
    }

    async fn update_bill(
        &self,
        user_id: UserId,
        id: i32,
        input: BillInput,
    ) -> Result<bills::Model, FinanceError> {
        let existing = self.require_bill(user_id, id).await?;
        let input = self.check_bill(user_id, input).await?;

        let bill = self.store.update_bill(existing, &input).await?;
        self.queue.record(&Mutation::Bill(bill.clone())).await;
        Ok(bill)
    }

    async fn pay_bill(&self, user_id: UserId, id: i32) -> Result<BillPayment, FinanceError> {
        let bill = self.require_bill(user_id, id).await?;
        if bill.paid {
            return Err(FinanceError::Conflict(format!("Bill {id} is already paid")));
        }

        let next_due = match bill.recurrence.months() {
            None => None,
            Some(_) => {
                let due = reports::parse_date(&bill.due_date).ok_or_else(|| {
                    FinanceError::Validation(format!(
                        "Bill {id} has an invalid due date '{}'",
                        bill.due_date
                    ))
                })?;
                bill.recurrence
                    .next_due(due)
                    .map(|d| d.format(DATE_FORMAT).to_string())
            }
        };

        let expense = TransactionInput {
            kind: TransactionKind::Expense,
            amount: bill.amount,
            category_id: bill.category_id,
            date: self.today().format(DATE_FORMAT).to_string(),
            note: format!("Payment for: {}", bill.name),
        };

        let payment = self
            .store
            .pay_bill(bill, &expense, next_due, &self.now_stamp())
            .await?;

        let mut mutations = vec![
            Mutation::Bill(payment.bill.clone()),
            Mutation::Transaction(payment.transaction.clone()),
        ];
        if let Some(successor) = &payment.successor {
            mutations.push(Mutation::Bill(successor.clone()));
        }
        self.queue.record_all(&mutations).await;

        info!(
            user_id = %user_id,
            bill_id = id,
            successor_id = payment.successor.as_ref().map(|b| b.id),
            "Bill paid"
        );
        Ok(payment)
    }

    async fn unpay_bill(&self, user_id: UserId, id: i32) -> Result<bills::Model, FinanceError> {
        let bill = self.require_bill(user_id, id).await?;
        if !bill.paid {
            return Err(FinanceError::Conflict(format!("Bill {id} is not paid")));
        }

        let bill = self.store.unpay_bill(bill).await?;
        self.queue.record(&Mutation::Bill(bill.clone())).await;
        Ok(bill)
    }

    async fn delete_bill(&self, user_id: UserId, id: i32) -> Result<(), FinanceError> {
        if !self.store.delete_bill(user_id.value(), id).await? {
            return Err(FinanceError::NotFound(format!("Bill {id}")));
        }

        self.queue.record(&Mutation::DeleteBill { id }).await;
        Ok(())
    }

    async fn add_category(
        &self,
        user_id: UserId,
        mut input: CategoryInput,
    ) -> Result<categories::Model, FinanceError> {
        input.name = input.name.trim().to_string();
        if input.name.is_empty() {
            return Err(FinanceError::Validation("Category name is required".to_string()));
        }
        input.icon = input.icon.trim().to_string();
        if input.icon.is_empty() {
            input.icon = "tag".to_string();
        }

        let existing = self
            .store
            .find_category_by_name(user_id.value(), &input.name, input.kind)
            .await?;
        if existing.is_some() {
            return Err(FinanceError::Conflict(format!(
                "An {} category named '{}' already exists",
                input.kind, input.name
            )));
        }

        let category = self.store.add_category(user_id.value(), &input).await?;
        self.queue.record(&Mutation::Category(category.clone())).await;
        Ok(category)
    }

    async fn list_categories(
        &self,
        user_id: UserId,
    ) -> Result<Vec<categories::Model>, FinanceError> {
        Ok(self.store.list_categories(user_id.value()).await?)
    }

    async fn delete_category(&self, user_id: UserId, id: i32) -> Result<(), FinanceError> {
        self.require_category(user_id, id).await?;

        let references = self
            .store
            .count_category_references(user_id.value(), id)
            .await?;
        if references > 0 {
            return Err(FinanceError::Conflict(format!(
                "Category {id} is still used by {references} record(s)"
            )));
        }

        self.store.delete_category(user_id.value(), id).await?;
        self.queue.record(&Mutation::DeleteCategory { id }).await;
        Ok(())
    }

    async fn add_event(
        &self,
        user_id: UserId,
        input: EventInput,
    ) -> Result<events::Model, FinanceError> {
        let input = check_event(input)?;
        let event = self.store.add_event(user_id.value(), &input).await?;

        self.queue.record(&Mutation::Event(event.clone())).await;
        Ok(event)
    }

    async fn list_events(&self, user_id: UserId) -> Result<Vec<events::Model>, FinanceError> {
        Ok(self.store.list_events(user_id.value()).await?)
    }

    async fn update_event(
        &self,
        user_id: UserId,
        id: i32,
        input: EventInput,
    ) -> Result<events::Model, FinanceError> {
        let existing = self
            .store
            .get_event(user_id.value(), id)
            .await?
            .ok_or_else(|| FinanceError::NotFound(format!("Event {id}")))?;
        let input = check_event(input)?;

        let event = self.store.update_event(existing, &input).await?;
        self.queue.record(&Mutation::Event(event.clone())).await;
        Ok(event)
    }

    async fn delete_event(&self, user_id: UserId, id: i32) -> Result<(), FinanceError> {
        if !self.store.delete_event(user_id.value(), id).await? {
            return Err(FinanceError::NotFound(format!("Event {id}")));
        }

        self.queue.record(&Mutation::DeleteEvent { id }).await;
        Ok(())
    }

    async fn get_settings(&self, user_id: UserId) -> Result<settings::Model, FinanceError> {
        self.require_settings(user_id).await
    }

    async fn update_settings(
        &self,
        user_id: UserId,
        mut patch: SettingsPatch,
    ) -> Result<settings::Model, FinanceError> {
        if patch.is_empty() {
            return Err(FinanceError::Validation("No settings to change".to_string()));
        }

        if let Some(currency) = patch.currency.as_mut() {
            *currency = currency.trim().to_ascii_uppercase();
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(FinanceError::Validation(format!(
                    "Invalid currency code '{currency}'"
                )));
            }
        }
        if let Some(locale) = patch.locale.as_mut() {
            *locale = locale.trim().to_string();
            if locale.is_empty() {
                return Err(FinanceError::Validation("Locale cannot be empty".to_string()));
            }
        }

        let existing = self.require_settings(user_id).await?;
        let updated = self.store.apply_settings(existing, &patch).await?;

        self.queue.record(&Mutation::Settings(updated.clone())).await;
        Ok(updated)
    }

    async fn dashboard(&self, user_id: UserId) -> Result<DashboardView, FinanceError> {
        let now = self.clock.now();
        let today = now.date_naive();

        let settings = self.require_settings(user_id).await?;
        let transactions = self.store.list_transactions(user_id.value()).await?;
        let bills = self.store.list_bills(user_id.value()).await?;
        let budgets = self.store.list_budgets(user_id.value()).await?;

        Ok(DashboardView {
            currency: settings.currency,
            summary: reports::dashboard(&transactions, today),
            recent_transactions: reports::recent_transactions(&transactions, RECENT_TRANSACTIONS),
            upcoming_bills: upcoming_bills(&bills, now),
            budget_alerts: budget_alerts(&budgets, &transactions, today),
        })
    }

    async fn report(&self, user_id: UserId) -> Result<Report, FinanceError> {
        let today = self.today();
        let settings = self.require_settings(user_id).await?;
        let transactions = self.store.list_transactions(user_id.value()).await?;
        let categories = self.store.list_categories(user_id.value()).await?;

        Ok(Report {
            currency: settings.currency,
            breakdown: reports::category_breakdown(&transactions, &categories),
            trend: reports::monthly_trend(&transactions, today, TREND_MONTHS),
            comparison: reports::monthly_trend(&transactions, today, COMPARISON_MONTHS),
        })
    }
}
