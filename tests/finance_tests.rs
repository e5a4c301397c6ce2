//! Integration tests for the ledger: transactions, budgets, bills, categories
//! and settings.

use chrono::{TimeZone, Utc};
use pesaflow::clock::FixedClock;
use pesaflow::config::Config;
use pesaflow::domain::{BudgetPeriod, Recurrence, Session, Theme, TransactionKind};
use pesaflow::models::finance::{
    BillInput, BudgetInput, CategoryInput, SettingsPatch, TransactionInput,
};
use pesaflow::models::user::NewUser;
use pesaflow::reports::{BillState, BudgetState, FilterPeriod, TransactionFilter};
use pesaflow::services::{FinanceError, SimulatedTransport};
use pesaflow::state::SharedState;
use std::sync::Arc;

async fn spawn_state() -> (SharedState, Session) {
    let db_path =
        std::env::temp_dir().join(format!("pesaflow-finance-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap());
    let state = SharedState::with_parts(config, Arc::new(clock), Arc::new(SimulatedTransport))
        .await
        .expect("failed to create state");

    let session = state
        .account_service
        .register(NewUser {
            name: "Ledger User".to_string(),
            email: "ledger@example.com".to_string(),
            password: "secret123".to_string(),
            profile_image: None,
        })
        .await
        .expect("registration failed");

    (state, session)
}

async fn category_id(state: &SharedState, user: &Session, name: &str) -> i32 {
    state
        .finance_service
        .list_categories(user.user_id)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("category {name} missing"))
        .id
}

fn expense(category_id: i32, amount: f64, date: &str, note: &str) -> TransactionInput {
    TransactionInput {
        kind: TransactionKind::Expense,
        amount,
        category_id,
        date: date.to_string(),
        note: note.to_string(),
    }
}

#[tokio::test]
async fn test_registration_seeds_categories_and_settings() {
    let (state, user) = spawn_state().await;

    let categories = state.finance_service.list_categories(user.user_id).await.unwrap();
    assert_eq!(categories.len(), 13);
    assert!(categories.iter().any(|c| c.name == "Salary" && c.kind == TransactionKind::Income));

    let settings = state.finance_service.get_settings(user.user_id).await.unwrap();
    assert_eq!(settings.currency, "USD");
    assert_eq!(settings.theme, Theme::Light);
    assert!(settings.notifications);
}

#[tokio::test]
async fn test_budget_moves_from_near_limit_to_over_budget() {
    let (state, user) = spawn_state().await;
    let groceries = category_id(&state, &user, "Groceries").await;
    let finance = &state.finance_service;

    let budget = finance
        .add_budget(
            user.user_id,
            BudgetInput {
                category_id: groceries,
                amount: 100.0,
                period: BudgetPeriod::Monthly,
            },
        )
        .await
        .unwrap();

    finance
        .add_transaction(user.user_id, expense(groceries, 85.0, "2024-01-05", "market"))
        .await
        .unwrap();
    // Last month's spending does not count.
    finance
        .add_transaction(user.user_id, expense(groceries, 500.0, "2023-12-20", "holiday"))
        .await
        .unwrap();

    let statuses = finance.list_budgets(user.user_id).await.unwrap();
    let status = statuses.iter().find(|s| s.budget_id == budget.id).unwrap();
    assert!((status.spent - 85.0).abs() < 1e-9);
    assert!((status.percentage - 85.0).abs() < 1e-9);
    assert_eq!(status.state, BudgetState::NearLimit);

    finance
        .add_transaction(user.user_id, expense(groceries, 20.0, "2024-01-08", "top up"))
        .await
        .unwrap();

    let statuses = finance.list_budgets(user.user_id).await.unwrap();
    let status = statuses.iter().find(|s| s.budget_id == budget.id).unwrap();
    assert!((status.spent - 105.0).abs() < 1e-9);
    assert!((status.remaining + 5.0).abs() < 1e-9);
    assert_eq!(status.state, BudgetState::OverBudget);

    let dashboard = finance.dashboard(user.user_id).await.unwrap();
    assert_eq!(dashboard.budget_alerts.len(), 1);
}

#[tokio::test]
async fn test_duplicate_budget_is_a_conflict() {
    let (state, user) = spawn_state().await;
    let rent = category_id(&state, &user, "Rent").await;
    let input = BudgetInput {
        category_id: rent,
        amount: 800.0,
        period: BudgetPeriod::Monthly,
    };

    state.finance_service.add_budget(user.user_id, input.clone()).await.unwrap();
    let err = state.finance_service.add_budget(user.user_id, input).await.unwrap_err();
    assert!(matches!(err, FinanceError::Conflict(_)));

    let yearly = state
        .finance_service
        .add_budget(
            user.user_id,
            BudgetInput {
                category_id: rent,
                amount: 9000.0,
                period: BudgetPeriod::Yearly,
            },
        )
        .await;
    assert!(yearly.is_ok());
}

#[tokio::test]
async fn test_paying_monthly_bill_records_expense_and_successor() {
    let (state, user) = spawn_state().await;
    let internet = category_id(&state, &user, "Internet").await;
    let finance = &state.finance_service;

    let bill = finance
        .add_bill(
            user.user_id,
            BillInput {
                name: "Fiber".to_string(),
                amount: 45.0,
                due_date: "2024-01-15".to_string(),
                recurrence: Recurrence::Monthly,
                category_id: internet,
            },
        )
        .await
        .unwrap();

    let listed = finance.list_bills(user.user_id).await.unwrap();
    assert_eq!(listed[0].state, BillState::DueSoon);
    assert_eq!(listed[0].days_until_due, Some(5));

    let payment = finance.pay_bill(user.user_id, bill.id).await.unwrap();
    assert!(payment.bill.paid);
    assert!(payment.bill.paid_at.is_some());

    assert_eq!(payment.transaction.kind, TransactionKind::Expense);
    assert!((payment.transaction.amount - 45.0).abs() < 1e-9);
    assert_eq!(payment.transaction.category_id, internet);
    assert_eq!(payment.transaction.date, "2024-01-10");
    assert_eq!(payment.transaction.note, "Payment for: Fiber");

    let successor = payment.successor.expect("monthly bill must roll over");
    assert_eq!(successor.due_date, "2024-02-15");
    assert!(!successor.paid);
    assert_eq!(successor.name, "Fiber");

    let bills = finance.list_bills(user.user_id).await.unwrap();
    assert_eq!(bills.len(), 2);

    let err = finance.pay_bill(user.user_id, bill.id).await.unwrap_err();
    assert!(matches!(err, FinanceError::Conflict(_)));

    // Unpaying keeps the payment and does not remove the successor.
    let unpaid = finance.unpay_bill(user.user_id, bill.id).await.unwrap();
    assert!(!unpaid.paid);
    assert_eq!(finance.list_bills(user.user_id).await.unwrap().len(), 2);
    let transactions = finance
        .list_transactions(user.user_id, &TransactionFilter::default())
        .await
        .unwrap();
    assert_eq!(transactions.len(), 1);
}

#[tokio::test]
async fn test_one_off_bill_has_no_successor() {
    let (state, user) = spawn_state().await;
    let utilities = category_id(&state, &user, "Utilities").await;

    let bill = state
        .finance_service
        .add_bill(
            user.user_id,
            BillInput {
                name: "Water deposit".to_string(),
                amount: 60.0,
                due_date: "2024-01-02".to_string(),
                recurrence: Recurrence::None,
                category_id: utilities,
            },
        )
        .await
        .unwrap();

    let listed = state.finance_service.list_bills(user.user_id).await.unwrap();
    assert_eq!(listed[0].state, BillState::Overdue);

    let payment = state.finance_service.pay_bill(user.user_id, bill.id).await.unwrap();
    assert!(payment.successor.is_none());
}

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() {
    let (state, user) = spawn_state().await;
    let finance = &state.finance_service;

    let pets = finance
        .add_category(
            user.user_id,
            CategoryInput {
                name: "Pets".to_string(),
                kind: TransactionKind::Expense,
                icon: "paw".to_string(),
            },
        )
        .await
        .unwrap();

    let duplicate = finance
        .add_category(
            user.user_id,
            CategoryInput {
                name: "pets".to_string(),
                kind: TransactionKind::Expense,
                icon: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(duplicate, FinanceError::Conflict(_)));

    let tx = finance
        .add_transaction(user.user_id, expense(pets.id, 30.0, "2024-01-09", "vet"))
        .await
        .unwrap();

    let err = finance.delete_category(user.user_id, pets.id).await.unwrap_err();
    assert!(matches!(err, FinanceError::Conflict(_)));

    finance.delete_transaction(user.user_id, tx.id).await.unwrap();
    finance.delete_category(user.user_id, pets.id).await.unwrap();

    let err = finance.delete_category(user.user_id, pets.id).await.unwrap_err();
    assert!(matches!(err, FinanceError::NotFound(_)));
}

#[tokio::test]
async fn test_transaction_validation_and_filters() {
    let (state, user) = spawn_state().await;
    let groceries = category_id(&state, &user, "Groceries").await;
    let salary = category_id(&state, &user, "Salary").await;
    let finance = &state.finance_service;

    let err = finance
        .add_transaction(user.user_id, expense(groceries, 0.0, "2024-01-05", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, FinanceError::Validation(_)));

    let err = finance
        .add_transaction(user.user_id, expense(groceries, 5.0, "05/01/2024", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, FinanceError::Validation(_)));

    let err = finance
        .add_transaction(user.user_id, expense(9999, 5.0, "2024-01-05", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, FinanceError::NotFound(_)));

    finance
        .add_transaction(user.user_id, expense(groceries, 12.0, "2024-01-09", "Bread and milk"))
        .await
        .unwrap();
    finance
        .add_transaction(user.user_id, expense(groceries, 40.0, "2023-11-02", "Old groceries"))
        .await
        .unwrap();
    finance
        .add_transaction(
            user.user_id,
            TransactionInput {
                kind: TransactionKind::Income,
                amount: 2500.0,
                category_id: salary,
                date: "2024-01-01".to_string(),
                note: "January salary".to_string(),
            },
        )
        .await
        .unwrap();

    let this_month = finance
        .list_transactions(
            user.user_id,
            &TransactionFilter {
                period: Some(FilterPeriod::Month),
                ..TransactionFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(this_month.len(), 2);
    assert_eq!(this_month[0].date, "2024-01-09");

    let searched = finance
        .list_transactions(
            user.user_id,
            &TransactionFilter {
                search: Some("MILK".to_string()),
                ..TransactionFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(searched.len(), 1);

    let income = finance
        .list_transactions(
            user.user_id,
            &TransactionFilter {
                kind: Some(TransactionKind::Income),
                ..TransactionFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(income.len(), 1);

    let dashboard = finance.dashboard(user.user_id).await.unwrap();
    assert!((dashboard.summary.balance - 2448.0).abs() < 1e-9);
    assert!((dashboard.summary.month_expense - 12.0).abs() < 1e-9);
    assert!((dashboard.summary.month_remaining - 2488.0).abs() < 1e-9);

    let report = finance.report(user.user_id).await.unwrap();
    assert_eq!(report.trend.len(), 12);
    assert_eq!(report.comparison.len(), 6);
    assert_eq!(report.breakdown[0].name, "Groceries");
    assert!((report.breakdown[0].total - 52.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_settings_patch() {
    let (state, user) = spawn_state().await;
    let finance = &state.finance_service;

    let updated = finance
        .update_settings(
            user.user_id,
            SettingsPatch {
                currency: Some("kes".to_string()),
                theme: Some(Theme::Dark),
                ..SettingsPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.currency, "KES");
    assert_eq!(updated.theme, Theme::Dark);
    assert!(updated.notifications);

    let err = finance
        .update_settings(user.user_id, SettingsPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, FinanceError::Validation(_)));

    let err = finance
        .update_settings(
            user.user_id,
            SettingsPatch {
                currency: Some("DOLLARS".to_string()),
                ..SettingsPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FinanceError::Validation(_)));
}
