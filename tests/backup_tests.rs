//! Integration tests for JSON export and import.

use chrono::{TimeZone, Utc};
use pesaflow::clock::FixedClock;
use pesaflow::config::Config;
use pesaflow::domain::{BudgetPeriod, Recurrence, Session, TransactionKind};
use pesaflow::models::finance::{BillInput, BudgetInput, TransactionInput};
use pesaflow::models::user::NewUser;
use pesaflow::reports::{TransactionFilter, category_name};
use pesaflow::services::{Backup, BackupError, SimulatedTransport};
use pesaflow::state::SharedState;
use std::sync::Arc;

async fn spawn_state() -> SharedState {
    let db_path =
        std::env::temp_dir().join(format!("pesaflow-backup-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 4, 2, 8, 30, 0).unwrap());
    SharedState::with_parts(config, Arc::new(clock), Arc::new(SimulatedTransport))
        .await
        .expect("failed to create state")
}

async fn register(state: &SharedState, email: &str) -> Session {
    state
        .account_service
        .register(NewUser {
            name: "Backup User".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            profile_image: None,
        })
        .await
        .expect("registration failed")
}

async fn category_id(state: &SharedState, user: &Session, name: &str) -> i32 {
    state
        .finance_service
        .list_categories(user.user_id)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == name)
        .unwrap()
        .id
}

#[tokio::test]
async fn test_export_then_import_into_another_account() {
    let state = spawn_state().await;
    let source = register(&state, "source@example.com").await;
    let target = register(&state, "target@example.com").await;
    let finance = &state.finance_service;

    let transport = category_id(&state, &source, "Transport").await;
    finance
        .add_transaction(
            source.user_id,
            TransactionInput {
                kind: TransactionKind::Expense,
                amount: 14.5,
                category_id: transport,
                date: "2024-04-01".to_string(),
                note: "Bus pass".to_string(),
            },
        )
        .await
        .unwrap();
    finance
        .add_budget(
            source.user_id,
            BudgetInput {
                category_id: transport,
                amount: 120.0,
                period: BudgetPeriod::Monthly,
            },
        )
        .await
        .unwrap();
    finance
        .add_bill(
            source.user_id,
            BillInput {
                name: "Parking".to_string(),
                amount: 30.0,
                due_date: "2024-04-20".to_string(),
                recurrence: Recurrence::Monthly,
                category_id: transport,
            },
        )
        .await
        .unwrap();

    let path = std::env::temp_dir().join(format!("pesaflow-export-{}.json", uuid::Uuid::new_v4()));
    let exported = state
        .backup_service
        .export_to_path(source.user_id, &path)
        .await
        .unwrap();
    assert_eq!(exported.transactions.as_ref().map(Vec::len), Some(1));
    assert_eq!(exported.exported_at.as_deref(), Some("2024-04-02T08:30:00+00:00"));

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"exportedAt\""));

    let counts = state
        .backup_service
        .import_from_path(target.user_id, &path)
        .await
        .unwrap();
    assert_eq!(counts.transactions, 1);
    assert_eq!(counts.budgets, 1);
    assert_eq!(counts.bills, 1);
    assert_eq!(counts.categories, 13);

    let categories = finance.list_categories(target.user_id).await.unwrap();
    assert_eq!(categories.len(), 26);

    let imported = finance
        .list_transactions(target.user_id, &TransactionFilter::default())
        .await
        .unwrap();
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].note, "Bus pass");
    assert!(categories.iter().any(|c| c.id == imported[0].category_id));
    assert_eq!(category_name(&categories, imported[0].category_id), "Transport");
    assert_ne!(imported[0].category_id, transport);

    // The source account is untouched.
    let source_rows = finance
        .list_transactions(source.user_id, &TransactionFilter::default())
        .await
        .unwrap();
    assert_eq!(source_rows.len(), 1);
}

#[tokio::test]
async fn test_import_requires_transactions_and_categories() {
    let state = spawn_state().await;
    let user = register(&state, "partial@example.com").await;

    let backup = Backup::from_json(r#"{"transactions": []}"#).unwrap();
    let err = state.backup_service.import(user.user_id, backup).await.unwrap_err();
    assert!(matches!(err, BackupError::MissingField("categories")));

    let backup = Backup::from_json(r#"{"categories": []}"#).unwrap();
    let err = state.backup_service.import(user.user_id, backup).await.unwrap_err();
    assert!(matches!(err, BackupError::MissingField("transactions")));

    let err = Backup::from_json("not json").unwrap_err();
    assert!(matches!(err, BackupError::Format(_)));

    // Nothing was written by the rejected imports.
    assert_eq!(
        state.finance_service.list_categories(user.user_id).await.unwrap().len(),
        13
    );
}
