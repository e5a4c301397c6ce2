//! Integration tests for trial start, code activation and license expiry.

use chrono::{Duration, TimeZone, Utc};
use pesaflow::clock::FixedClock;
use pesaflow::config::Config;
use pesaflow::domain::Session;
use pesaflow::license::{LicensePlan, LicenseStatus};
use pesaflow::models::user::NewUser;
use pesaflow::services::{LicenseError, SimulatedTransport};
use pesaflow::state::SharedState;
use std::sync::Arc;

async fn spawn_state() -> (SharedState, FixedClock) {
    let db_path =
        std::env::temp_dir().join(format!("pesaflow-license-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    let state = SharedState::with_parts(config, Arc::new(clock.clone()), Arc::new(SimulatedTransport))
        .await
        .expect("failed to create state");
    (state, clock)
}

async fn register(state: &SharedState, email: &str) -> Session {
    state
        .account_service
        .register(NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            profile_image: None,
        })
        .await
        .expect("registration failed")
}

#[tokio::test]
async fn test_new_user_has_no_license() {
    let (state, _) = spawn_state().await;
    let user = register(&state, "nolicense@example.com").await;

    assert!(!state.license_service.check_valid(user.user_id).await.unwrap());
    let info = state.license_service.status(user.user_id).await.unwrap();
    assert_eq!(info.status, LicenseStatus::Inactive);
    assert_eq!(info.message(), "No active license");
}

#[tokio::test]
async fn test_activation_code_is_single_use() {
    let (state, _) = spawn_state().await;
    let first = register(&state, "first@example.com").await;
    let second = register(&state, "second@example.com").await;

    let license = state
        .license_service
        .activate(first.user_id, "mnth-ab12-cd34-ef56")
        .await
        .unwrap();
    assert_eq!(license.plan, LicensePlan::Month);
    assert_eq!(license.activation_code.as_deref(), Some("MNTH-AB12-CD34-EF56"));
    assert!(!license.is_trial);
    assert!(state.license_service.check_valid(first.user_id).await.unwrap());

    let info = state.license_service.status(first.user_id).await.unwrap();
    assert_eq!(info.remaining_days, Some(30));
    assert_eq!(info.message(), "License expires in 30 days");

    let err = state
        .license_service
        .activate(second.user_id, "MNTH-AB12-CD34-EF56")
        .await
        .unwrap_err();
    assert!(matches!(err, LicenseError::CodeAlreadyUsed));
    assert!(!state.license_service.check_valid(second.user_id).await.unwrap());
}

#[tokio::test]
async fn test_replaced_code_stays_spent() {
    let (state, _) = spawn_state().await;
    let first = register(&state, "upgrader@example.com").await;
    let second = register(&state, "latecomer@example.com").await;

    state
        .license_service
        .activate(first.user_id, "MNTH-AB12-CD34-EF56")
        .await
        .unwrap();
    let upgraded = state
        .license_service
        .activate(first.user_id, "YEAR-AB12-CD34-EF56")
        .await
        .unwrap();
    assert_eq!(upgraded.activation_code.as_deref(), Some("YEAR-AB12-CD34-EF56"));

    // The month code no longer sits on any license row but was still used once.
    let err = state
        .license_service
        .activate(second.user_id, "MNTH-AB12-CD34-EF56")
        .await
        .unwrap_err();
    assert!(matches!(err, LicenseError::CodeAlreadyUsed));

    let err = state
        .license_service
        .activate(first.user_id, "MNTH-AB12-CD34-EF56")
        .await
        .unwrap_err();
    assert!(matches!(err, LicenseError::CodeAlreadyUsed));

    // A rejected attempt does not spend anything for the second user.
    let license = state
        .license_service
        .activate(second.user_id, "WEEK-ZX98-YW76-VU54")
        .await
        .unwrap();
    assert_eq!(license.plan, LicensePlan::Week);
}

#[tokio::test]
async fn test_malformed_and_unknown_codes() {
    let (state, _) = spawn_state().await;
    let user = register(&state, "codes@example.com").await;

    let err = state
        .license_service
        .activate(user.user_id, "not-a-code")
        .await
        .unwrap_err();
    assert!(matches!(err, LicenseError::InvalidFormat));

    let err = state
        .license_service
        .activate(user.user_id, "ZZZZ-AB12-CD34-EF56")
        .await
        .unwrap_err();
    assert!(matches!(err, LicenseError::InvalidCode));

    let err = state
        .license_service
        .activate(user.user_id, "TRIA-AB12-CD34-EF56")
        .await
        .unwrap_err();
    assert!(matches!(err, LicenseError::TrialNotAllowedHere));
}

#[tokio::test]
async fn test_trial_only_once_and_expires() {
    let (state, clock) = spawn_state().await;
    let user = register(&state, "trial@example.com").await;

    let trial = state.license_service.start_free_trial(user.user_id).await.unwrap();
    assert!(trial.is_trial);
    assert_eq!(trial.plan, LicensePlan::Trial);
    assert!(trial.activation_code.is_none());

    let err = state
        .license_service
        .start_free_trial(user.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, LicenseError::TrialAlreadyUsed));

    clock.advance(Duration::hours(23));
    assert!(state.license_service.check_valid(user.user_id).await.unwrap());

    clock.advance(Duration::hours(2));
    assert!(!state.license_service.check_valid(user.user_id).await.unwrap());
    let info = state.license_service.status(user.user_id).await.unwrap();
    assert_eq!(info.status, LicenseStatus::Expired);

    // Once expired, later checks never flip back.
    clock.advance(Duration::days(10));
    assert!(!state.license_service.check_valid(user.user_id).await.unwrap());

    // A trial is still refused after expiry.
    assert!(matches!(
        state.license_service.start_free_trial(user.user_id).await,
        Err(LicenseError::TrialAlreadyUsed)
    ));
}

#[tokio::test]
async fn test_expired_trial_can_be_upgraded() {
    let (state, clock) = spawn_state().await;
    let user = register(&state, "upgrade@example.com").await;

    state.license_service.start_free_trial(user.user_id).await.unwrap();
    clock.advance(Duration::days(2));
    assert!(!state.license_service.check_valid(user.user_id).await.unwrap());

    let license = state
        .license_service
        .activate(user.user_id, "LIFE-QW12-ER34-TY56")
        .await
        .unwrap();
    assert_eq!(license.plan, LicensePlan::Lifetime);
    assert!(!license.is_trial);

    clock.advance(Duration::days(3650));
    assert!(state.license_service.check_valid(user.user_id).await.unwrap());
    let info = state.license_service.status(user.user_id).await.unwrap();
    assert_eq!(info.message(), "Lifetime License");
}
