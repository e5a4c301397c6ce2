//! Integration tests for event reminders.

use chrono::{Duration, TimeZone, Utc};
use pesaflow::clock::FixedClock;
use pesaflow::config::Config;
use pesaflow::domain::Session;
use pesaflow::domain::events::NotificationEvent;
use pesaflow::models::finance::{EventInput, SettingsPatch};
use pesaflow::models::user::NewUser;
use pesaflow::services::SimulatedTransport;
use pesaflow::state::SharedState;
use std::sync::Arc;

async fn spawn_state() -> (SharedState, FixedClock, Session) {
    let db_path =
        std::env::temp_dir().join(format!("pesaflow-reminder-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
    let state = SharedState::with_parts(config, Arc::new(clock.clone()), Arc::new(SimulatedTransport))
        .await
        .expect("failed to create state");

    let session = state
        .account_service
        .register(NewUser {
            name: "Reminder User".to_string(),
            email: "reminders@example.com".to_string(),
            password: "secret123".to_string(),
            profile_image: None,
        })
        .await
        .expect("registration failed");

    (state, clock, session)
}

async fn schedule(state: &SharedState, user: &Session, title: &str, time: &str) -> i32 {
    state
        .finance_service
        .add_event(
            user.user_id,
            EventInput {
                title: title.to_string(),
                date: "2024-05-01".to_string(),
                time: Some(time.to_string()),
                notes: String::new(),
            },
        )
        .await
        .expect("add_event failed")
        .id
}

#[tokio::test]
async fn test_only_events_inside_window_fire() {
    let (state, _, user) = spawn_state().await;
    let soon = schedule(&state, &user, "Call the bank", "09:10").await;
    schedule(&state, &user, "Budget review", "09:20").await;

    let mut events = state.event_bus.subscribe();

    let report = state.reminders.run_once(user.user_id).await.unwrap();
    assert_eq!(report.checked, 2);
    assert_eq!(report.fired, 1);
    assert!(!report.suppressed);

    match events.try_recv() {
        Ok(NotificationEvent::EventReminder { event_id, title, .. }) => {
            assert_eq!(event_id, soon);
            assert_eq!(title, "Call the bank");
        }
        other => panic!("expected an event reminder, got {other:?}"),
    }

    let stored = state.finance_service.list_events(user.user_id).await.unwrap();
    let notified = stored.iter().find(|e| e.id == soon).unwrap();
    assert!(notified.notified_at.is_some());
}

#[tokio::test]
async fn test_cooldown_prevents_immediate_refire() {
    let (state, clock, user) = spawn_state().await;
    schedule(&state, &user, "Pay rent", "09:10").await;

    assert_eq!(state.reminders.run_once(user.user_id).await.unwrap().fired, 1);

    clock.advance(Duration::minutes(1));
    assert_eq!(state.reminders.run_once(user.user_id).await.unwrap().fired, 0);

    // Past the cooldown and still inside the window: delivered again.
    clock.advance(Duration::minutes(2));
    assert_eq!(state.reminders.run_once(user.user_id).await.unwrap().fired, 1);

    // Once the event has started it is no longer reminded.
    clock.advance(Duration::minutes(10));
    assert_eq!(state.reminders.run_once(user.user_id).await.unwrap().fired, 0);
}

#[tokio::test]
async fn test_disabled_notifications_suppress_without_stamping() {
    let (state, _, user) = spawn_state().await;
    let id = schedule(&state, &user, "Tax deadline", "09:05").await;

    state
        .finance_service
        .update_settings(
            user.user_id,
            SettingsPatch {
                notifications: Some(false),
                ..SettingsPatch::default()
            },
        )
        .await
        .unwrap();

    let report = state.reminders.run_once(user.user_id).await.unwrap();
    assert!(report.suppressed);
    assert_eq!(report.fired, 0);

    let stored = state.finance_service.list_events(user.user_id).await.unwrap();
    assert!(stored.iter().find(|e| e.id == id).unwrap().notified_at.is_none());
}

#[tokio::test]
async fn test_rescheduling_clears_notification_stamp() {
    let (state, _, user) = spawn_state().await;
    let id = schedule(&state, &user, "Insurance renewal", "09:10").await;

    assert_eq!(state.reminders.run_once(user.user_id).await.unwrap().fired, 1);

    let moved = state
        .finance_service
        .update_event(
            user.user_id,
            id,
            EventInput {
                title: "Insurance renewal".to_string(),
                date: "2024-05-01".to_string(),
                time: Some("09:12".to_string()),
                notes: String::new(),
            },
        )
        .await
        .unwrap();
    assert!(moved.notified_at.is_none());

    assert_eq!(state.reminders.run_once(user.user_id).await.unwrap().fired, 1);
}
