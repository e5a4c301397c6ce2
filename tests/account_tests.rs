//! Integration tests for registration, login and profile changes.

use pesaflow::config::Config;
use pesaflow::models::user::NewUser;
use pesaflow::services::AccountError;
use pesaflow::state::SharedState;

async fn spawn_state() -> SharedState {
    let db_path =
        std::env::temp_dir().join(format!("pesaflow-account-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    SharedState::new(config)
        .await
        .expect("failed to create state")
}

fn new_user(email: &str, password: &str) -> NewUser {
    NewUser {
        name: "Amina".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        profile_image: None,
    }
}

#[tokio::test]
async fn test_register_and_login() {
    let state = spawn_state().await;
    let accounts = &state.account_service;

    let session = accounts
        .register(new_user("  Amina@Example.com ", "secret123"))
        .await
        .unwrap();
    assert_eq!(session.email, "amina@example.com");
    assert_eq!(session.name, "Amina");

    let login = accounts.login("AMINA@example.com", "secret123").await.unwrap();
    assert_eq!(login.user_id, session.user_id);

    let err = accounts.login("amina@example.com", "wrong-pass").await.unwrap_err();
    assert!(matches!(err, AccountError::InvalidCredentials));

    let err = accounts.login("nobody@example.com", "secret123").await.unwrap_err();
    assert!(matches!(err, AccountError::InvalidCredentials));
}

#[tokio::test]
async fn test_registration_validation() {
    let state = spawn_state().await;
    let accounts = &state.account_service;

    accounts
        .register(new_user("taken@example.com", "secret123"))
        .await
        .unwrap();

    let err = accounts
        .register(new_user("TAKEN@example.com", "another1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::EmailTaken));

    let err = accounts
        .register(new_user("no-at-sign", "secret123"))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Validation(_)));

    let err = accounts
        .register(new_user("short@example.com", "abc"))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Validation(_)));

    let mut blank = new_user("blank@example.com", "secret123");
    blank.name = "   ".to_string();
    let err = accounts.register(blank).await.unwrap_err();
    assert!(matches!(err, AccountError::Validation(_)));
}

#[tokio::test]
async fn test_profile_and_password_changes() {
    let state = spawn_state().await;
    let accounts = &state.account_service;

    let session = accounts
        .register(new_user("profile@example.com", "secret123"))
        .await
        .unwrap();

    let updated = accounts
        .update_profile(
            session.user_id,
            Some("Amina W."),
            Some(Some("avatar.png".to_string())),
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Amina W.");
    assert_eq!(updated.profile_image.as_deref(), Some("avatar.png"));

    let err = accounts
        .change_password(session.user_id, "not-current", "newsecret1")
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Validation(_)));

    accounts
        .change_password(session.user_id, "secret123", "newsecret1")
        .await
        .unwrap();

    assert!(accounts.login("profile@example.com", "secret123").await.is_err());
    assert!(accounts.login("profile@example.com", "newsecret1").await.is_ok());

    let profile = accounts.profile(session.user_id).await.unwrap();
    assert_eq!(profile.email, "profile@example.com");
}
