//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::domain::{Session, UserId};
use crate::models::user::{NewUser, User};
use crate::services::account_service::{AccountError, AccountService};

pub struct SeaOrmAccountService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn check_password(&self, password: &str) -> Result<(), AccountError> {
        if password.chars().count() < self.security.min_password_length {
            return Err(AccountError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }
        Ok(())
    }
}

/// Emails are compared trimmed and lower-cased.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn session_for(user: &User) -> Session {
    Session {
        user_id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(&self, input: NewUser) -> Result<Session, AccountError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AccountError::Validation("Name is required".to_string()));
        }

        let email = normalize_email(&input.email);
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(AccountError::Validation("Email address is invalid".to_string()));
        }

        self.check_password(&input.password)?;

        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let user = self
            .store
            .create_user(
                &NewUser {
                    name,
                    email,
                    password: input.password,
                    profile_image: input.profile_image,
                },
                &self.security,
            )
            .await?;

        info!(user_id = %user.id, "Account registered");
        Ok(session_for(&user))
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session, AccountError> {
        let user = self
            .store
            .verify_user_password(&normalize_email(email), password)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        info!(user_id = %user.id, "User logged in");
        Ok(session_for(&user))
    }

    async fn profile(&self, user_id: UserId) -> Result<User, AccountError> {
        self.store
            .get_user(user_id.value())
            .await?
            .ok_or(AccountError::UserNotFound)
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        name: Option<&str>,
        profile_image: Option<Option<String>>,
    ) -> Result<User, AccountError> {
        let name = name.map(str::trim);
        if name.is_some_and(str::is_empty) {
            return Err(AccountError::Validation("Name is required".to_string()));
        }

        self.profile(user_id).await?;
        Ok(self
            .store
            .update_user_profile(user_id.value(), name, profile_image)
            .await?)
    }

    async fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        self.check_password(new_password)?;

        if current_password == new_password {
            return Err(AccountError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let user = self.profile(user_id).await?;
        let verified = self
            .store
            .verify_user_password(&user.email, current_password)
            .await?;
        if verified.is_none() {
            return Err(AccountError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(user_id.value(), new_password, &self.security)
            .await?;
        Ok(())
    }
}
