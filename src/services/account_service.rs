//! Domain service for registration, login and profile changes.

use thiserror::Error;

use crate::domain::{Session, UserId};
use crate::models::user::{NewUser, User};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates the account with its default categories and settings.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::EmailTaken`] for a registered email and
    /// [`AccountError::Validation`] for a blank name, malformed email or short password.
    async fn register(&self, input: NewUser) -> Result<Session, AccountError>;

    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredentials`] if login fails.
    async fn login(&self, email: &str, password: &str) -> Result<Session, AccountError>;

    async fn profile(&self, user_id: UserId) -> Result<User, AccountError>;

    async fn update_profile(
        &self,
        user_id: UserId,
        name: Option<&str>,
        profile_image: Option<Option<String>>,
    ) -> Result<User, AccountError>;

    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] if the current password is wrong or the new one is too short.
    async fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError>;
}
