//! Domain service for trials and activation codes.
//!
//! Licensing is checked locally and is not a security boundary.

use thiserror::Error;

use crate::domain::UserId;
use crate::entities::licenses;
use crate::license::{CodeError, LicenseInfo};

#[derive(Debug, Error)]
pub enum LicenseError {
    #[error("Invalid activation code format")]
    InvalidFormat,

    #[error("Invalid activation code")]
    InvalidCode,

    #[error("Trial codes cannot be activated; start a free trial instead")]
    TrialNotAllowedHere,

    #[error("Activation code has already been used")]
    CodeAlreadyUsed,

    #[error("Free trial has already been used")]
    TrialAlreadyUsed,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CodeError> for LicenseError {
    fn from(err: CodeError) -> Self {
        match err {
            CodeError::InvalidFormat => Self::InvalidFormat,
            CodeError::InvalidCode => Self::InvalidCode,
            CodeError::TrialNotAllowedHere => Self::TrialNotAllowedHere,
        }
    }
}

impl From<sea_orm::DbErr> for LicenseError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for LicenseError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait LicenseService: Send + Sync {
    /// Creates a one-day trial.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::TrialAlreadyUsed`] if the user has any license row.
    async fn start_free_trial(&self, user_id: UserId) -> Result<licenses::Model, LicenseError>;

    /// Activates a paid code for the user, replacing a trial or lapsed license.
    ///
    /// # Errors
    ///
    /// Returns a code error for malformed, unknown or trial codes and
    /// [`LicenseError::CodeAlreadyUsed`] when any license already carries the code.
    async fn activate(&self, user_id: UserId, code: &str) -> Result<licenses::Model, LicenseError>;

    /// Permanent, or expiring strictly after now.
    async fn check_valid(&self, user_id: UserId) -> Result<bool, LicenseError>;

    async fn status(&self, user_id: UserId) -> Result<LicenseInfo, LicenseError>;
}
