//! Domain service for JSON export and import of a user's data.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::db::ImportCounts;
use crate::domain::UserId;
use crate::entities::{bills, budgets, categories, settings, transactions};
use crate::models::user::User;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Backup file is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Backup file is not valid: {0}")]
    Format(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for BackupError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for BackupError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}

/// Export document. Every list is optional when reading so that a missing
/// required list can be reported by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Backup {
    #[serde(default)]
    pub user: Option<User>,

    pub transactions: Option<Vec<transactions::Model>>,

    #[serde(default)]
    pub budgets: Option<Vec<budgets::Model>>,

    #[serde(default)]
    pub bills: Option<Vec<bills::Model>>,

    pub categories: Option<Vec<categories::Model>>,

    #[serde(default)]
    pub settings: Option<settings::Model>,

    #[serde(rename = "exportedAt", default)]
    pub exported_at: Option<String>,
}

impl Backup {
    /// # Errors
    ///
    /// Returns [`BackupError::Format`] for malformed JSON.
    pub fn from_json(raw: &str) -> Result<Self, BackupError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// # Errors
    ///
    /// Fails only if a record cannot be serialized.
    pub fn to_json(&self) -> Result<String, BackupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[async_trait::async_trait]
pub trait BackupService: Send + Sync {
    async fn export(&self, user_id: UserId) -> Result<Backup, BackupError>;

    /// Re-inserts every record of the backup under `user_id` with new ids.
    /// Imported settings are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::MissingField`] when `transactions` or `categories` is absent.
    async fn import(&self, user_id: UserId, backup: Backup) -> Result<ImportCounts, BackupError>;

    async fn export_to_path(&self, user_id: UserId, path: &Path) -> Result<Backup, BackupError>;

    async fn import_from_path(
        &self,
        user_id: UserId,
        path: &Path,
    ) -> Result<ImportCounts, BackupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lists_parse_as_none() {
        let backup = Backup::from_json(r#"{"transactions": [], "exportedAt": "2024-01-01T00:00:00Z"}"#)
            .unwrap();
        assert_eq!(backup.transactions.map(|t| t.len()), Some(0));
        assert!(backup.categories.is_none());
        assert_eq!(backup.exported_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn malformed_json_is_a_format_error() {
        assert!(matches!(
            Backup::from_json("{not json"),
            Err(BackupError::Format(_))
        ));
    }
}
