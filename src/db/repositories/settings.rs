use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::{prelude::*, settings};
use crate::models::finance::SettingsPatch;

pub struct SettingsRepository {
    conn: DatabaseConnection,
}

impl SettingsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, user_id: i32) -> Result<Option<settings::Model>> {
        Settings::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query settings")
    }

    pub async fn apply(
        &self,
        existing: settings::Model,
        patch: &SettingsPatch,
    ) -> Result<settings::Model> {
        let mut active: settings::ActiveModel = existing.into();
        if let Some(currency) = &patch.currency {
            active.currency = Set(currency.clone());
        }
        if let Some(theme) = patch.theme {
            active.theme = Set(theme);
        }
        if let Some(notifications) = patch.notifications {
            active.notifications = Set(notifications);
        }
        if let Some(locale) = &patch.locale {
            active.locale = Set(locale.clone());
        }

        active
            .update(&self.conn)
            .await
            .context("Failed to update settings")
    }
}
