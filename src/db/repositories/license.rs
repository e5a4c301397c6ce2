use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};

use crate::entities::{licenses, prelude::*, redeemed_codes};

pub struct LicenseRepository {
    conn: DatabaseConnection,
}

impl LicenseRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, user_id: i32) -> Result<Option<licenses::Model>> {
        Licenses::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query license")
    }

    /// True once any user has activated `code`, even if their license row has
    /// since moved on to another code.
    pub async fn is_code_redeemed(&self, code: &str) -> Result<bool> {
        let found = RedeemedCodes::find_by_id(code.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query redeemed codes")?;
        Ok(found.is_some())
    }

    /// Inserts the row, or overwrites the user's existing row in place. A code
    /// carried by the license is recorded as redeemed in the same transaction.
    pub async fn save(&self, license: licenses::Model) -> Result<licenses::Model> {
        let txn = self.conn.begin().await?;

        if let Some(code) = &license.activation_code {
            redeemed_codes::ActiveModel {
                code: Set(code.clone()),
                user_id: Set(license.user_id),
                redeemed_at: Set(license.activated_at.clone()),
            }
            .insert(&txn)
            .await
            .context("Failed to record redeemed code")?;
        }

        let saved = upsert(&txn, license).await?;
        txn.commit().await?;
        Ok(saved)
    }
}

async fn upsert<C>(conn: &C, license: licenses::Model) -> Result<licenses::Model>
where
    C: ConnectionTrait,
{
    let exists = Licenses::find_by_id(license.user_id)
        .one(conn)
        .await
        .context("Failed to query license")?
        .is_some();

    let active = licenses::ActiveModel {
        user_id: Set(license.user_id),
        activation_code: Set(license.activation_code),
        plan: Set(license.plan),
        is_trial: Set(license.is_trial),
        activated_at: Set(license.activated_at),
        expires_at: Set(license.expires_at),
        status: Set(license.status),
    };

    let saved = if exists {
        active.update(conn).await
    } else {
        active.insert(conn).await
    };

    saved.context("Failed to save license")
}
