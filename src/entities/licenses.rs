use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::license::{LicensePlan, LicenseStatus};

/// One row per user, updated in place on re-activation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "licenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,

    /// Absent for trials. Globally unique once used.
    #[sea_orm(unique)]
    pub activation_code: Option<String>,

    pub plan: LicensePlan,

    pub is_trial: bool,

    pub activated_at: String,

    /// RFC 3339 timestamp, or `LIFETIME` for permanent licenses.
    pub expires_at: String,

    pub status: LicenseStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
