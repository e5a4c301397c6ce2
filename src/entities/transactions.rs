use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::TransactionKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub kind: TransactionKind,

    pub amount: f64,

    pub category_id: i32,

    /// `YYYY-MM-DD`
    pub date: String,

    pub note: String,

    pub updated_at: String,

    pub synced: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
