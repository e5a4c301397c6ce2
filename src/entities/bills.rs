use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::Recurrence;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub name: String,

    pub amount: f64,

    /// `YYYY-MM-DD`
    pub due_date: String,

    pub recurrence: Recurrence,

    pub category_id: i32,

    pub paid: bool,

    pub paid_at: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
