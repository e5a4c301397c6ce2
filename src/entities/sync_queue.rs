use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sync_queue")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Mutation type tag, e.g. `transaction` or `delete_bill`.
    pub kind: String,

    /// JSON-serialized `Mutation`.
    pub payload: String,

    pub created_at: String,

    pub delivered: bool,

    pub attempts: i32,

    pub last_attempt_at: Option<String>,

    pub last_error: Option<String>,

    pub delivered_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
