use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (index name, table, column)
const INDEXES: &[(&str, &str, &str)] = &[
    ("idx_transactions_user_id", "transactions", "user_id"),
    ("idx_transactions_category_id", "transactions", "category_id"),
    ("idx_transactions_date", "transactions", "date"),
    ("idx_budgets_user_id", "budgets", "user_id"),
    ("idx_budgets_category_id", "budgets", "category_id"),
    ("idx_bills_user_id", "bills", "user_id"),
    ("idx_bills_category_id", "bills", "category_id"),
    ("idx_bills_due_date", "bills", "due_date"),
    ("idx_categories_user_id", "categories", "user_id"),
    ("idx_events_user_id", "events", "user_id"),
    ("idx_events_datetime", "events", "datetime"),
    ("idx_sync_queue_delivered", "sync_queue", "delivered"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, column) in INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(*name)
                        .table(Alias::new(*table))
                        .col(Alias::new(*column))
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        for (name, _, _) in INDEXES {
            conn.execute_unprepared(&format!("DROP INDEX IF EXISTS {name}"))
                .await?;
        }

        Ok(())
    }
}
