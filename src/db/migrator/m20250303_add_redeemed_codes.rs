use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(RedeemedCodes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Codes held by existing licenses are already spent.
        manager
            .get_connection()
            .execute_unprepared(
                "INSERT OR IGNORE INTO redeemed_codes (code, user_id, redeemed_at) \
                 SELECT activation_code, user_id, activated_at FROM licenses \
                 WHERE activation_code IS NOT NULL",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RedeemedCodes).to_owned())
            .await?;

        Ok(())
    }
}
