use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS api_platform;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO api_platform, public;")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // CASCADE removes every table the later migrations created
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS api_platform CASCADE;")
            .await?;

        Ok(())
    }
}
