use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per issued token. (user, domain) is deliberately not unique:
        // lookups take any matching row and eviction removes all of them.
        let create_table_sql = r#"
            CREATE TABLE IF NOT EXISTS api_platform.api_tokens (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                "user" VARCHAR(255) NOT NULL,
                domain VARCHAR(255) NOT NULL,
                token TEXT NOT NULL,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"CREATE INDEX IF NOT EXISTS idx_api_tokens_user_domain
                 ON api_platform.api_tokens("user", domain)"#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_api_tokens_created_at
                 ON api_platform.api_tokens(created_at)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS api_platform.api_tokens")
            .await?;

        Ok(())
    }
}
