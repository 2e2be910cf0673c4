//! Migration: Create staff_comments table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE staff_comments (
                    id UUID PRIMARY KEY,
                    complaint_id BIGINT NOT NULL REFERENCES complaints(id) ON DELETE CASCADE,
                    author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    body TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Index for listing a complaint's comments, newest first
                CREATE INDEX idx_staff_comments_complaint_id
                    ON staff_comments(complaint_id, created_at DESC);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TABLE IF EXISTS staff_comments CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
