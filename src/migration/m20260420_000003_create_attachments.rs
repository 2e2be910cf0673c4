//! Migration: Create attachments table.
//!
//! Rows hold blob-store keys; the binary content lives in S3 and is
//! deleted explicitly before the rows go.

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
                CREATE TABLE attachments (
                    id UUID PRIMARY KEY,
                    complaint_id BIGINT NOT NULL REFERENCES complaints(id) ON DELETE CASCADE,
                    storage_key VARCHAR(512) NOT NULL,
                    original_filename VARCHAR(255) NOT NULL DEFAULT '',
                    size_bytes BIGINT NOT NULL,
                    uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Index for listing a complaint's attachments, oldest first
                CREATE INDEX idx_attachments_complaint_id ON attachments(complaint_id, uploaded_at);
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
                DROP TABLE IF EXISTS attachments CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
