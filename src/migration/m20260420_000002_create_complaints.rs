//! Migration: Create complaints table.
//!
//! The reference code is NULL until assigned right after the first
//! insert; the id sequence it derives from only exists post-insert.

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
                CREATE TABLE complaints (
                    id BIGSERIAL PRIMARY KEY,
                    reference_code VARCHAR(24) UNIQUE,
                    title VARCHAR(255) NOT NULL,
                    description TEXT NOT NULL,
                    category VARCHAR(50) NOT NULL
                        CHECK (category IN ('sanitation', 'infrastructure', 'utilities',
                                            'public_safety', 'healthcare', 'education', 'other')),
                    status VARCHAR(20) NOT NULL DEFAULT 'received'
                        CHECK (status IN ('received', 'in_progress', 'resolved')),
                    urgency VARCHAR(20) NOT NULL DEFAULT 'medium'
                        CHECK (urgency IN ('low', 'medium', 'high', 'critical')),
                    location VARCHAR(255) NOT NULL,

                    -- Deleting a submitter removes their complaints;
                    -- deleting an assignee only clears the assignment
                    submitter_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,

                    staff_remark TEXT NOT NULL DEFAULT '',
                    last_status_changed_at TIMESTAMPTZ,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Index for listing by status
                CREATE INDEX idx_complaints_status ON complaints(status);

                -- Index for filtering by category
                CREATE INDEX idx_complaints_category ON complaints(category);

                -- Index for the newest-first listing order
                CREATE INDEX idx_complaints_created_at ON complaints(created_at DESC);

                -- Index for per-submitter listings
                CREATE INDEX idx_complaints_submitter_id ON complaints(submitter_id);

                -- Trigger to update updated_at
                CREATE TRIGGER update_complaints_updated_at
                    BEFORE UPDATE ON complaints
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
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
                DROP TRIGGER IF EXISTS update_complaints_updated_at ON complaints;
                DROP TABLE IF EXISTS complaints CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
