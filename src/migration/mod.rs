//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260420_000001_create_users;
mod m20260420_000002_create_complaints;
mod m20260420_000003_create_attachments;
mod m20260420_000004_create_staff_comments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260420_000001_create_users::Migration),
            Box::new(m20260420_000002_create_complaints::Migration),
            Box::new(m20260420_000003_create_attachments::Migration),
            Box::new(m20260420_000004_create_staff_comments::Migration),
        ]
    }
}
