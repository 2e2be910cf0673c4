//! Database module providing connection management and queries.

pub mod attachments;
pub mod complaints;
pub mod staff_comments;
pub mod users;

pub use complaints::{NewAttachment, StaffUpdateOutcome};

use sea_orm::{Database, DatabaseConnection};

use crate::error::{AppError, AppResult};

/// Database connection wrapper shared across handlers.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to PostgreSQL.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let conn = Database::connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;
        Ok(DbPool { conn })
    }

    /// Get access to the connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}
