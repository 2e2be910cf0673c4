//! Database operations for accounts.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::user;
use crate::error::{AppError, AppResult};
use crate::models::UserResponse;

use super::DbPool;

impl DbPool {
    /// Create an account. Username and email must be unique; the email is
    /// compared case-insensitively. Both failures are reported together.
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        is_staff: bool,
    ) -> AppResult<user::Model> {
        let email = email.to_lowercase();
        let mut errors = Vec::new();

        let username_taken = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.connection())
            .await?
            .is_some();
        if username_taken {
            errors.push("username: An account with this username already exists.".to_string());
        }

        let email_taken = user::Entity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(self.connection())
            .await?
            .is_some();
        if email_taken {
            errors.push("email: An account with this email already exists.".to_string());
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            email: Set(email),
            password_hash: Set(password_hash.to_string()),
            is_staff: Set(is_staff),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert user: {}", e)))?;

        Ok(inserted)
    }

    /// Find an account by username.
    pub async fn find_user_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user: {}", e)))?;

        Ok(result)
    }

    /// Find an account by id.
    pub async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<user::Model>> {
        let result = user::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user: {}", e)))?;

        Ok(result)
    }
}

/// Map an account row to its response shape (no secrets).
pub fn model_to_response(m: user::Model) -> UserResponse {
    UserResponse {
        id: m.id,
        username: m.username,
        email: m.email,
        is_staff: m.is_staff,
        created_at: m.created_at,
    }
}
