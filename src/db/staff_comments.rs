//! Database operations for staff comments.

use sea_orm::*;

use crate::entity::{staff_comment, user};
use crate::error::{AppError, AppResult};
use crate::models::StaffCommentView;

use super::DbPool;

impl DbPool {
    /// List a complaint's internal comments with author usernames, newest
    /// first.
    pub async fn staff_comments_for_complaint(
        &self,
        complaint_id: i64,
    ) -> AppResult<Vec<StaffCommentView>> {
        let rows = staff_comment::Entity::find()
            .filter(staff_comment::Column::ComplaintId.eq(complaint_id))
            .find_also_related(user::Entity)
            .order_by_desc(staff_comment::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list comments: {}", e)))?;

        let views = rows
            .into_iter()
            .map(|(comment, author)| StaffCommentView {
                id: comment.id,
                author: author.map(|a| a.username).unwrap_or_default(),
                body: comment.body,
                created_at: comment.created_at,
            })
            .collect();

        Ok(views)
    }
}
