//! Database operations for attachments.

use sea_orm::*;
use uuid::Uuid;

use crate::entity::{attachment, complaint};
use crate::error::{AppError, AppResult};
use crate::models::AttachmentInfo;

use super::DbPool;
use super::complaints::NewAttachment;

/// Insert attachment rows for a complaint. Runs on the caller's
/// transaction so the rows commit or roll back with the complaint write.
pub(crate) async fn insert_rows<C: ConnectionTrait>(
    conn: &C,
    complaint_id: i64,
    attachments: &[NewAttachment],
    now: chrono::DateTime<chrono::Utc>,
) -> AppResult<()> {
    for record in attachments {
        // Default the display name from the stored key's file name when the
        // upload carried none.
        let original_filename = if record.original_filename.is_empty() {
            record
                .storage_key
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string()
        } else {
            record.original_filename.clone()
        };

        let model = attachment::ActiveModel {
            id: Set(record.id),
            complaint_id: Set(complaint_id),
            storage_key: Set(record.storage_key.clone()),
            original_filename: Set(original_filename),
            size_bytes: Set(record.size_bytes),
            uploaded_at: Set(now),
        };
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert attachment: {}", e)))?;
    }

    Ok(())
}

impl DbPool {
    /// List a complaint's attachments, oldest first.
    pub async fn attachments_for_complaint(
        &self,
        complaint_id: i64,
    ) -> AppResult<Vec<attachment::Model>> {
        let rows = attachment::Entity::find()
            .filter(attachment::Column::ComplaintId.eq(complaint_id))
            .order_by_asc(attachment::Column::UploadedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list attachments: {}", e)))?;

        Ok(rows)
    }

    /// Get an attachment together with its parent complaint.
    pub async fn find_attachment_with_complaint(
        &self,
        id: Uuid,
    ) -> AppResult<Option<(attachment::Model, complaint::Model)>> {
        let result = attachment::Entity::find_by_id(id)
            .find_also_related(complaint::Entity)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get attachment: {}", e)))?;

        match result {
            Some((attachment, Some(complaint))) => Ok(Some((attachment, complaint))),
            // FK guarantees a parent; a missing one means the row is gone.
            _ => Ok(None),
        }
    }
}

/// Map an attachment row to its response shape.
pub fn model_to_info(m: attachment::Model) -> AttachmentInfo {
    AttachmentInfo {
        id: m.id,
        original_filename: m.original_filename,
        size_bytes: m.size_bytes,
        uploaded_at: m.uploaded_at,
    }
}
