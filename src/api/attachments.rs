//! Attachment download endpoint.
//!
//! Proxies blobs from S3 with the viewer authorization of the parent
//! complaint.

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::{DbPool, complaints};
use crate::error::{AppError, AppResult};
use crate::models::attachment::file_extension;
use crate::services::Storage;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// `inline=1` serves the file for in-browser viewing instead of as a
    /// download.
    #[serde(default)]
    pub inline: Option<String>,
}

/// Download an attachment (owner or staff only).
///
/// GET /attachments/{id}/download?inline=1
#[utoipa::path(
    get,
    path = "/api/v1/attachments/{id}/download",
    tag = "Attachments",
    params(
        ("id" = Uuid, Path, description = "Attachment id"),
        ("inline" = Option<String>, Query, description = "Set to 1 for inline disposition")
    ),
    responses(
        (status = 200, description = "Attachment content"),
        (status = 403, description = "Not allowed to access", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown attachment", body = crate::error::ErrorResponse)
    )
)]
#[get("/attachments/{id}/download")]
pub async fn download_attachment(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    path: web::Path<Uuid>,
    query: web::Query<DownloadQuery>,
) -> AppResult<HttpResponse> {
    let attachment_id = path.into_inner();

    let (attachment, complaint_row) = pool
        .find_attachment_with_complaint(attachment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Attachment".to_string()))?;

    let complaint = complaints::model_to_complaint(complaint_row)?;
    if !complaint.can_be_viewed_by(auth.user_id(), auth.is_staff()) {
        return Err(AppError::Forbidden(
            "You do not have permission to access this file.".to_string(),
        ));
    }

    let (data, stored_content_type) = storage.get(&attachment.storage_key).await?;

    let content_type = stored_content_type.unwrap_or_else(|| {
        Storage::content_type_for_extension(&file_extension(&attachment.storage_key)).to_string()
    });

    let filename = if attachment.original_filename.is_empty() {
        attachment
            .storage_key
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    } else {
        attachment.original_filename.clone()
    };

    let inline = query.inline.as_deref() == Some("1");
    let disposition = ContentDisposition {
        disposition: if inline {
            DispositionType::Inline
        } else {
            DispositionType::Attachment
        },
        parameters: vec![DispositionParam::Filename(filename)],
    };

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(disposition)
        .body(data))
}

/// Configure attachment routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(download_attachment);
}
