//! Complaint API endpoints for citizens.
//!
//! Complaints are created and edited via multipart forms so attachments
//! ride along with the fields. Every file in a batch is validated before
//! anything is persisted; a failed batch leaves no row and no blob behind.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::Utc;
use futures_util::StreamExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::{DbPool, NewAttachment, attachments};
use crate::error::{AppError, AppResult};
use crate::models::{
    Complaint, ComplaintDetail, ComplaintFilter, ComplaintFormFields, ComplaintListResponse,
    ComplaintSummary, MAX_ATTACHMENT_SIZE_BYTES, NewComplaint, UploadedFile,
    attachment::file_extension, validate_attachment,
};
use crate::services::{Mailer, Storage};

/// Parsed multipart complaint submission.
struct ComplaintFormData {
    fields: ComplaintFormFields,
    files: Vec<UploadedFile>,
}

/// Read a multipart complaint form: text fields plus any number of
/// `attachments` files. File contents are buffered up to just past the
/// size ceiling; anything larger is counted but not kept, so an oversized
/// upload costs bounded memory and still reports its real size.
async fn read_complaint_form(payload: &mut Multipart) -> AppResult<ComplaintFormData> {
    let mut fields = ComplaintFormFields::default();
    let mut files = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?;

        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| AppError::validation("Missing content disposition"))?;

        let name = content_disposition
            .get_name()
            .unwrap_or_default()
            .to_string();
        let filename = content_disposition
            .get_filename()
            .map(|f| f.replace('\\', "/"));

        if let Some(filename) = filename {
            // Browsers may send an empty file input; skip it.
            if filename.is_empty() {
                continue;
            }
            let basename = filename.rsplit('/').next().unwrap_or_default().to_string();

            let mut data = Vec::new();
            let mut size: usize = 0;
            while let Some(chunk) = field.next().await {
                let chunk =
                    chunk.map_err(|e| AppError::validation(format!("Read error: {}", e)))?;
                size += chunk.len();
                if data.len() <= MAX_ATTACHMENT_SIZE_BYTES {
                    data.extend_from_slice(&chunk);
                }
            }

            files.push(UploadedFile {
                filename: basename,
                data,
                size,
            });
            continue;
        }

        // Text field
        let mut value = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::validation(format!("Read error: {}", e)))?;
            value.extend_from_slice(&chunk);
        }
        let value = String::from_utf8_lossy(&value).to_string();

        match name.as_str() {
            "title" => fields.title = Some(value),
            "description" => fields.description = Some(value),
            "category" => fields.category = Some(value),
            "urgency" => fields.urgency = Some(value),
            "location" => fields.location = Some(value),
            _ => {}
        }
    }

    Ok(ComplaintFormData { fields, files })
}

/// Validate the whole submission, collecting every failure.
fn validate_submission(
    form_data: ComplaintFormData,
) -> AppResult<(NewComplaint, Vec<UploadedFile>)> {
    let mut errors = Vec::new();

    let form = match form_data.fields.validate() {
        Ok(form) => Some(form),
        Err(field_errors) => {
            errors.extend(field_errors);
            None
        }
    };

    for file in &form_data.files {
        if let Err(message) = validate_attachment(&file.filename, file.size) {
            errors.push(message);
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok((form.expect("validated above"), form_data.files))
}

/// Store attachment blobs and build their database records. On any
/// failure the blobs written so far are removed again.
async fn store_attachments(
    storage: &Storage,
    files: Vec<UploadedFile>,
) -> AppResult<Vec<NewAttachment>> {
    let now = Utc::now();
    let mut records = Vec::new();

    for file in files {
        let id = Uuid::new_v4();
        let extension = file_extension(&file.filename);
        let key = Storage::attachment_key(now, id, &extension);
        let content_type = Storage::content_type_for_extension(&extension);

        if let Err(e) = storage.put(&key, file.data, Some(content_type)).await {
            cleanup_blobs(storage, &records).await;
            return Err(e);
        }

        records.push(NewAttachment {
            id,
            storage_key: key,
            original_filename: file.filename,
            size_bytes: file.size as i64,
        });
    }

    Ok(records)
}

/// Best-effort removal of blobs after a failed write.
async fn cleanup_blobs(storage: &Storage, records: &[NewAttachment]) {
    for record in records {
        if let Err(e) = storage.delete(&record.storage_key).await {
            warn!("Failed to clean up blob {}: {}", record.storage_key, e);
        }
    }
}

/// Build the detail response for a complaint the caller may view.
async fn build_detail(
    pool: &DbPool,
    complaint: &Complaint,
    auth: &AuthUser,
) -> AppResult<ComplaintDetail> {
    let attachment_rows = pool.attachments_for_complaint(complaint.id).await?;

    let submitter = pool
        .find_user_by_id(complaint.submitter_id)
        .await?
        .map(|u| u.username)
        .unwrap_or_default();

    let assignee = match complaint.assignee_id {
        Some(id) => pool.find_user_by_id(id).await?.map(|u| u.username),
        None => None,
    };

    let staff_comments = if auth.is_staff() {
        Some(pool.staff_comments_for_complaint(complaint.id).await?)
    } else {
        None
    };

    let can_modify = complaint.can_be_modified_by(auth.user_id());

    Ok(ComplaintDetail {
        reference_code: complaint.reference_code.clone().unwrap_or_default(),
        title: complaint.title.clone(),
        description: complaint.description.clone(),
        category: complaint.category,
        status: complaint.status,
        urgency: complaint.urgency,
        location: complaint.location.clone(),
        submitter,
        assignee,
        staff_remark: complaint.staff_remark.clone(),
        last_status_changed_at: complaint.last_status_changed_at,
        created_at: complaint.created_at,
        updated_at: complaint.updated_at,
        attachments: attachment_rows
            .into_iter()
            .map(attachments::model_to_info)
            .collect(),
        can_edit: can_modify,
        can_delete: can_modify,
        staff_comments,
    })
}

/// List the caller's complaints (staff see all), filtered and paginated.
///
/// GET /complaints
#[utoipa::path(
    get,
    path = "/api/v1/complaints",
    tag = "Complaints",
    params(
        ("q" = Option<String>, Query, description = "Substring match on title, reference code, location"),
        ("category" = Option<String>, Query, description = "Exact category"),
        ("status" = Option<String>, Query, description = "Exact status"),
        ("urgency" = Option<String>, Query, description = "Exact urgency"),
        ("start_date" = Option<String>, Query, description = "Creation date lower bound (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Creation date upper bound (YYYY-MM-DD)"),
        ("page" = Option<u32>, Query, description = "Page number (10 per page)")
    ),
    responses(
        (status = 200, description = "List of complaints", body = ComplaintListResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
#[get("/complaints")]
pub async fn list_complaints(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    query: web::Query<ComplaintFilter>,
) -> AppResult<HttpResponse> {
    let restrict_to = if auth.is_staff() {
        None
    } else {
        Some(auth.user_id())
    };

    let (complaints, pagination) = pool.list_complaints(&query, restrict_to).await?;

    Ok(HttpResponse::Ok().json(ComplaintListResponse {
        complaints: complaints.iter().map(ComplaintSummary::from).collect(),
        pagination,
    }))
}

/// Submit a new complaint with optional attachments.
///
/// POST /complaints
/// Content-Type: multipart/form-data
#[utoipa::path(
    post,
    path = "/api/v1/complaints",
    tag = "Complaints",
    responses(
        (status = 201, description = "Complaint created", body = ComplaintDetail),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
#[post("/complaints")]
pub async fn create_complaint(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    mailer: web::Data<Mailer>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let form_data = read_complaint_form(&mut payload).await?;
    let (form, files) = validate_submission(form_data)?;

    let records = store_attachments(&storage, files).await?;

    let complaint = match pool.insert_complaint(&form, auth.user_id(), &records).await {
        Ok(complaint) => complaint,
        Err(e) => {
            cleanup_blobs(&storage, &records).await;
            return Err(e);
        }
    };

    info!(
        "Complaint {} submitted by {} with {} attachment(s)",
        complaint.reference_code.as_deref().unwrap_or_default(),
        auth.claims.username,
        records.len()
    );

    if let Some(submitter) = pool.find_user_by_id(auth.user_id()).await? {
        mailer
            .send_submission_email(&submitter.email, &submitter.username, &complaint)
            .await;
    }

    let detail = build_detail(&pool, &complaint, &auth).await?;
    Ok(HttpResponse::Created().json(detail))
}

/// Get a complaint by reference code.
///
/// GET /complaints/{reference_code}
#[utoipa::path(
    get,
    path = "/api/v1/complaints/{reference_code}",
    tag = "Complaints",
    params(
        ("reference_code" = String, Path, description = "Complaint reference code")
    ),
    responses(
        (status = 200, description = "Complaint detail", body = ComplaintDetail),
        (status = 403, description = "Not allowed to view", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown reference code", body = crate::error::ErrorResponse)
    )
)]
#[get("/complaints/{reference_code}")]
pub async fn get_complaint(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let reference_code = path.into_inner();

    let complaint = pool
        .find_complaint_by_reference(&reference_code)
        .await?
        .ok_or_else(|| AppError::NotFound("Complaint".to_string()))?;

    if !complaint.can_be_viewed_by(auth.user_id(), auth.is_staff()) {
        return Err(AppError::Forbidden(
            "You do not have permission to view this complaint.".to_string(),
        ));
    }

    let detail = build_detail(&pool, &complaint, &auth).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Look up a complaint for an owner mutation, enforcing the
/// owner-and-received gate. Ownership is checked before status so the
/// caller learns the more specific reason.
async fn complaint_for_modification(
    pool: &DbPool,
    reference_code: &str,
    auth: &AuthUser,
    action: &str,
    action_past: &str,
) -> AppResult<Complaint> {
    let complaint = pool
        .find_complaint_by_reference(reference_code)
        .await?
        .ok_or_else(|| AppError::NotFound("Complaint".to_string()))?;

    if complaint.submitter_id != auth.user_id() {
        return Err(AppError::Forbidden(format!(
            "You can only {} your own complaints.",
            action
        )));
    }
    if !complaint.can_be_modified_by(auth.user_id()) {
        return Err(AppError::Forbidden(format!(
            "Only complaints in 'Received' status can be {}.",
            action_past
        )));
    }

    Ok(complaint)
}

/// Edit a complaint (owner only, while still in received status). New
/// attachments may be added alongside the fields.
///
/// PUT /complaints/{reference_code}
/// Content-Type: multipart/form-data
#[utoipa::path(
    put,
    path = "/api/v1/complaints/{reference_code}",
    tag = "Complaints",
    params(
        ("reference_code" = String, Path, description = "Complaint reference code")
    ),
    responses(
        (status = 200, description = "Complaint updated", body = ComplaintDetail),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the owner, or already in triage", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown reference code", body = crate::error::ErrorResponse)
    )
)]
#[put("/complaints/{reference_code}")]
pub async fn update_complaint(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    path: web::Path<String>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let reference_code = path.into_inner();
    let complaint =
        complaint_for_modification(&pool, &reference_code, &auth, "edit", "edited").await?;

    let form_data = read_complaint_form(&mut payload).await?;
    let (form, files) = validate_submission(form_data)?;

    let records = store_attachments(&storage, files).await?;

    let updated = match pool.update_complaint(complaint.id, &form, &records).await {
        Ok(updated) => updated,
        Err(e) => {
            cleanup_blobs(&storage, &records).await;
            return Err(e);
        }
    };

    info!("Complaint {} updated by {}", reference_code, auth.claims.username);

    let detail = build_detail(&pool, &updated, &auth).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Delete a complaint (owner only, while still in received status).
///
/// Blobs are removed from storage first, then the row subtree; the two
/// stores share no transaction.
///
/// DELETE /complaints/{reference_code}
#[utoipa::path(
    delete,
    path = "/api/v1/complaints/{reference_code}",
    tag = "Complaints",
    params(
        ("reference_code" = String, Path, description = "Complaint reference code")
    ),
    responses(
        (status = 204, description = "Complaint deleted"),
        (status = 403, description = "Not the owner, or already in triage", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown reference code", body = crate::error::ErrorResponse)
    )
)]
#[delete("/complaints/{reference_code}")]
pub async fn delete_complaint(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let reference_code = path.into_inner();
    let complaint =
        complaint_for_modification(&pool, &reference_code, &auth, "delete", "deleted").await?;

    // Step one: drop the blobs.
    for attachment in pool.attachments_for_complaint(complaint.id).await? {
        storage.delete(&attachment.storage_key).await?;
    }

    // Step two: drop the entity subtree (FK cascade removes children).
    pool.delete_complaint(complaint.id).await?;

    info!("Complaint {} deleted by {}", reference_code, auth.claims.username);

    Ok(HttpResponse::NoContent().finish())
}

/// Configure complaint routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_complaints)
        .service(create_complaint)
        .service(get_complaint)
        .service(update_complaint)
        .service(delete_complaint);
}
