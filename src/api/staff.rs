//! Staff triage endpoints.
//!
//! All routes here are gated by the `StaffUser` extractor: unauthenticated
//! callers get 401, authenticated non-staff callers get 403.

use actix_web::{HttpResponse, get, post, web};
use tracing::info;

use crate::auth::StaffUser;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    ComplaintFilter, ComplaintListResponse, ComplaintSummary, StaffUpdateRequest, Status,
    validate_comment,
};
use crate::services::Mailer;

/// Staff dashboard: every complaint, filtered and paginated.
///
/// GET /staff/dashboard
#[utoipa::path(
    get,
    path = "/api/v1/staff/dashboard",
    tag = "Staff",
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
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a staff account", body = crate::error::ErrorResponse)
    )
)]
#[get("/staff/dashboard")]
pub async fn staff_dashboard(
    _staff: StaffUser,
    pool: web::Data<DbPool>,
    query: web::Query<ComplaintFilter>,
) -> AppResult<HttpResponse> {
    let (complaints, pagination) = pool.list_complaints(&query, None).await?;

    Ok(HttpResponse::Ok().json(ComplaintListResponse {
        complaints: complaints.iter().map(ComplaintSummary::from).collect(),
        pagination,
    }))
}

/// Update a complaint's status, assignee, and remark, optionally
/// recording an internal comment.
///
/// The transition is validated against the status read inside the update
/// transaction. A status change stamps the last-status-changed timestamp
/// and, after commit, sends a best-effort notification to the submitter.
///
/// POST /staff/complaints/{reference_code}/update-status
#[utoipa::path(
    post,
    path = "/api/v1/staff/complaints/{reference_code}/update-status",
    tag = "Staff",
    params(
        ("reference_code" = String, Path, description = "Complaint reference code")
    ),
    request_body = StaffUpdateRequest,
    responses(
        (status = 200, description = "Complaint updated"),
        (status = 400, description = "Invalid transition, assignee, or comment", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a staff account", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown reference code", body = crate::error::ErrorResponse)
    )
)]
#[post("/staff/complaints/{reference_code}/update-status")]
pub async fn staff_update_status(
    staff: StaffUser,
    pool: web::Data<DbPool>,
    mailer: web::Data<Mailer>,
    path: web::Path<String>,
    body: web::Json<StaffUpdateRequest>,
) -> AppResult<HttpResponse> {
    let reference_code = path.into_inner();

    // Field-shape failures are collected together before the stateful
    // transition check runs against the database.
    let mut errors = Vec::new();

    let new_status = match Status::parse(body.status.trim()) {
        Some(status) => Some(status),
        None => {
            errors.push(format!("status: '{}' is not a valid choice.", body.status));
            None
        }
    };

    let comment = match validate_comment(body.comment.as_deref()) {
        Ok(comment) => comment,
        Err(message) => {
            errors.push(message);
            None
        }
    };

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let outcome = pool
        .apply_staff_update(
            &reference_code,
            new_status.expect("validated above"),
            body.assignee_id,
            body.staff_remark.clone().unwrap_or_default(),
            comment.map(|body| (staff.user_id(), body)),
        )
        .await?;

    info!(
        "Complaint {} updated by staff {}: {} -> {}",
        reference_code,
        staff.0.claims.username,
        outcome.previous_status,
        outcome.complaint.status
    );

    if outcome.status_changed {
        if let Some(submitter) = pool.find_user_by_id(outcome.complaint.submitter_id).await? {
            mailer
                .send_status_change_email(
                    &submitter.email,
                    &submitter.username,
                    &outcome.complaint,
                    outcome.previous_status,
                    outcome.complaint.status,
                )
                .await;
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "reference_code": reference_code,
        "status": outcome.complaint.status,
        "message": "Complaint updated successfully."
    })))
}

/// Configure staff routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(staff_dashboard).service(staff_update_status);
}
