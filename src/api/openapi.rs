//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Complaints Portal Server",
        version = "0.3.0",
        description = "API server for filing and triaging citizen complaints with attachments, staff triage, and email notifications"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Auth endpoints
        api::auth::register,
        api::auth::login,
        // Complaint endpoints
        api::complaints::list_complaints,
        api::complaints::create_complaint,
        api::complaints::get_complaint,
        api::complaints::update_complaint,
        api::complaints::delete_complaint,
        // Staff endpoints
        api::staff::staff_dashboard,
        api::staff::staff_update_status,
        // Attachment endpoints
        api::attachments::download_attachment,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Auth
            models::RegisterRequest,
            models::LoginRequest,
            models::LoginResponse,
            models::UserResponse,
            // Complaints
            models::Category,
            models::Status,
            models::Urgency,
            models::ComplaintSummary,
            models::ComplaintListResponse,
            models::ComplaintDetail,
            models::ComplaintFilter,
            models::StaffUpdateRequest,
            models::AttachmentInfo,
            models::StaffCommentView,
            models::Pagination,
        )
    ),
    tags(
        (name = "Health", description = "Service health probes"),
        (name = "Auth", description = "Account registration and login"),
        (name = "Complaints", description = "Citizen complaint intake and tracking"),
        (name = "Staff", description = "Staff triage surfaces"),
        (name = "Attachments", description = "Attachment download")
    )
)]
pub struct ApiDoc;
