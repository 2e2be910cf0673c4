//! Domain models for the complaints portal.

use utoipa::ToSchema;

pub mod attachment;
pub mod complaint;
pub mod staff_comment;
pub mod user;

// Re-export commonly used types
pub use attachment::{
    AttachmentInfo, MAX_ATTACHMENT_SIZE_BYTES, UploadedFile, validate_attachment,
};
pub use complaint::{
    Category, Complaint, ComplaintDetail, ComplaintFilter, ComplaintFormFields,
    ComplaintListResponse, ComplaintSummary, NewComplaint, StaffUpdateRequest, Status, Urgency,
};
pub use staff_comment::{StaffCommentView, validate_comment};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, SessionClaims, UserResponse};

/// Complaints are listed 10 per page.
pub const PAGE_SIZE: u64 = 10;

/// Pagination metadata for responses.
#[derive(Debug, Clone, serde::Serialize, ToSchema)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    /// Create pagination metadata.
    pub fn new(page: u32, total: u64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            total.div_ceil(PAGE_SIZE) as u32
        };

        Pagination {
            page,
            per_page: PAGE_SIZE as u32,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_metadata() {
        // 12 complaints: page 1 holds 10, page 2 holds the remaining 2
        let meta = Pagination::new(1, 12);
        assert_eq!(meta.per_page, 10);
        assert_eq!(meta.total_pages, 2);

        let empty = Pagination::new(1, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
