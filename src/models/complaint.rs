//! Complaint domain model, closed enumerations, and DTOs.
//!
//! The status transition policy and the per-user authorization predicates
//! live here; handlers and the database layer delegate to them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::attachment::AttachmentInfo;
use super::staff_comment::StaffCommentView;
use super::{PAGE_SIZE, Pagination};

/// Reference codes look like `GOV-CMP-2026-000123`.
const REFERENCE_PREFIX: &str = "GOV-CMP";

/// Complaint category enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Sanitation,
    Infrastructure,
    Utilities,
    PublicSafety,
    Healthcare,
    Education,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sanitation => "sanitation",
            Self::Infrastructure => "infrastructure",
            Self::Utilities => "utilities",
            Self::PublicSafety => "public_safety",
            Self::Healthcare => "healthcare",
            Self::Education => "education",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sanitation" => Some(Self::Sanitation),
            "infrastructure" => Some(Self::Infrastructure),
            "utilities" => Some(Self::Utilities),
            "public_safety" => Some(Self::PublicSafety),
            "healthcare" => Some(Self::Healthcare),
            "education" => Some(Self::Education),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Complaint status enum. Statuses only ever move forward:
/// received -> in_progress -> resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Received,
    InProgress,
    Resolved,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }

    /// Human-readable form used in notification emails.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Received => "Received",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "received" => Some(Self::Received),
            "in_progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }

    /// Whether a status change from `self` to `next` is legal.
    ///
    /// Re-submitting the current status is always legal; regressions and
    /// skips are not.
    pub fn can_transition_to(self, next: Status) -> bool {
        match self {
            Self::Received => matches!(next, Self::Received | Self::InProgress),
            Self::InProgress => matches!(next, Self::InProgress | Self::Resolved),
            Self::Resolved => matches!(next, Self::Resolved),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Complaint urgency enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A complaint as the domain sees it (typed enums, not raw column strings).
#[derive(Debug, Clone)]
pub struct Complaint {
    pub id: i64,
    pub reference_code: Option<String>,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub status: Status,
    pub urgency: Urgency,
    pub location: String,
    pub submitter_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub staff_remark: String,
    pub last_status_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// Build the reference code for a persisted complaint: fixed prefix,
    /// creation year, and the sequence id zero-padded to six digits.
    pub fn reference_code_for(created_at: DateTime<Utc>, id: i64) -> String {
        use chrono::Datelike;
        format!("{}-{}-{:06}", REFERENCE_PREFIX, created_at.year(), id)
    }

    /// Staff may view any complaint; citizens only their own.
    pub fn can_be_viewed_by(&self, user_id: Uuid, is_staff: bool) -> bool {
        is_staff || self.submitter_id == user_id
    }

    /// Only the submitter may edit or delete, and only while the complaint
    /// is still in `received` status.
    pub fn can_be_modified_by(&self, user_id: Uuid) -> bool {
        self.submitter_id == user_id && self.status == Status::Received
    }
}

/// Validated input for creating or editing a complaint.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub urgency: Urgency,
    pub location: String,
}

/// Raw complaint form fields as read from a multipart request.
#[derive(Debug, Clone, Default)]
pub struct ComplaintFormFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub location: Option<String>,
}

impl ComplaintFormFields {
    /// Validate the form, collecting every field failure rather than
    /// stopping at the first.
    pub fn validate(self) -> Result<NewComplaint, Vec<String>> {
        let mut errors = Vec::new();

        let title = self.title.map(|t| t.trim().to_string()).unwrap_or_default();
        if title.is_empty() {
            errors.push("title: This field is required.".to_string());
        } else if title.chars().count() > 255 {
            errors.push("title: Ensure this value has at most 255 characters.".to_string());
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or_default();
        if description.is_empty() {
            errors.push("description: This field is required.".to_string());
        }

        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("category: This field is required.".to_string());
                None
            }
            Some(raw) => {
                let parsed = Category::parse(raw);
                if parsed.is_none() {
                    errors.push(format!("category: '{}' is not a valid choice.", raw));
                }
                parsed
            }
        };

        // Urgency is optional; it defaults to medium.
        let urgency = match self.urgency.as_deref().map(str::trim) {
            None | Some("") => Some(Urgency::default()),
            Some(raw) => {
                let parsed = Urgency::parse(raw);
                if parsed.is_none() {
                    errors.push(format!("urgency: '{}' is not a valid choice.", raw));
                }
                parsed
            }
        };

        let location = self
            .location
            .map(|l| l.trim().to_string())
            .unwrap_or_default();
        if location.is_empty() {
            errors.push("location: This field is required.".to_string());
        } else if location.chars().count() > 255 {
            errors.push("location: Ensure this value has at most 255 characters.".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewComplaint {
            title,
            description,
            category: category.expect("validated above"),
            urgency: urgency.expect("validated above"),
            location,
        })
    }
}

/// Staff triage request: status change plus optional assignment, remark,
/// and internal comment.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StaffUpdateRequest {
    /// Requested status value.
    pub status: String,
    /// Staff account to assign, or null to unassign.
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
    /// Free-text staff remark; omitted fields leave the stored remark alone.
    #[serde(default)]
    pub staff_remark: Option<String>,
    /// Optional internal comment recorded alongside the update.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Query parameters for listing complaints.
///
/// Category/status/urgency are matched exactly against the stored values;
/// an unknown value simply matches nothing. Malformed dates are ignored
/// rather than rejected.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ComplaintFilter {
    /// Substring match against title, reference code, and location.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    /// Inclusive lower bound on creation date (YYYY-MM-DD).
    #[serde(default)]
    pub start_date: Option<String>,
    /// Inclusive upper bound on creation date (YYYY-MM-DD).
    #[serde(default)]
    pub end_date: Option<String>,
    /// 1-based page number; the page size is fixed at 10.
    #[serde(default)]
    pub page: Option<u32>,
}

impl ComplaintFilter {
    fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
        let trimmed = raw?.trim();
        if trimmed.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
    }

    /// Parsed start date; malformed input yields None (filter not applied).
    pub fn start_date(&self) -> Option<NaiveDate> {
        Self::parse_date(self.start_date.as_deref())
    }

    /// Parsed end date; malformed input yields None (filter not applied).
    pub fn end_date(&self) -> Option<NaiveDate> {
        Self::parse_date(self.end_date.as_deref())
    }

    /// Trimmed free-text query, if any.
    pub fn query(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    fn trimmed(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn category(&self) -> Option<&str> {
        Self::trimmed(self.category.as_deref())
    }

    pub fn status(&self) -> Option<&str> {
        Self::trimmed(self.status.as_deref())
    }

    pub fn urgency(&self) -> Option<&str> {
        Self::trimmed(self.urgency.as_deref())
    }

    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Offset for database queries.
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * PAGE_SIZE
    }
}

/// Complaint summary for list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComplaintSummary {
    pub reference_code: String,
    pub title: String,
    pub category: Category,
    pub status: Status,
    pub urgency: Urgency,
    pub location: String,
    pub submitter_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&Complaint> for ComplaintSummary {
    fn from(c: &Complaint) -> Self {
        ComplaintSummary {
            // The code is assigned in the same transaction as the insert,
            // so listed complaints always carry one.
            reference_code: c.reference_code.clone().unwrap_or_default(),
            title: c.title.clone(),
            category: c.category,
            status: c.status,
            urgency: c.urgency,
            location: c.location.clone(),
            submitter_id: c.submitter_id,
            assignee_id: c.assignee_id,
            created_at: c.created_at,
        }
    }
}

/// Complaint list response with pagination.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComplaintListResponse {
    pub complaints: Vec<ComplaintSummary>,
    pub pagination: Pagination,
}

/// Complaint detail response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComplaintDetail {
    pub reference_code: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub status: Status,
    pub urgency: Urgency,
    pub location: String,
    pub submitter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub staff_remark: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub attachments: Vec<AttachmentInfo>,
    /// Whether the caller may edit or delete this complaint.
    pub can_edit: bool,
    pub can_delete: bool,
    /// Internal comments; present only for staff callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_comments: Option<Vec<StaffCommentView>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn complaint(status: Status, submitter_id: Uuid) -> Complaint {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        Complaint {
            id: 42,
            reference_code: Some(Complaint::reference_code_for(now, 42)),
            title: "Streetlight out".to_string(),
            description: "The light on 5th and Main has been dark for a week.".to_string(),
            category: Category::Infrastructure,
            status,
            urgency: Urgency::Medium,
            location: "5th and Main".to_string(),
            submitter_id,
            assignee_id: None,
            staff_remark: String::new(),
            last_status_changed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reference_code_format() {
        let created = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            Complaint::reference_code_for(created, 7),
            "GOV-CMP-2026-000007"
        );
        // Ids wider than the padding are kept intact
        assert_eq!(
            Complaint::reference_code_for(created, 1_234_567),
            "GOV-CMP-2026-1234567"
        );
    }

    #[test]
    fn test_transition_matrix() {
        use Status::*;

        // Forward steps succeed
        assert!(Received.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Resolved));

        // Identity transitions succeed
        assert!(Received.can_transition_to(Received));
        assert!(InProgress.can_transition_to(InProgress));
        assert!(Resolved.can_transition_to(Resolved));

        // Skipping fails
        assert!(!Received.can_transition_to(Resolved));

        // Regressions fail
        assert!(!InProgress.can_transition_to(Received));
        assert!(!Resolved.can_transition_to(InProgress));
        assert!(!Resolved.can_transition_to(Received));
    }

    #[test]
    fn test_view_eligibility() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let c = complaint(Status::Received, owner);

        assert!(c.can_be_viewed_by(owner, false));
        assert!(!c.can_be_viewed_by(stranger, false));
        // Staff may view anything
        assert!(c.can_be_viewed_by(stranger, true));
    }

    #[test]
    fn test_modify_eligibility_gated_by_status() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        assert!(complaint(Status::Received, owner).can_be_modified_by(owner));
        assert!(!complaint(Status::Received, owner).can_be_modified_by(stranger));
        // Ownership is not enough once triage has started
        assert!(!complaint(Status::InProgress, owner).can_be_modified_by(owner));
        assert!(!complaint(Status::Resolved, owner).can_be_modified_by(owner));
    }

    #[test]
    fn test_enum_round_trips() {
        assert_eq!(Category::parse("public_safety"), Some(Category::PublicSafety));
        assert_eq!(Category::parse("bogus"), None);
        assert_eq!(Status::parse("in_progress"), Some(Status::InProgress));
        assert_eq!(Status::InProgress.display_name(), "In Progress");
        assert_eq!(Urgency::default(), Urgency::Medium);
    }

    #[test]
    fn test_form_validation_collects_all_errors() {
        let fields = ComplaintFormFields {
            title: Some("  ".to_string()),
            description: None,
            category: Some("graffiti".to_string()),
            urgency: None,
            location: Some("Main St".to_string()),
        };

        let errors = fields.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.starts_with("title:")));
        assert!(errors.iter().any(|e| e.starts_with("description:")));
        assert!(errors.iter().any(|e| e.starts_with("category:")));
    }

    #[test]
    fn test_form_validation_defaults_urgency() {
        let fields = ComplaintFormFields {
            title: Some("Overflowing bin".to_string()),
            description: Some("Bin at the park entrance is overflowing.".to_string()),
            category: Some("sanitation".to_string()),
            urgency: None,
            location: Some("Riverside Park".to_string()),
        };

        let form = fields.validate().unwrap();
        assert_eq!(form.urgency, Urgency::Medium);
        assert_eq!(form.category, Category::Sanitation);
    }

    #[test]
    fn test_filter_ignores_malformed_dates() {
        let filter = ComplaintFilter {
            start_date: Some("not-a-date".to_string()),
            end_date: Some("2026-02-30".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.start_date(), None);
        assert_eq!(filter.end_date(), None);

        let valid = ComplaintFilter {
            start_date: Some("2026-01-15".to_string()),
            ..Default::default()
        };
        assert_eq!(
            valid.start_date(),
            Some(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
        );
    }

    #[test]
    fn test_filter_pagination() {
        let first = ComplaintFilter::default();
        assert_eq!(first.page(), 1);
        assert_eq!(first.offset(), 0);

        let second = ComplaintFilter {
            page: Some(2),
            ..Default::default()
        };
        assert_eq!(second.offset(), 10);

        // Page 0 is clamped to 1
        let zero = ComplaintFilter {
            page: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.page(), 1);
    }

    #[test]
    fn test_filter_trims_blank_values() {
        let filter = ComplaintFilter {
            q: Some("   ".to_string()),
            category: Some(" sanitation ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.query(), None);
        assert_eq!(filter.category(), Some("sanitation"));
    }
}
