//! Staff comment DTOs and validation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Validate and normalize an optional comment. Empty input is fine (no
/// comment gets recorded); non-empty input must be at least 3 characters
/// after trimming.
pub fn validate_comment(raw: Option<&str>) -> Result<Option<String>, String> {
    let trimmed = raw.unwrap_or("").trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() < 3 {
        return Err("comment: Comment must be at least 3 characters.".to_string());
    }
    Ok(Some(trimmed.to_string()))
}

/// Staff comment for detail responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StaffCommentView {
    pub id: Uuid,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_comment_is_skipped() {
        assert_eq!(validate_comment(None).unwrap(), None);
        assert_eq!(validate_comment(Some("")).unwrap(), None);
        assert_eq!(validate_comment(Some("   ")).unwrap(), None);
    }

    #[test]
    fn test_short_comment_rejected() {
        assert!(validate_comment(Some("ok")).is_err());
        // Whitespace does not count toward the minimum
        assert!(validate_comment(Some(" a \n")).is_err());
    }

    #[test]
    fn test_valid_comment_trimmed() {
        assert_eq!(
            validate_comment(Some("  called the crew  ")).unwrap(),
            Some("called the crew".to_string())
        );
    }
}
