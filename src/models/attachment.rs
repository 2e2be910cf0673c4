//! Attachment DTOs and intake validation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// File extensions accepted at intake (lowercase, with dot).
pub const ALLOWED_ATTACHMENT_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".pdf"];

/// Per-file upload ceiling.
pub const MAX_ATTACHMENT_SIZE_BYTES: usize = 5 * 1024 * 1024;

/// Validate a single uploaded file against the intake constraints.
///
/// Returns a user-facing message on failure; the caller collects messages
/// across the batch instead of failing on the first bad file.
pub fn validate_attachment(filename: &str, size_bytes: usize) -> Result<(), String> {
    let lower = filename.to_lowercase();
    if !ALLOWED_ATTACHMENT_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext))
    {
        return Err(format!(
            "attachments: '{}': Only JPG, JPEG, PNG, and PDF files are allowed.",
            filename
        ));
    }
    if size_bytes > MAX_ATTACHMENT_SIZE_BYTES {
        return Err(format!(
            "attachments: '{}': Each file must be 5MB or smaller.",
            filename
        ));
    }
    Ok(())
}

/// Lowercased extension of an accepted upload, including the dot.
pub fn file_extension(filename: &str) -> String {
    match filename.rfind('.') {
        Some(idx) => filename[idx..].to_lowercase(),
        None => String::new(),
    }
}

/// An uploaded file buffered during multipart intake, not yet persisted.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
    /// Real size of the upload. Oversized files stop being buffered past
    /// the ceiling, so this can exceed `data.len()`.
    pub size: usize,
}

/// Attachment metadata for detail responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttachmentInfo {
    pub id: Uuid,
    pub original_filename: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions_case_insensitive() {
        assert!(validate_attachment("photo.jpg", 1024).is_ok());
        assert!(validate_attachment("photo.JPEG", 1024).is_ok());
        assert!(validate_attachment("scan.PDF", 1024).is_ok());
        assert!(validate_attachment("shot.Png", 1024).is_ok());
    }

    #[test]
    fn test_rejected_extensions() {
        assert!(validate_attachment("notes.txt", 10).is_err());
        assert!(validate_attachment("video.mp4", 10).is_err());
        assert!(validate_attachment("archive.zip", 10).is_err());
        // No extension at all
        assert!(validate_attachment("README", 10).is_err());
    }

    #[test]
    fn test_size_ceiling() {
        assert!(validate_attachment("photo.jpg", MAX_ATTACHMENT_SIZE_BYTES).is_ok());
        let err = validate_attachment("photo.jpg", MAX_ATTACHMENT_SIZE_BYTES + 1).unwrap_err();
        assert!(err.contains("5MB or smaller"));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.JPG"), ".jpg");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("README"), "");
    }
}
