//! S3 storage service for complaint attachments.
//!
//! Handles all S3 operations including upload, download, and delete.
//! Supports both AWS S3 and MinIO for development.

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use chrono::Datelike;
use tracing::info;
use uuid::Uuid;

use crate::config::S3Config;
use crate::error::{AppError, AppResult};

/// S3 storage client wrapper.
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    /// Create a new S3 storage client from configuration.
    pub async fn new(config: &S3Config) -> AppResult<Self> {
        let credentials =
            Credentials::new(&config.access_key, &config.secret_key, None, None, "portal");

        let region = Region::new(config.region.clone());

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .force_path_style(true); // Required for MinIO

        // Use custom endpoint for MinIO in development
        if let Some(ref endpoint) = config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let s3_config = s3_config_builder.build();
        let client = Client::from_conf(s3_config);

        let storage = Self {
            client,
            bucket: config.bucket.clone(),
        };

        // Verify bucket exists or create it
        storage.ensure_bucket_exists().await?;

        info!("S3 storage initialized: bucket={}", config.bucket);

        Ok(storage)
    }

    /// Ensure the bucket exists, creating it if necessary.
    async fn ensure_bucket_exists(&self) -> AppResult<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                info!("S3 bucket '{}' exists", self.bucket);
                Ok(())
            }
            Err(e) => {
                // Check if it's a "not found" error
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    info!("Creating S3 bucket '{}'", self.bucket);
                    self.client
                        .create_bucket()
                        .bucket(&self.bucket)
                        .send()
                        .await
                        .map_err(|e| {
                            AppError::Storage(format!("Failed to create bucket: {}", e))
                        })?;
                    info!("S3 bucket '{}' created", self.bucket);
                    Ok(())
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to access bucket '{}': {}",
                        self.bucket, service_error
                    )))
                }
            }
        }
    }

    /// Get the content type for an attachment based on its extension.
    pub fn content_type_for_extension(ext: &str) -> &'static str {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "pdf" => "application/pdf",
            _ => "application/octet-stream",
        }
    }

    /// Upload a file to S3.
    pub async fn put(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> AppResult<()> {
        let body = aws_sdk_s3::primitives::ByteStream::from(data);
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body);

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file to S3: {}", e)))?;

        Ok(())
    }

    /// Get a file from S3.
    ///
    /// # Returns
    /// The file contents as bytes and content type
    pub async fn get(&self, key: &str) -> AppResult<(Vec<u8>, Option<String>)> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    AppError::NotFound(format!("File {}", key))
                } else {
                    AppError::Storage(format!("Failed to get file from S3: {}", service_error))
                }
            })?;

        let content_type = response.content_type().map(String::from);
        let data = response
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read S3 response body: {}", e)))?
            .into_bytes()
            .to_vec();

        Ok((data, content_type))
    }

    /// Delete a file from S3.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete file from S3: {}", e)))?;

        Ok(())
    }

    /// Build an S3 key for an attachment blob.
    ///
    /// # Returns
    /// S3 key in format: complaints/{year}/{month}/{attachment_id}{ext}
    pub fn attachment_key(
        uploaded_at: chrono::DateTime<chrono::Utc>,
        attachment_id: Uuid,
        extension: &str,
    ) -> String {
        format!(
            "complaints/{}/{:02}/{}{}",
            uploaded_at.year(),
            uploaded_at.month(),
            attachment_id,
            extension
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_attachment_key() {
        let uploaded = chrono::Utc.with_ymd_and_hms(2026, 4, 7, 12, 0, 0).unwrap();
        let id = Uuid::nil();
        let key = Storage::attachment_key(uploaded, id, ".pdf");
        assert_eq!(
            key,
            "complaints/2026/04/00000000-0000-0000-0000-000000000000.pdf"
        );
    }

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(Storage::content_type_for_extension(".png"), "image/png");
        assert_eq!(Storage::content_type_for_extension("png"), "image/png");
        assert_eq!(Storage::content_type_for_extension(".JPG"), "image/jpeg");
        assert_eq!(Storage::content_type_for_extension(".jpeg"), "image/jpeg");
        assert_eq!(
            Storage::content_type_for_extension(".pdf"),
            "application/pdf"
        );
        assert_eq!(
            Storage::content_type_for_extension(".exe"),
            "application/octet-stream"
        );
    }
}
