//! Best-effort email notifications to complaint submitters.
//!
//! Sends over SMTP when a relay is configured, and falls back to a
//! log-only backend in development. Send failures are logged and
//! swallowed; they never affect the outcome of the operation that
//! triggered them.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use tracing::{info, warn};

use crate::config::SmtpConfig;
use crate::models::{Complaint, Status};

enum Backend {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    /// Development backend: traces the would-be message instead of sending.
    Log,
}

/// Notification mailer.
pub struct Mailer {
    backend: Backend,
    from: Mailbox,
}

impl Mailer {
    /// Build a mailer from configuration. Without SMTP settings the mailer
    /// only logs, which is the development default.
    pub fn new(from_email: &str, smtp: Option<&SmtpConfig>) -> Result<Self, String> {
        let from: Mailbox = from_email
            .parse()
            .map_err(|e| format!("Invalid PORTAL_FROM_EMAIL: {}", e))?;

        let backend = match smtp {
            Some(config) => {
                let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                    .map_err(|e| format!("Invalid SMTP relay: {}", e))?
                    .port(config.port)
                    .credentials(Credentials::new(
                        config.username.clone(),
                        config.password.expose_secret().to_string(),
                    ))
                    .build();
                info!("SMTP mailer initialized: relay={}", config.host);
                Backend::Smtp(transport)
            }
            None => {
                info!("No SMTP relay configured, notifications will be logged only");
                Backend::Log
            }
        };

        Ok(Mailer { backend, from })
    }

    /// Notify the submitter that their complaint was received.
    pub async fn send_submission_email(&self, recipient: &str, username: &str, c: &Complaint) {
        let reference = c.reference_code.as_deref().unwrap_or_default();
        self.send(
            recipient,
            format!("Complaint Submitted: {}", reference),
            submission_body(username, reference, c.status),
        )
        .await;
    }

    /// Notify the submitter that their complaint changed status.
    pub async fn send_status_change_email(
        &self,
        recipient: &str,
        username: &str,
        c: &Complaint,
        old_status: Status,
        new_status: Status,
    ) {
        let reference = c.reference_code.as_deref().unwrap_or_default();
        self.send(
            recipient,
            format!("Complaint Status Updated: {}", reference),
            status_change_body(username, reference, old_status, new_status),
        )
        .await;
    }

    /// Fire-and-forget send. Every failure path logs and returns.
    async fn send(&self, recipient: &str, subject: String, body: String) {
        if recipient.is_empty() {
            return;
        }

        let to: Mailbox = match recipient.parse() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                warn!("Skipping notification, invalid recipient '{}': {}", recipient, e);
                return;
            }
        };

        match &self.backend {
            Backend::Smtp(transport) => {
                let message = Message::builder()
                    .from(self.from.clone())
                    .to(to)
                    .subject(&subject)
                    .body(body);

                let message = match message {
                    Ok(message) => message,
                    Err(e) => {
                        warn!("Failed to build notification '{}': {}", subject, e);
                        return;
                    }
                };

                if let Err(e) = transport.send(message).await {
                    warn!("Failed to send notification '{}': {}", subject, e);
                }
            }
            Backend::Log => {
                info!(
                    recipient = %recipient,
                    subject = %subject,
                    "Notification (log backend):\n{}",
                    body
                );
            }
        }
    }
}

fn submission_body(username: &str, reference: &str, status: Status) -> String {
    format!(
        "Dear {},\n\n\
         Your complaint has been submitted successfully.\n\
         Reference ID: {}\n\
         Status: {}\n\n\
         We will notify you when there is an update.",
        username,
        reference,
        status.display_name()
    )
}

fn status_change_body(
    username: &str,
    reference: &str,
    old_status: Status,
    new_status: Status,
) -> String {
    format!(
        "Dear {},\n\n\
         Your complaint {} status changed from {} to {}.\n\n\
         Thank you.",
        username,
        reference,
        old_status.display_name(),
        new_status.display_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_body_wording() {
        let body = submission_body("amira", "GOV-CMP-2026-000042", Status::Received);
        assert!(body.starts_with("Dear amira,"));
        assert!(body.contains("Reference ID: GOV-CMP-2026-000042"));
        assert!(body.contains("Status: Received"));
    }

    #[test]
    fn test_status_change_body_uses_display_names() {
        let body = status_change_body(
            "amira",
            "GOV-CMP-2026-000042",
            Status::Received,
            Status::InProgress,
        );
        assert!(body.contains("from Received to In Progress"));
    }
}
