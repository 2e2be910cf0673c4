//! API endpoint modules.

pub mod attachments;
pub mod auth;
pub mod complaints;
pub mod health;
pub mod openapi;
pub mod staff;

pub use attachments::configure_routes as configure_attachment_routes;
pub use auth::configure_routes as configure_auth_routes;
pub use complaints::configure_routes as configure_complaint_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use staff::configure_routes as configure_staff_routes;
