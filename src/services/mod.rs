//! Business logic services.

pub mod notify;
pub mod password;
pub mod storage;

pub use notify::Mailer;
pub use storage::Storage;
