//! SeaORM entity definitions for PostgreSQL database.

pub mod attachment;
pub mod complaint;
pub mod staff_comment;
pub mod user;
