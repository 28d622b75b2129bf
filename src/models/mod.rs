//! Core data models for the file storage service.
//!
//! These entities represent the logical structure of users, buckets and
//! stored files. They map cleanly to database tables via `sqlx::FromRow`
//! and serialize naturally as JSON via `serde`.

pub mod bucket;
pub mod file;
pub mod user;
