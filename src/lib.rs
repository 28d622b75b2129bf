//! Multi-tenant bucketed file storage backend.
//!
//! Users own quota-bounded buckets and upload, download, list, move and
//! delete files within them. Metadata lives in SQLite; payload bytes live
//! behind a pluggable blob backend (local disk or a remote HTTP blob
//! service). The storage accounting core keeps `used_storage` consistent
//! with the bytes actually stored, under concurrency and partial failure.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod validation;
