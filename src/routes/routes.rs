//! Defines routes for all bucket and file operations.
//!
//! ## Structure
//! - **Auth**
//!   - `POST   /api/auth/signup` — register an account, mint a bearer token
//! - **Bucket-level endpoints**
//!   - `POST   /api/buckets` — create bucket
//!   - `GET    /api/buckets` — list caller's buckets
//!   - `GET    /api/buckets/{bucket_id}` — fetch one bucket
//!   - `PATCH  /api/buckets/{bucket_id}` — rename / change storage limit
//!   - `DELETE /api/buckets/{bucket_id}` — delete (must be empty)
//! - **File-level endpoints**
//!   - `POST   /api/buckets/{bucket_id}/files` — multipart upload
//!   - `GET    /api/buckets/{bucket_id}/files` — list files
//!   - `GET    /api/files/{file_id}/download` — download
//!   - `DELETE /api/files/{file_id}` — delete
//!   - `PATCH  /api/files/{file_id}/move/{target_bucket_id}` — cross-bucket move

use crate::{
    handlers::{
        auth_handlers::signup,
        bucket_handlers::{create_bucket, delete_bucket, get_bucket, list_buckets, update_bucket},
        file_handlers::{delete_file, download_file, list_files, move_file, upload_file},
        health_handlers::{healthz, readyz},
    },
    services::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};

/// Build and return the router for the whole API.
///
/// The router carries shared state (`AppState`) to all handlers. The body
/// limit leaves headroom above the configured max file size for multipart
/// framing.
pub fn routes(max_file_size: i64) -> Router<AppState> {
    let body_limit = (max_file_size as usize).saturating_add(64 * 1024);

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // auth
        .route("/api/auth/signup", post(signup))
        // buckets
        .route("/api/buckets", post(create_bucket).get(list_buckets))
        .route(
            "/api/buckets/{bucket_id}",
            get(get_bucket).patch(update_bucket).delete(delete_bucket),
        )
        // files
        .route(
            "/api/buckets/{bucket_id}/files",
            post(upload_file).get(list_files),
        )
        .route("/api/files/{file_id}/download", get(download_file))
        .route("/api/files/{file_id}", delete(delete_file))
        .route(
            "/api/files/{file_id}/move/{target_bucket_id}",
            patch(move_file),
        )
        .layer(DefaultBodyLimit::max(body_limit))
}
