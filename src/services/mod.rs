//! Service layer: quota ledger, file lifecycle manager, bucket registry and
//! the credential boundary. Handlers depend on these through [`AppState`].

use crate::storage::BlobError;
use crate::validation::ValidationError;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub mod bucket_service;
pub mod credentials;
pub mod file_service;
pub mod quota;

pub use bucket_service::BucketRegistry;
pub use credentials::Credentials;
pub use file_service::FileService;
pub use quota::QuotaLedger;

/// Domain error taxonomy shared by all services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid or missing credentials")]
    Unauthorized,
    #[error("access denied")]
    AccessDenied,
    #[error("bucket `{0}` not found")]
    BucketNotFound(Uuid),
    #[error("file `{0}` not found")]
    FileNotFound(Uuid),
    #[error("bucket `{0}` already exists")]
    DuplicateName(String),
    #[error("email `{0}` is already registered")]
    DuplicateEmail(String),
    #[error("storage limit must be greater than zero")]
    InvalidLimit,
    #[error("new storage limit {new_limit} bytes is below the {used} bytes already used")]
    LimitBelowUsage { new_limit: i64, used: i64 },
    #[error("bucket is not empty")]
    BucketNotEmpty,
    #[error(
        "quota exceeded: bucket limit {limit} bytes, currently used {used} bytes, \
         attempted {attempted} bytes"
    )]
    QuotaExceeded { used: i64, limit: i64, attempted: i64 },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to store file bytes: {0}")]
    StorageWrite(String),
    #[error("failed to move file bytes: {0}")]
    StorageMove(String),
    #[error("file metadata references unreadable bytes at `{locator}`")]
    StorageInconsistency { locator: String },
    #[error("failed to commit file metadata: {0}")]
    MetadataCommit(sqlx::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Blob(#[from] BlobError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Shared handler state: one instance of each service plus the pool handle
/// used by the readiness probe.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub files: FileService,
    pub buckets: BucketRegistry,
    pub credentials: Credentials,
}

/// Return true if a SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
