//! Represents a stored file's metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata for a single stored file.
///
/// The row exists if and only if its `locator` currently resolves to
/// retrievable bytes in the active blob backend; the file lifecycle
/// manager's compensation logic bounds any transient violation of that.
/// Digests are recorded for audit and dedup detection only, never used
/// as an integrity gate on read.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct FileRecord {
    /// Unique identifier for this file.
    pub id: Uuid,

    /// Sanitized, user-supplied display name.
    pub name: String,

    /// Foreign key linking to the owning bucket.
    pub bucket_id: Uuid,

    /// Content type (MIME type) as supplied at upload.
    pub content_type: Option<String>,

    /// Size in bytes.
    pub size_bytes: i64,

    /// Hex-encoded SHA-256 digest of the content.
    pub sha256: String,

    /// Hex-encoded MD5 digest, kept for legacy compatibility checks.
    pub md5: String,

    /// Opaque backend-specific reference to the stored bytes
    /// (a filesystem path for the local backend, a URL for the remote one).
    pub locator: String,

    /// Whether the file is publicly visible.
    pub is_public: bool,

    /// When this file was uploaded.
    pub created_at: DateTime<Utc>,
}
