//! Represents a logical bucket — a quota-bounded container for files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A storage bucket owned by a single user.
///
/// Buckets act as namespaces for files and carry the storage accounting
/// state: a nullable byte limit and the authoritative running total of
/// bytes used. `used_storage` is mutated only by the quota ledger during
/// commit or rollback of a file operation.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Bucket {
    /// Unique identifier for this bucket.
    pub id: Uuid,

    /// ID of the user that owns this bucket.
    pub user_id: Uuid,

    /// Bucket name, unique per owner.
    pub name: String,

    /// Whether the bucket is publicly visible.
    pub is_public: bool,

    /// Storage limit in bytes. `None` means unlimited.
    pub storage_limit: Option<i64>,

    /// Authoritative running total of bytes stored in this bucket.
    /// Invariant: `used_storage <= storage_limit` whenever a limit is set.
    pub used_storage: i64,

    /// When this bucket was created.
    pub created_at: DateTime<Utc>,

    /// When this bucket was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Bucket {
    /// Remaining headroom in bytes, or `None` for unlimited buckets.
    pub fn headroom(&self) -> Option<i64> {
        self.storage_limit
            .map(|limit| (limit - self.used_storage).max(0))
    }
}
