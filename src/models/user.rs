//! Represents an authenticated account that owns buckets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user of the storage service.
///
/// Users own buckets, which in turn own files; ownership of a file is always
/// resolved transitively through its bucket. The credential fields are opaque
/// to this service and never leave it in a response body.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct User {
    /// Unique identifier for this user.
    pub id: Uuid,

    /// Login email, unique across all users.
    pub email: String,

    /// Opaque password credential produced by the external credential
    /// service. Stored verbatim, never interpreted here.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Human-readable display name.
    pub display_name: String,

    /// Opaque bearer token matched against the Authorization header.
    #[serde(skip_serializing)]
    pub api_token: String,

    /// When this account was created.
    pub created_at: DateTime<Utc>,
}
