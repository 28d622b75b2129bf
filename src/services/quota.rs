//! Per-bucket storage accounting.
//!
//! The ledger is the single writer of `buckets.used_storage`. Admission
//! check and debit happen in one conditional UPDATE, so the counter is read,
//! compared against the limit and advanced as a single atomic unit on the
//! bucket row — two concurrent uploads into a near-full bucket can never
//! both pass admission. Buckets only ever contend with themselves.

use super::{ServiceError, ServiceResult};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct QuotaLedger {
    db: Arc<SqlitePool>,
}

impl QuotaLedger {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Admit `size` pending bytes into the bucket and debit the counter, or
    /// fail with `QuotaExceeded` carrying the counters the caller needs.
    /// A NULL `storage_limit` admits everything.
    pub async fn reserve(&self, bucket_id: Uuid, size: i64) -> ServiceResult<()> {
        let result = sqlx::query(
            "UPDATE buckets
             SET used_storage = used_storage + ?, updated_at = ?
             WHERE id = ?
               AND (storage_limit IS NULL OR used_storage + ? <= storage_limit)",
        )
        .bind(size)
        .bind(Utc::now())
        .bind(bucket_id)
        .bind(size)
        .execute(&*self.db)
        .await?;

        if result.rows_affected() == 0 {
            // Either the bucket is gone or the guard rejected the delta;
            // re-read to tell the two apart and report exact numbers.
            let row: Option<(i64, Option<i64>)> =
                sqlx::query_as("SELECT used_storage, storage_limit FROM buckets WHERE id = ?")
                    .bind(bucket_id)
                    .fetch_optional(&*self.db)
                    .await?;

            return match row {
                None => Err(ServiceError::BucketNotFound(bucket_id)),
                Some((used, limit)) => Err(ServiceError::QuotaExceeded {
                    used,
                    limit: limit.unwrap_or(i64::MAX),
                    attempted: size,
                }),
            };
        }

        debug!("reserved {} bytes in bucket {}", size, bucket_id);
        Ok(())
    }

    /// Credit `size` bytes back to the bucket, clamped at a zero floor.
    /// Releases reconcile state after deletes and failed sagas; they never
    /// fail on underflow.
    pub async fn release(&self, bucket_id: Uuid, size: i64) -> ServiceResult<()> {
        sqlx::query(
            "UPDATE buckets
             SET used_storage = MAX(0, used_storage - ?), updated_at = ?
             WHERE id = ?",
        )
        .bind(size)
        .bind(Utc::now())
        .bind(bucket_id)
        .execute(&*self.db)
        .await?;

        debug!("released {} bytes from bucket {}", size, bucket_id);
        Ok(())
    }

    /// Read the authoritative counter.
    pub async fn usage(&self, bucket_id: Uuid) -> ServiceResult<i64> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT used_storage FROM buckets WHERE id = ?")
            .bind(bucket_id)
            .fetch_optional(&*self.db)
            .await?;

        row.map(|(used,)| used)
            .ok_or(ServiceError::BucketNotFound(bucket_id))
    }
}
