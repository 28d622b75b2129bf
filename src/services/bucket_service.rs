//! Bucket registry: CRUD over buckets with ownership checks and the
//! emptiness gate on deletion.

use super::{ServiceError, ServiceResult, is_unique_violation};
use crate::models::{bucket::Bucket, user::User};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct BucketRegistry {
    db: Arc<SqlitePool>,
}

/// Fields a bucket update may change. `None` leaves the field alone.
#[derive(Debug, Default, Clone)]
pub struct BucketUpdate {
    pub name: Option<String>,
    pub storage_limit: Option<i64>,
}

impl BucketRegistry {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Create a bucket for `user`. `limit` of `None` means unlimited.
    pub async fn create(
        &self,
        user: &User,
        name: &str,
        limit: Option<i64>,
    ) -> ServiceResult<Bucket> {
        if let Some(limit) = limit
            && limit <= 0
        {
            return Err(ServiceError::InvalidLimit);
        }

        let now = Utc::now();
        let bucket = Bucket {
            id: Uuid::new_v4(),
            user_id: user.id,
            name: name.to_string(),
            is_public: false,
            storage_limit: limit,
            used_storage: 0,
            created_at: now,
            updated_at: now,
        };

        match sqlx::query(
            "INSERT INTO buckets
                 (id, user_id, name, is_public, storage_limit, used_storage,
                  created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(bucket.id)
        .bind(bucket.user_id)
        .bind(&bucket.name)
        .bind(bucket.is_public)
        .bind(bucket.storage_limit)
        .bind(bucket.used_storage)
        .bind(bucket.created_at)
        .bind(bucket.updated_at)
        .execute(&*self.db)
        .await
        {
            Ok(_) => Ok(bucket),
            Err(err) if is_unique_violation(&err) => {
                Err(ServiceError::DuplicateName(name.to_string()))
            }
            Err(err) => Err(ServiceError::Sqlx(err)),
        }
    }

    /// All buckets owned by `user`, newest first.
    pub async fn list(&self, user: &User) -> ServiceResult<Vec<Bucket>> {
        let buckets = sqlx::query_as::<_, Bucket>(
            "SELECT id, user_id, name, is_public, storage_limit, used_storage,
                    created_at, updated_at
             FROM buckets WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user.id)
        .fetch_all(&*self.db)
        .await?;
        Ok(buckets)
    }

    /// Fetch a bucket and verify `user` owns it.
    pub async fn get(&self, user: &User, bucket_id: Uuid) -> ServiceResult<Bucket> {
        let bucket = sqlx::query_as::<_, Bucket>(
            "SELECT id, user_id, name, is_public, storage_limit, used_storage,
                    created_at, updated_at
             FROM buckets WHERE id = ?",
        )
        .bind(bucket_id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(ServiceError::BucketNotFound(bucket_id))?;

        if bucket.user_id != user.id {
            return Err(ServiceError::AccessDenied);
        }
        Ok(bucket)
    }

    /// Rename a bucket and/or change its limit. A new limit below the bytes
    /// already stored is rejected.
    pub async fn update(
        &self,
        user: &User,
        bucket_id: Uuid,
        update: BucketUpdate,
    ) -> ServiceResult<Bucket> {
        let mut bucket = self.get(user, bucket_id).await?;

        if let Some(new_limit) = update.storage_limit {
            if new_limit <= 0 {
                return Err(ServiceError::InvalidLimit);
            }
            bucket.storage_limit = Some(new_limit);
        }
        if let Some(name) = update.name {
            bucket.name = name;
        }
        bucket.updated_at = Utc::now();

        // The limit lands only if the counter still fits beneath it, in the
        // same statement that writes it. A concurrent reservation between
        // our read and this write makes the guard fail instead of leaving
        // used_storage above the new limit.
        let result = match sqlx::query(
            "UPDATE buckets SET name = ?, storage_limit = ?, updated_at = ?
             WHERE id = ? AND (? IS NULL OR used_storage <= ?)",
        )
        .bind(&bucket.name)
        .bind(bucket.storage_limit)
        .bind(bucket.updated_at)
        .bind(bucket.id)
        .bind(bucket.storage_limit)
        .bind(bucket.storage_limit)
        .execute(&*self.db)
        .await
        {
            Ok(result) => result,
            Err(err) if is_unique_violation(&err) => {
                return Err(ServiceError::DuplicateName(bucket.name));
            }
            Err(err) => return Err(ServiceError::Sqlx(err)),
        };

        if result.rows_affected() == 0 {
            let row: Option<(i64,)> =
                sqlx::query_as("SELECT used_storage FROM buckets WHERE id = ?")
                    .bind(bucket.id)
                    .fetch_optional(&*self.db)
                    .await?;
            return match (row, bucket.storage_limit) {
                (Some((used,)), Some(new_limit)) => {
                    Err(ServiceError::LimitBelowUsage { new_limit, used })
                }
                _ => Err(ServiceError::BucketNotFound(bucket.id)),
            };
        }

        Ok(bucket)
    }

    /// Delete an empty bucket. Deletion is strictly gated on zero contained
    /// files; nothing is ever cascaded.
    pub async fn delete(&self, user: &User, bucket_id: Uuid) -> ServiceResult<()> {
        let bucket = self.get(user, bucket_id).await?;

        let (file_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM files WHERE bucket_id = ?")
                .bind(bucket.id)
                .fetch_one(&*self.db)
                .await?;
        if file_count > 0 {
            return Err(ServiceError::BucketNotEmpty);
        }

        sqlx::query("DELETE FROM buckets WHERE id = ?")
            .bind(bucket.id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }
}
