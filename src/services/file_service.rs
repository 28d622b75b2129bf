//! File lifecycle manager.
//!
//! Every operation is a short-lived saga: ownership check, validation,
//! quota reservation, physical I/O, metadata commit — in that order, with an
//! explicit compensation for each step that can leave partial state behind.
//! The physical write always precedes the metadata commit, so no file row
//! ever points at bytes that were never written.

use super::{QuotaLedger, ServiceError, ServiceResult};
use crate::models::{bucket::Bucket, file::FileRecord, user::User};
use crate::storage::{BlobBackend, BlobError};
use crate::validation::{self, UploadLimits};
use bytes::Bytes;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct FileService {
    db: Arc<SqlitePool>,
    blob: Arc<dyn BlobBackend>,
    ledger: QuotaLedger,
    limits: UploadLimits,
}

const FILE_COLUMNS: &str = "id, name, bucket_id, content_type, size_bytes, sha256, md5, \
                            locator, is_public, created_at";

/// Blob namespace for a bucket; one namespace per bucket.
fn bucket_namespace(bucket_id: Uuid) -> String {
    format!("bucket_{}", bucket_id)
}

impl FileService {
    pub fn new(
        db: Arc<SqlitePool>,
        blob: Arc<dyn BlobBackend>,
        ledger: QuotaLedger,
        limits: UploadLimits,
    ) -> Self {
        Self {
            db,
            blob,
            ledger,
            limits,
        }
    }

    async fn fetch_bucket(&self, bucket_id: Uuid) -> ServiceResult<Bucket> {
        sqlx::query_as::<_, Bucket>(
            "SELECT id, user_id, name, is_public, storage_limit, used_storage,
                    created_at, updated_at
             FROM buckets WHERE id = ?",
        )
        .bind(bucket_id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(ServiceError::BucketNotFound(bucket_id))
    }

    async fn fetch_file(&self, file_id: Uuid) -> ServiceResult<FileRecord> {
        sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = ?"
        ))
        .bind(file_id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(ServiceError::FileNotFound(file_id))
    }

    fn authorize(user: &User, bucket: &Bucket) -> ServiceResult<()> {
        if bucket.user_id != user.id {
            return Err(ServiceError::AccessDenied);
        }
        Ok(())
    }

    /// Upload `bytes` as a new file in `bucket_id`.
    ///
    /// Saga: validate → reserve quota → physical write → metadata commit.
    /// A failed write releases the reservation; a failed commit deletes the
    /// just-written blob and releases the reservation, so neither orphan
    /// bytes nor phantom quota survive the operation.
    pub async fn upload(
        &self,
        user: &User,
        bucket_id: Uuid,
        name: &str,
        bytes: Bytes,
        content_type: Option<String>,
    ) -> ServiceResult<FileRecord> {
        let bucket = self.fetch_bucket(bucket_id).await?;
        Self::authorize(user, &bucket)?;

        let name = validation::sanitize_file_name(name);
        let extension = validation::validate_extension(&name, &self.limits.allowed_extensions)?;
        let size = bytes.len() as i64;
        validation::validate_size(size, self.limits.max_file_size)?;
        let digests = validation::digest(&bytes);

        self.ledger.reserve(bucket.id, size).await?;

        let file_id = Uuid::new_v4();
        let key = format!("{}.{}", file_id, extension);
        let locator = match self
            .blob
            .put(&bucket_namespace(bucket.id), &key, bytes, content_type.as_deref().unwrap_or("application/octet-stream"))
            .await
        {
            Ok(locator) => locator,
            Err(err) => {
                self.ledger.release(bucket.id, size).await?;
                return Err(ServiceError::StorageWrite(err.to_string()));
            }
        };

        let record = FileRecord {
            id: file_id,
            name,
            bucket_id: bucket.id,
            content_type,
            size_bytes: size,
            sha256: digests.sha256,
            md5: digests.md5,
            locator: locator.clone(),
            is_public: false,
            created_at: Utc::now(),
        };

        let insert = sqlx::query(
            "INSERT INTO files
                 (id, name, bucket_id, content_type, size_bytes, sha256, md5,
                  locator, is_public, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(record.bucket_id)
        .bind(&record.content_type)
        .bind(record.size_bytes)
        .bind(&record.sha256)
        .bind(&record.md5)
        .bind(&record.locator)
        .bind(record.is_public)
        .bind(record.created_at)
        .execute(&*self.db)
        .await;

        if let Err(err) = insert {
            if let Err(del_err) = self.blob.delete(&locator).await {
                error!(
                    "orphaned blob at {} after failed metadata commit: {}",
                    locator, del_err
                );
            }
            self.ledger.release(bucket.id, size).await?;
            return Err(ServiceError::MetadataCommit(err));
        }

        debug!("uploaded file {} ({} bytes) to bucket {}", record.id, size, bucket.id);
        Ok(record)
    }

    /// Fetch a file's metadata and its bytes.
    ///
    /// A live row whose locator no longer resolves is an integrity fault,
    /// not a client error; it surfaces as `StorageInconsistency`.
    pub async fn download(&self, user: &User, file_id: Uuid) -> ServiceResult<(FileRecord, Bytes)> {
        let record = self.fetch_file(file_id).await?;
        let bucket = self.fetch_bucket(record.bucket_id).await?;
        Self::authorize(user, &bucket)?;

        match self.blob.get(&record.locator).await {
            Ok(bytes) => Ok((record, bytes)),
            Err(BlobError::NotFound(_)) => {
                error!(
                    "file {} references unreadable bytes at {}",
                    record.id, record.locator
                );
                Err(ServiceError::StorageInconsistency {
                    locator: record.locator,
                })
            }
            Err(err) => Err(ServiceError::Blob(err)),
        }
    }

    /// Delete a file: bytes first, then the row, then the quota credit.
    pub async fn delete(&self, user: &User, file_id: Uuid) -> ServiceResult<()> {
        let record = self.fetch_file(file_id).await?;
        let bucket = self.fetch_bucket(record.bucket_id).await?;
        Self::authorize(user, &bucket)?;

        // Idempotent intent: an already-absent blob is logged, not fatal.
        if !self.blob.delete(&record.locator).await? {
            warn!(
                "blob at {} was already missing when deleting file {}",
                record.locator, record.id
            );
        }

        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(record.id)
            .execute(&*self.db)
            .await?;

        self.ledger.release(bucket.id, record.size_bytes).await?;
        debug!("deleted file {} from bucket {}", record.id, bucket.id);
        Ok(())
    }

    /// Move a file into another bucket the caller also owns.
    ///
    /// Target admission uses the same atomic reserve as upload. If the
    /// physical move fails nothing has been persisted and the reservation is
    /// released. If the metadata update fails after the move, the blob is
    /// moved back best-effort; when even that fails the locator is logged
    /// for manual reconciliation.
    pub async fn move_file(
        &self,
        user: &User,
        file_id: Uuid,
        target_bucket_id: Uuid,
    ) -> ServiceResult<FileRecord> {
        let mut record = self.fetch_file(file_id).await?;
        let source = self.fetch_bucket(record.bucket_id).await?;
        Self::authorize(user, &source)?;

        if target_bucket_id == source.id {
            return Ok(record);
        }

        let target = self.fetch_bucket(target_bucket_id).await?;
        Self::authorize(user, &target)?;

        self.ledger.reserve(target.id, record.size_bytes).await?;

        let key = record
            .locator
            .rsplit('/')
            .next()
            .unwrap_or(&record.locator)
            .to_string();
        let old_locator = record.locator.clone();
        let content_type = record
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".into());

        let new_locator = match self
            .blob
            .rename(&old_locator, &bucket_namespace(target.id), &key, &content_type)
            .await
        {
            Ok(locator) => locator,
            Err(err) => {
                self.ledger.release(target.id, record.size_bytes).await?;
                return Err(ServiceError::StorageMove(err.to_string()));
            }
        };

        let update = sqlx::query("UPDATE files SET bucket_id = ?, locator = ? WHERE id = ?")
            .bind(target.id)
            .bind(&new_locator)
            .bind(record.id)
            .execute(&*self.db)
            .await;

        if let Err(err) = update {
            match self
                .blob
                .rename(&new_locator, &bucket_namespace(source.id), &key, &content_type)
                .await
            {
                Ok(_) => {}
                Err(back_err) => error!(
                    "blob for file {} stranded at {} after failed metadata update: {}",
                    record.id, new_locator, back_err
                ),
            }
            self.ledger.release(target.id, record.size_bytes).await?;
            return Err(ServiceError::MetadataCommit(err));
        }

        self.ledger.release(source.id, record.size_bytes).await?;

        record.bucket_id = target.id;
        record.locator = new_locator;
        debug!(
            "moved file {} from bucket {} to bucket {}",
            record.id, source.id, target.id
        );
        Ok(record)
    }

    /// List the files in a bucket the caller owns.
    pub async fn list(&self, user: &User, bucket_id: Uuid) -> ServiceResult<Vec<FileRecord>> {
        let bucket = self.fetch_bucket(bucket_id).await?;
        Self::authorize(user, &bucket)?;

        let files = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE bucket_id = ? ORDER BY created_at DESC"
        ))
        .bind(bucket.id)
        .fetch_all(&*self.db)
        .await?;
        Ok(files)
    }
}
