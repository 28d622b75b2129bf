//! Blob backend abstraction.
//!
//! Physical byte storage sits behind a single capability set: write bytes
//! under a namespaced key, read them back by locator, delete, check
//! existence, and move between namespaces. Two interchangeable variants
//! implement it — local disk and a remote HTTP blob service — selected once
//! at startup from configuration and injected as `Arc<dyn BlobBackend>`.
//! Upstream code depends only on this contract.

use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use std::sync::Arc;
use thiserror::Error;

pub mod local;
pub mod remote;

pub use local::LocalBlobStore;
pub use remote::RemoteBlobStore;

use crate::config::{AppConfig, BackendKind};

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found at `{0}`")]
    NotFound(String),
    #[error("failed to write blob `{key}`: {reason}")]
    WriteFailed { key: String, reason: String },
    #[error("failed to move blob `{locator}`: {reason}")]
    MoveFailed { locator: String, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("blob service request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type BlobResult<T> = Result<T, BlobError>;

/// Capability set shared by all blob backends.
///
/// A `locator` returned by `put` or `rename` is opaque to callers and must
/// be sufficient, alone, to retrieve the bytes later. Writes are
/// all-or-nothing: a failed `put` leaves no dangling partial object.
#[async_trait]
pub trait BlobBackend: Send + Sync + 'static {
    /// Write `bytes` under `key` scoped to `namespace`, returning a locator.
    async fn put(
        &self,
        namespace: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> BlobResult<String>;

    /// Read the bytes a locator resolves to.
    async fn get(&self, locator: &str) -> BlobResult<Bytes>;

    /// Remove the object if present. Idempotent: returns whether anything
    /// was actually removed, and never errors on an already-absent object.
    async fn delete(&self, locator: &str) -> BlobResult<bool>;

    /// Whether the locator currently resolves to an object.
    async fn exists(&self, locator: &str) -> BlobResult<bool>;

    /// Move the object to `new_key` under `target_namespace`, returning the
    /// new locator. `content_type` is carried over to the re-written copy on
    /// backends that store one. The original object survives any failure; it
    /// is removed only after the new object is confirmed durable.
    async fn rename(
        &self,
        locator: &str,
        target_namespace: &str,
        new_key: &str,
        content_type: &str,
    ) -> BlobResult<String>;
}

/// Construct the backend selected by configuration.
pub fn backend_from_config(cfg: &AppConfig) -> anyhow::Result<Arc<dyn BlobBackend>> {
    match cfg.backend {
        BackendKind::Local => Ok(Arc::new(LocalBlobStore::new(&cfg.storage_dir))),
        BackendKind::Remote => {
            let base_url = cfg
                .remote_base_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("remote backend selected but no base URL set"))?;
            let token = cfg
                .remote_token
                .clone()
                .ok_or_else(|| anyhow::anyhow!("remote backend selected but no token set"))?;
            Ok(Arc::new(RemoteBlobStore::new(base_url, token)))
        }
    }
}
