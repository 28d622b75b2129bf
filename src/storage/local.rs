//! Local-disk blob backend.
//!
//! Objects live beneath `base_path/{namespace}/{key}`. Writes go through a
//! temporary file that is fsynced and atomically renamed into place, so a
//! crash or error mid-write never leaves a partial object at the final key.

use super::{BlobBackend, BlobError, BlobResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    /// Base directory on disk where object payloads are stored.
    base_path: PathBuf,
}

impl LocalBlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn object_path(&self, namespace: &str, key: &str) -> PathBuf {
        let mut path = self.base_path.clone();
        path.push(namespace);
        path.push(key);
        path
    }
}

#[async_trait]
impl BlobBackend for LocalBlobStore {
    async fn put(
        &self,
        namespace: &str,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> BlobResult<String> {
        let file_path = self.object_path(namespace, key);
        let parent = file_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| BlobError::WriteFailed {
                key: key.to_string(),
                reason: "object path missing parent directory".into(),
            })?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;

        if let Err(err) = file.write_all(&bytes).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(BlobError::Io(err));
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(BlobError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(BlobError::Io(err));
        }
        drop(file);

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(BlobError::Io(err));
        }

        Ok(file_path.to_string_lossy().into_owned())
    }

    async fn get(&self, locator: &str) -> BlobResult<Bytes> {
        match fs::read(locator).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(BlobError::NotFound(locator.to_string()))
            }
            Err(err) => Err(BlobError::Io(err)),
        }
    }

    async fn delete(&self, locator: &str) -> BlobResult<bool> {
        match fs::remove_file(locator).await {
            Ok(()) => {
                debug!("removed blob {}", locator);
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(BlobError::Io(err)),
        }
    }

    async fn exists(&self, locator: &str) -> BlobResult<bool> {
        match fs::metadata(locator).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(BlobError::Io(err)),
        }
    }

    async fn rename(
        &self,
        locator: &str,
        target_namespace: &str,
        new_key: &str,
        _content_type: &str,
    ) -> BlobResult<String> {
        if !self.exists(locator).await? {
            return Err(BlobError::NotFound(locator.to_string()));
        }

        let new_path = self.object_path(target_namespace, new_key);
        if let Some(parent) = new_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        match fs::rename(locator, &new_path).await {
            Ok(()) => {}
            // Cross-device moves cannot rename; fall back to copy-then-delete,
            // removing the original only once the copy has landed.
            Err(err) if err.kind() == ErrorKind::CrossesDevices => {
                if let Err(copy_err) = fs::copy(locator, &new_path).await {
                    let _ = fs::remove_file(&new_path).await;
                    return Err(BlobError::MoveFailed {
                        locator: locator.to_string(),
                        reason: copy_err.to_string(),
                    });
                }
                fs::remove_file(locator).await?;
            }
            Err(err) => {
                return Err(BlobError::MoveFailed {
                    locator: locator.to_string(),
                    reason: err.to_string(),
                });
            }
        }

        Ok(new_path.to_string_lossy().into_owned())
    }
}
