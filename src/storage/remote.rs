//! Remote HTTP blob backend.
//!
//! Talks to a bearer-token-authenticated blob service with a flat
//! PUT/GET/DELETE/HEAD surface at `{base_url}/{namespace}/{key}`. Locators
//! are full object URLs. A move is read-then-write-then-delete: the old
//! object is only deleted after the new one is confirmed written.

use super::{BlobBackend, BlobError, BlobResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, header};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct RemoteBlobStore {
    client: Client,
    base_url: String,
    token: String,
}

impl RemoteBlobStore {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn object_url(&self, namespace: &str, key: &str) -> String {
        format!("{}/{}/{}", self.base_url, namespace, key)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[async_trait]
impl BlobBackend for RemoteBlobStore {
    async fn put(
        &self,
        namespace: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> BlobResult<String> {
        let url = self.object_url(namespace, key);
        let resp = self
            .client
            .put(&url)
            .header(header::AUTHORIZATION, self.bearer())
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(BlobError::WriteFailed {
                key: key.to_string(),
                reason: format!("blob service returned {}", resp.status()),
            });
        }

        debug!("stored remote blob at {}", url);
        Ok(url)
    }

    async fn get(&self, locator: &str) -> BlobResult<Bytes> {
        let resp = self
            .client
            .get(locator)
            .header(header::AUTHORIZATION, self.bearer())
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(BlobError::NotFound(locator.to_string())),
            status if status.is_success() => Ok(resp.bytes().await?),
            status => Err(BlobError::WriteFailed {
                key: locator.to_string(),
                reason: format!("blob service returned {}", status),
            }),
        }
    }

    async fn delete(&self, locator: &str) -> BlobResult<bool> {
        let resp = self
            .client
            .delete(locator)
            .header(header::AUTHORIZATION, self.bearer())
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => {
                warn!("delete of {} returned {}", locator, status);
                Ok(false)
            }
        }
    }

    async fn exists(&self, locator: &str) -> BlobResult<bool> {
        let resp = self
            .client
            .head(locator)
            .header(header::AUTHORIZATION, self.bearer())
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    async fn rename(
        &self,
        locator: &str,
        target_namespace: &str,
        new_key: &str,
        content_type: &str,
    ) -> BlobResult<String> {
        // Read and re-write before touching the original; any failure here
        // leaves the source object untouched.
        let bytes = self.get(locator).await.map_err(|err| match err {
            BlobError::NotFound(l) => BlobError::NotFound(l),
            other => BlobError::MoveFailed {
                locator: locator.to_string(),
                reason: other.to_string(),
            },
        })?;

        let new_locator = self
            .put(target_namespace, new_key, bytes, content_type)
            .await
            .map_err(|err| BlobError::MoveFailed {
                locator: locator.to_string(),
                reason: err.to_string(),
            })?;

        // New object is durable; removing the old copy is best-effort and
        // must not fail the move.
        if let Err(err) = self.delete(locator).await {
            warn!("failed to remove {} after move: {}", locator, err);
        }

        Ok(new_locator)
    }
}
