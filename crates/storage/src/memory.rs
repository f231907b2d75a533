//! In-process [`BlobStore`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{BlobStore, StorageError};

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Default)]
struct State {
    objects: BTreeMap<(String, String), StoredBlob>,
    /// Remaining uploads allowed before every further upload fails.
    uploads_before_failure: Option<usize>,
}

/// Keeps objects in memory. Public URLs use the `memory://` scheme.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    state: Mutex<State>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `n` more uploads succeed, then fail the rest.
    pub async fn fail_uploads_after(&self, n: usize) {
        self.state.lock().await.uploads_before_failure = Some(n);
    }

    pub async fn get(&self, bucket: &str, path: &str) -> Option<StoredBlob> {
        let state = self.state.lock().await;
        state
            .objects
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    /// Paths stored in `bucket`, sorted.
    pub async fn paths(&self, bucket: &str) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Recover the path from a URL built by [`BlobStore::public_url`].
    pub fn path_from_url<'a>(bucket: &str, url: &'a str) -> Option<&'a str> {
        url.strip_prefix("memory://")?
            .strip_prefix(bucket)?
            .strip_prefix('/')
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;

        if let Some(remaining) = state.uploads_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(StorageError::Unavailable(format!(
                    "upload of {bucket}/{path} rejected"
                )));
            }
            *remaining -= 1;
        }

        let key = (bucket.to_string(), path.to_string());
        if state.objects.contains_key(&key) {
            return Err(StorageError::Api {
                status: 409,
                body: format!("{bucket}/{path} already exists"),
            });
        }
        state.objects.insert(
            key,
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        for path in paths {
            state.objects.remove(&(bucket.to_string(), path.clone()));
        }
        Ok(())
    }
}
