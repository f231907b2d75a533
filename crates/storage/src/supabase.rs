//! REST client for the Supabase Storage API.
//!
//! Wraps the object endpoints the application uses (upload, bulk remove)
//! using [`reqwest`]. Public URLs are derived locally without a request.

use async_trait::async_trait;

use crate::{BlobStore, StorageError};

/// HTTP client for one Supabase project's storage.
#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStorage {
    /// Create a storage client.
    ///
    /// * `base_url` - Project URL, e.g. `https://abc.supabase.co`.
    /// * `api_key` - Key sent as both `apikey` and bearer token.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    /// Create a storage client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_key: api_key.into(),
        }
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    // ---- private helpers ----

    /// Return a [`StorageError::Api`] with the status and body text when
    /// the response is not a success.
    async fn check_status(response: reqwest::Response) -> Result<(), StorageError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StorageError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for SupabaseStorage {
    /// Sends `POST /storage/v1/object/{bucket}/{path}` with the raw bytes.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = bytes.len();
        let response = self
            .authorized(self.client.post(self.object_url(bucket, path)))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        Self::check_status(response).await?;
        tracing::debug!(bucket, path, size, "Uploaded object");
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }

    /// Sends `DELETE /storage/v1/object/{bucket}` listing the paths.
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), StorageError> {
        if paths.is_empty() {
            return Ok(());
        }
        let body = serde_json::json!({ "prefixes": paths });

        let response = self
            .authorized(
                self.client
                    .delete(format!("{}/storage/v1/object/{}", self.base_url, bucket)),
            )
            .json(&body)
            .send()
            .await?;

        Self::check_status(response).await
    }
}
