//! Object storage for step images.
//!
//! [`BlobStore`] is the boundary the publish pipeline uploads through.
//! [`SupabaseStorage`] talks to the hosted storage API;
//! [`MemoryBlobStore`] keeps objects in process for tests.

pub mod memory;
pub mod supabase;

use async_trait::async_trait;

pub use memory::MemoryBlobStore;
pub use supabase::SupabaseStorage;

/// Errors from the object storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The storage API returned a non-2xx status code.
    #[error("Storage API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The backend refused the operation for a non-HTTP reason.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path` inside `bucket`. Existing objects are not
    /// overwritten.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// The URL anyone can fetch the object from. Does not check existence.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Remove objects. Paths that do not exist are ignored.
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), StorageError>;
}
