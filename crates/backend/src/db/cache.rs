use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// The cache is unreachable or failed to serve the request.
#[derive(Debug, Error)]
#[error("cache unavailable: {0}")]
pub struct CacheError(#[source] pub anyhow::Error);

impl CacheError {
    pub fn unavailable(err: impl Into<anyhow::Error>) -> Self {
        Self(err.into())
    }
}

/// Minimal key-value contract the credential store depends on.
///
/// Every call is a single round-trip to the backend; nothing here retries.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Overwrites any existing value.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

pub type SharedCache = Arc<dyn CacheBackend>;
