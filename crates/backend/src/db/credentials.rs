//! OAuth2 credential persistence on top of a [`CacheBackend`].
//!
//! Credentials are stored as JSON under `<prefix><profile id>`. Concurrent
//! writers for the same profile are not serialized: the last `put` wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::{CacheBackend, CacheError, SharedCache};

pub const DEFAULT_PREFIX: &str = "oauth2_";

const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Token material obtained from the authorization flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub scopes: Vec<String>,

    /// When the access token expires, if the provider reported it.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_owned()
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_uri: default_token_uri(),
            client_id: None,
            scopes: Vec::new(),
            expires_at: None,
        }
    }

    /// Tokens without a known expiry are treated as valid.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    pub fn has_scopes(&self, required: &[&str]) -> bool {
        required
            .iter()
            .all(|scope| self.scopes.iter().any(|s| s == scope))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stored credentials are malformed: {0}")]
    Deserialization(#[source] serde_json::Error),
    #[error("failed to serialize credentials: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Storage contract consumed by the service builder.
#[async_trait]
pub trait CredentialStorage: Send + Sync {
    /// `Ok(None)` when nothing is stored for this profile.
    async fn get(&self) -> Result<Option<Credentials>, StoreError>;

    async fn put(&self, credentials: &Credentials) -> Result<(), StoreError>;

    async fn delete(&self) -> Result<(), StoreError>;
}

pub fn cache_key(prefix: &str, profile_id: &str) -> String {
    format!("{prefix}{profile_id}")
}

/// Credentials of a single profile kept in the shared cache.
pub struct CacheCredentialStore {
    cache: SharedCache,
    key: String,
}

impl CacheCredentialStore {
    pub fn new(cache: SharedCache, profile_id: &str) -> Self {
        Self::with_prefix(cache, profile_id, DEFAULT_PREFIX)
    }

    pub fn with_prefix(cache: SharedCache, profile_id: &str, prefix: &str) -> Self {
        Self {
            cache,
            key: cache_key(prefix, profile_id),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl CredentialStorage for CacheCredentialStore {
    async fn get(&self) -> Result<Option<Credentials>, StoreError> {
        metrics::counter!("credential_store_ops_total", "op" => "get").increment(1);
        let Some(raw) = self.cache.get(&self.key).await? else {
            debug!(key = %self.key, "no credentials stored");
            return Ok(None);
        };
        let credentials = serde_json::from_slice(&raw).map_err(StoreError::Deserialization)?;
        debug!(key = %self.key, "loaded credentials");
        Ok(Some(credentials))
    }

    async fn put(&self, credentials: &Credentials) -> Result<(), StoreError> {
        metrics::counter!("credential_store_ops_total", "op" => "put").increment(1);
        let raw = serde_json::to_vec(credentials).map_err(StoreError::Serialization)?;
        self.cache.set(&self.key, raw).await?;
        debug!(key = %self.key, "stored credentials");
        Ok(())
    }

    async fn delete(&self) -> Result<(), StoreError> {
        metrics::counter!("credential_store_ops_total", "op" => "delete").increment(1);
        self.cache.delete(&self.key).await?;
        debug!(key = %self.key, "deleted credentials");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::db::MemoryCache;

    fn sample() -> Credentials {
        Credentials {
            access_token: "ya29.access".into(),
            refresh_token: Some("1//refresh".into()),
            token_uri: GOOGLE_TOKEN_URI.into(),
            client_id: Some("client-123.apps.googleusercontent.com".into()),
            scopes: vec!["https://www.googleapis.com/auth/calendar".into()],
            expires_at: Some(
                DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            ),
        }
    }

    struct Unreachable;

    #[async_trait]
    impl CacheBackend for Unreachable {
        async fn get(&self, _: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::unavailable(anyhow::anyhow!("connection refused")))
        }
        async fn set(&self, _: &str, _: Vec<u8>) -> Result<(), CacheError> {
            Err(CacheError::unavailable(anyhow::anyhow!("connection refused")))
        }
        async fn delete(&self, _: &str) -> Result<(), CacheError> {
            Err(CacheError::unavailable(anyhow::anyhow!("connection refused")))
        }
    }

    #[test]
    fn key_uses_prefix() {
        assert_eq!(cache_key(DEFAULT_PREFIX, "12345"), "oauth2_12345");
        assert_ne!(cache_key(DEFAULT_PREFIX, "1"), cache_key(DEFAULT_PREFIX, "12"));
    }

    #[tokio::test]
    async fn put_then_get_returns_same_record() {
        let store = CacheCredentialStore::new(Arc::new(MemoryCache::new()), "42");
        let creds = sample();
        store.put(&creds).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(creds));
    }

    #[tokio::test]
    async fn get_on_empty_cache_is_none() {
        let store = CacheCredentialStore::new(Arc::new(MemoryCache::new()), "42");
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_then_get_is_none_and_repeat_delete_is_ok() {
        let store = CacheCredentialStore::new(Arc::new(MemoryCache::new()), "42");
        store.put(&sample()).await.unwrap();
        store.delete().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
        store.delete().await.unwrap();
    }

    #[tokio::test]
    async fn profiles_do_not_share_entries() {
        let cache: SharedCache = Arc::new(MemoryCache::new());
        let a = CacheCredentialStore::new(cache.clone(), "a");
        let b = CacheCredentialStore::new(cache.clone(), "b");

        a.put(&sample()).await.unwrap();
        assert!(b.get().await.unwrap().is_none());

        let raw = cache.get("oauth2_a").await.unwrap();
        assert!(raw.is_some());
    }

    #[tokio::test]
    async fn custom_prefix() {
        let cache: SharedCache = Arc::new(MemoryCache::new());
        let store = CacheCredentialStore::with_prefix(cache.clone(), "7", "gcal:");
        assert_eq!(store.key(), "gcal:7");
        store.put(&sample()).await.unwrap();
        assert!(cache.get("gcal:7").await.unwrap().is_some());
        assert!(cache.get("oauth2_7").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_bytes_fail_to_deserialize() {
        let cache: SharedCache = Arc::new(MemoryCache::new());
        cache.set("oauth2_42", b"\x80not json".to_vec()).await.unwrap();
        let store = CacheCredentialStore::new(cache, "42");
        assert!(matches!(
            store.get().await,
            Err(StoreError::Deserialization(_))
        ));
    }

    #[tokio::test]
    async fn cache_failures_propagate() {
        let store = CacheCredentialStore::new(Arc::new(Unreachable), "42");
        assert!(matches!(store.get().await, Err(StoreError::Cache(_))));
        assert!(matches!(store.put(&sample()).await, Err(StoreError::Cache(_))));
        assert!(matches!(store.delete().await, Err(StoreError::Cache(_))));
    }

    #[test]
    fn minimal_record_gets_defaults() {
        let creds: Credentials = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(creds, Credentials::new("abc"));
        assert!(!creds.is_expired());
    }

    #[test]
    fn expiry_and_scopes() {
        let mut creds = sample();
        assert!(!creds.is_expired());
        creds.expires_at = Some(Utc::now() - Duration::seconds(5));
        assert!(creds.is_expired());

        assert!(creds.has_scopes(&["https://www.googleapis.com/auth/calendar"]));
        assert!(!creds.has_scopes(&["https://www.googleapis.com/auth/gmail.readonly"]));
    }
}
