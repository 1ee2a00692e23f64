use reqwest::{
    IntoUrl, Method, RequestBuilder,
    header::{AUTHORIZATION, HeaderValue},
};
use tracing::{info, instrument, warn};

use super::{
    CALENDAR_API, CALENDAR_SCOPE, CALENDAR_VERSION, DEFAULT_DISCOVERY_BASE, DiscoveryDocument,
    ServiceError, discovery,
};
use crate::db::{CacheCredentialStore, CredentialStorage, Credentials, SharedCache};

/// Shared HTTP client plus one profile's bearer token, attached to every
/// request it starts.
#[derive(Clone)]
pub struct AuthorizedClient {
    client: reqwest::Client,
    bearer: HeaderValue,
}

impl AuthorizedClient {
    pub fn new(client: reqwest::Client, credentials: &Credentials) -> Result<Self, ServiceError> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", credentials.access_token))
            .map_err(|_| ServiceError::InvalidToken)?;
        bearer.set_sensitive(true);
        Ok(Self { client, bearer })
    }

    pub fn request(&self, method: Method, url: impl IntoUrl) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTHORIZATION, self.bearer.clone())
    }
}

/// Handle to a discovered API, bound to one profile's credentials.
#[derive(Clone)]
pub struct CalendarService {
    pub name: String,
    pub version: String,
    pub base_url: String,
    client: AuthorizedClient,
}

impl CalendarService {
    /// Starts an authorized request for `path`, relative to the service root.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        self.client.request(method, url)
    }
}

/// Assembles a [`CalendarService`] from stored credentials.
///
/// Nothing is memoized: every build reads the credentials and fetches the
/// discovery document again.
#[derive(Clone)]
pub struct ServiceBuilder {
    cache: SharedCache,
    http: reqwest::Client,
    discovery_base: String,
    api: String,
    version: String,
}

impl ServiceBuilder {
    pub fn new(cache: SharedCache) -> Self {
        Self {
            cache,
            http: reqwest::Client::new(),
            discovery_base: DEFAULT_DISCOVERY_BASE.to_owned(),
            api: CALENDAR_API.to_owned(),
            version: CALENDAR_VERSION.to_owned(),
        }
    }

    /// Replaces the connection pool shared by every service this builds.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_discovery_base(mut self, base: impl Into<String>) -> Self {
        self.discovery_base = base.into();
        self
    }

    pub fn with_api(mut self, api: impl Into<String>, version: impl Into<String>) -> Self {
        self.api = api.into();
        self.version = version.into();
        self
    }

    #[instrument(skip(self), level = "info")]
    pub async fn build_service_from_id(
        &self,
        profile_id: &str,
    ) -> Result<CalendarService, ServiceError> {
        let store = CacheCredentialStore::new(self.cache.clone(), profile_id);
        self.build_service(profile_id, &store).await
    }

    /// Builds from any credential storage; `profile_id` only labels errors.
    pub async fn build_service(
        &self,
        profile_id: &str,
        storage: &dyn CredentialStorage,
    ) -> Result<CalendarService, ServiceError> {
        let credentials = storage
            .get()
            .await?
            .ok_or_else(|| ServiceError::CredentialsNotFound(profile_id.to_owned()))?;

        if credentials.is_expired() {
            warn!("building service with expired access token");
        }
        if !credentials.scopes.is_empty() && !credentials.has_scopes(&[CALENDAR_SCOPE]) {
            warn!(scopes = ?credentials.scopes, "credentials were not granted the calendar scope");
        }

        let client = AuthorizedClient::new(self.http.clone(), &credentials)?;
        let doc: DiscoveryDocument =
            discovery::fetch(&client, &self.discovery_base, &self.api, &self.version).await?;
        let base_url = doc.base_url();
        info!(api = %doc.name, version = %doc.version, %base_url, "service ready");

        Ok(CalendarService {
            name: doc.name,
            version: doc.version,
            base_url,
            client,
        })
    }
}
