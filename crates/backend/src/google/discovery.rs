use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;

use super::{AuthorizedClient, ServiceError};

/// The subset of a discovery document needed to address the API.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryDocument {
    pub name: String,
    pub version: String,
    pub root_url: String,
    pub service_path: String,
}

impl DiscoveryDocument {
    /// Always ends with a `/`.
    pub fn base_url(&self) -> String {
        let mut url = format!(
            "{}/{}",
            self.root_url.trim_end_matches('/'),
            self.service_path.trim_start_matches('/')
        );
        if !url.ends_with('/') {
            url.push('/');
        }
        url
    }
}

pub fn discovery_url(base: &str, api: &str, version: &str) -> String {
    format!("{}/apis/{api}/{version}/rest", base.trim_end_matches('/'))
}

#[instrument(skip(client), level = "debug")]
pub(super) async fn fetch(
    client: &AuthorizedClient,
    base: &str,
    api: &str,
    version: &str,
) -> Result<DiscoveryDocument, ServiceError> {
    let url = discovery_url(base, api, version);
    let response = client.request(Method::GET, url.as_str()).send().await?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%url, status = status.as_u16(), "discovery lookup failed");
        return Err(ServiceError::DiscoveryStatus(status.as_u16()));
    }

    Ok(response.json().await?)
}
