use axum::{
    Form, Json,
    extract::{Path, State, rejection::FormRejection},
    http::StatusCode,
    routing::{self, MethodRouter},
};
use serde::{Deserialize, Serialize};

use crate::{
    common::{ApiError, AppState, Resource},
    db::{CacheCredentialStore, CredentialStorage, Credentials},
};

#[derive(Deserialize)]
pub struct CredentialsForm {
    /// JSON-encoded [`Credentials`].
    pub credentials: String,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub base_url: String,
}

/// `PUT` stores a profile's credentials, `DELETE` revokes them.
pub struct CredentialsResource;

impl Resource<AppState> for CredentialsResource {
    fn routes() -> MethodRouter<AppState> {
        routing::put(store_credentials).delete(revoke_credentials)
    }
}

/// `POST` builds a calendar service for the profile and describes it.
pub struct ServiceResource;

impl Resource<AppState> for ServiceResource {
    fn routes() -> MethodRouter<AppState> {
        routing::post(build_service)
    }
}

async fn store_credentials(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<StatusCode, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let credentials: Credentials = serde_json::from_str(&form.credentials)
        .map_err(|e| ApiError::BadRequest(format!("invalid credentials: {e}")))?;

    CacheCredentialStore::new(state.cache.clone(), &id)
        .put(&credentials)
        .await?;
    tracing::info!(profile = %id, "credentials stored");
    Ok(StatusCode::NO_CONTENT)
}

async fn revoke_credentials(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    CacheCredentialStore::new(state.cache.clone(), &id)
        .delete()
        .await?;
    tracing::info!(profile = %id, "credentials revoked");
    Ok(StatusCode::NO_CONTENT)
}

async fn build_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ServiceInfo>, ApiError> {
    let service = state.services.build_service_from_id(&id).await?;
    Ok(Json(ServiceInfo {
        name: service.name,
        version: service.version,
        base_url: service.base_url,
    }))
}
