use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{db::StoreError, google::ServiceError};

use super::INVALID_TOKEN;

/// Handler error rendered as `{"error": <message>}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", INVALID_TOKEN)]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::Cache(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::Deserialization(_) | StoreError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::CredentialsNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::Store(e)) | ApiError::Store(e) => store_status(e),
            ApiError::Service(ServiceError::InvalidToken) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Service(ServiceError::Transport(_) | ServiceError::DiscoveryStatus(_)) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "internal error");
                "internal error".to_owned()
            }
            other if status.is_server_error() => {
                tracing::error!(error = %other, "request failed");
                other.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
