use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no credentials stored for profile {0}")]
    CredentialsNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("access token is not a valid header value")]
    InvalidToken,

    #[error("discovery request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("discovery endpoint answered {0}")]
    DiscoveryStatus(u16),
}
