mod auth;
mod error;
pub mod metrics;
mod routing;
mod state;

pub use auth::{ApiToken, INVALID_TOKEN, login_required};
pub use error::ApiError;
pub use routing::{ApiRoutes, Resource};
pub use state::AppState;
