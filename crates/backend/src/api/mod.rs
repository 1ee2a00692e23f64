mod fields_routes;
mod profile_routes;
mod timezone_routes;

use axum::{Router, middleware, routing};

use crate::common::{ApiRoutes, AppState, login_required};

pub use fields_routes::FieldsResource;
pub use profile_routes::{CredentialsForm, CredentialsResource, ServiceInfo, ServiceResource};
pub use timezone_routes::{TimezoneIndex, TimezoneLookup, TimezoneResource};

/// Every API route, with token-protected ones behind [`login_required`].
pub fn app_router(state: AppState) -> Router {
    let protected = Router::new()
        .api_route::<CredentialsResource>(&["/api/profiles/{id}/credentials"])
        .api_route::<ServiceResource>(&["/api/profiles/{id}/service"])
        .route_layer(middleware::from_fn_with_state(state.clone(), login_required));

    let open = Router::new()
        .route("/api/ping", routing::get(ping))
        .api_route::<TimezoneIndex>(&["/api/timezones"])
        .api_route::<TimezoneResource>(&["/api/timezones/{name}"])
        .api_route::<FieldsResource>(&["/api/fields"]);

    Router::new()
        .merge(open)
        .merge(protected)
        .with_state(state)
}

async fn ping() -> &'static str {
    "pong"
}
