use axum::{
    Json,
    extract::Path,
    routing::{self, MethodRouter},
};
use serde::Serialize;

use libs::timezone;

use crate::common::{AppState, Resource};

#[derive(Debug, Serialize)]
pub struct TimezoneLookup {
    pub name: String,
    pub timezone: &'static str,
}

/// `GET` lists every known display name.
pub struct TimezoneIndex;

impl Resource<AppState> for TimezoneIndex {
    fn routes() -> MethodRouter<AppState> {
        routing::get(list_timezones)
    }
}

/// `GET` resolves one display name, falling back to `Etc/UTC`.
pub struct TimezoneResource;

impl Resource<AppState> for TimezoneResource {
    fn routes() -> MethodRouter<AppState> {
        routing::get(lookup_timezone)
    }
}

async fn list_timezones() -> Json<Vec<&'static str>> {
    Json(timezone::known_timezones().collect())
}

async fn lookup_timezone(Path(name): Path<String>) -> Json<TimezoneLookup> {
    let timezone = timezone::friendly_to_tz(&name);
    Json(TimezoneLookup { name, timezone })
}
