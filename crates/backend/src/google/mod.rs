//! Builds authenticated handles to the Google Calendar API.

mod discovery;
mod error;
mod service;

pub use discovery::{DiscoveryDocument, discovery_url};
pub use error::ServiceError;
pub use service::{AuthorizedClient, CalendarService, ServiceBuilder};

pub const DEFAULT_DISCOVERY_BASE: &str = "https://www.googleapis.com/discovery/v1";
pub const CALENDAR_API: &str = "calendar";
pub const CALENDAR_VERSION: &str = "v3";
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
