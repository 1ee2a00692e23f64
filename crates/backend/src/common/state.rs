use crate::{db::SharedCache, google::ServiceBuilder};

use super::ApiToken;

#[derive(Clone)]
pub struct AppState {
    pub cache: SharedCache,
    pub api_token: ApiToken,
    pub services: ServiceBuilder,
}

impl AppState {
    pub fn new(cache: SharedCache, api_token: ApiToken, discovery_base: &str) -> Self {
        let services = ServiceBuilder::new(cache.clone()).with_discovery_base(discovery_base);
        Self {
            cache,
            api_token,
            services,
        }
    }
}
