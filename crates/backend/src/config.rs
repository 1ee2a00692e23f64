use std::path::{Path, PathBuf};

use serde::Deserialize;

use libs::util;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_backend_port")]
    pub backend_port: u16,
    #[serde(default)]
    pub backend_cache: CacheKind,
    #[serde(default = "default_backend_cache_file")]
    pub backend_cache_file: String,
    pub api_token: String,
    #[serde(default = "default_google_discovery_url")]
    pub google_discovery_url: String,
    #[serde(default = "default_prometheus_port")]
    pub prometheus_port: u16,
}

fn default_backend_port() -> u16 {
    8080
}

fn default_backend_cache_file() -> String {
    "cache.db".to_owned()
}

fn default_google_discovery_url() -> String {
    crate::google::DEFAULT_DISCOVERY_BASE.to_owned()
}

fn default_prometheus_port() -> u16 {
    9090
}

impl Config {
    /// Reads the process environment. Relative cache paths are resolved
    /// against the user config directory.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = envy::from_env::<Config>()?;
        config.resolve_paths()
    }

    fn resolve_paths(mut self) -> anyhow::Result<Self> {
        if self.backend_cache == CacheKind::Sqlite && Path::new(&self.backend_cache_file).is_relative()
        {
            let config_dir = util::get_config_dir()?;
            self.backend_cache_file = config_dir
                .join(&self.backend_cache_file)
                .to_string_lossy()
                .into_owned();
        }
        Ok(self)
    }

    pub fn cache_path(&self) -> PathBuf {
        PathBuf::from(&self.backend_cache_file)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("backend_port", &self.backend_port)
            .field("backend_cache", &self.backend_cache)
            .field("backend_cache_file", &self.backend_cache_file)
            .field("api_token", &"<redacted>")
            .field("google_discovery_url", &self.google_discovery_url)
            .field("prometheus_port", &self.prometheus_port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply() {
        let config: Config = envy::from_iter(vars(&[("API_TOKEN", "s3cret")])).unwrap();
        assert_eq!(config.backend_port, 8080);
        assert_eq!(config.backend_cache, CacheKind::Sqlite);
        assert_eq!(config.backend_cache_file, "cache.db");
        assert_eq!(config.prometheus_port, 9090);
        assert_eq!(config.google_discovery_url, crate::google::DEFAULT_DISCOVERY_BASE);
    }

    #[test]
    fn api_token_is_required() {
        let res: Result<Config, _> = envy::from_iter(vars(&[("BACKEND_PORT", "1234")]));
        assert!(res.is_err());
    }

    #[test]
    fn reads_overrides() {
        let config: Config = envy::from_iter(vars(&[
            ("API_TOKEN", "s3cret"),
            ("BACKEND_PORT", "3000"),
            ("BACKEND_CACHE", "memory"),
            ("GOOGLE_DISCOVERY_URL", "http://localhost:1234/discovery/v1"),
        ]))
        .unwrap();
        assert_eq!(config.backend_port, 3000);
        assert_eq!(config.backend_cache, CacheKind::Memory);
        assert_eq!(config.google_discovery_url, "http://localhost:1234/discovery/v1");
    }

    #[test]
    fn absolute_cache_path_is_kept() {
        let config: Config = envy::from_iter(vars(&[
            ("API_TOKEN", "s3cret"),
            ("BACKEND_CACHE_FILE", "/tmp/cal-cache.db"),
        ]))
        .unwrap();
        let config = config.resolve_paths().unwrap();
        assert_eq!(config.cache_path(), PathBuf::from("/tmp/cal-cache.db"));
    }

    #[test]
    fn debug_redacts_token() {
        let config: Config = envy::from_iter(vars(&[("API_TOKEN", "s3cret")])).unwrap();
        let out = format!("{config:?}");
        assert!(!out.contains("s3cret"));
    }
}
