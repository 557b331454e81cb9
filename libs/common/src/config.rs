//! Client configuration
//!
//! Settings are layered: built-in defaults first, then environment variables
//! prefixed with `MENU_ADMIN_` (for example `MENU_ADMIN_BASE_URL`).

use std::time::Duration;

use config::{Config, Environment};
use serde::Deserialize;

use crate::error::{ClientError, ClientResult};

/// Environment variable prefix for every setting
pub const ENV_PREFIX: &str = "MENU_ADMIN";

/// Configuration for the REST API client
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// API root, e.g. "http://localhost:8000/api"
    pub base_url: String,
    /// Resource segment for menu endpoints
    pub menu_resource: String,
    /// Resource segment for role endpoints
    pub role_resource: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Page size used when loading the whole menu set for the tree
    pub tree_page_size: u32,
    /// Default page size for the flat list
    pub default_page_size: u32,
    /// Delay before re-reading access info after a sync
    pub access_refresh_delay_ms: u64,
    /// Lifetime of cached read responses
    pub cache_ttl_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            menu_resource: "menu".to_string(),
            role_resource: "role".to_string(),
            request_timeout_secs: 30,
            tree_page_size: 1000,
            default_page_size: 10,
            access_refresh_delay_ms: 500,
            cache_ttl_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig from defaults overridden by environment variables
    ///
    /// # Environment Variables
    /// - `MENU_ADMIN_BASE_URL`: API root (default: "http://localhost:8000/api")
    /// - `MENU_ADMIN_MENU_RESOURCE`, `MENU_ADMIN_ROLE_RESOURCE`: resource segments
    /// - `MENU_ADMIN_REQUEST_TIMEOUT_SECS`: request timeout (default: 30)
    /// - `MENU_ADMIN_TREE_PAGE_SIZE`, `MENU_ADMIN_DEFAULT_PAGE_SIZE`: page sizes
    /// - `MENU_ADMIN_ACCESS_REFRESH_DELAY_MS`: delay after access sync (default: 500)
    /// - `MENU_ADMIN_CACHE_TTL_SECS`: read cache lifetime (default: 30)
    pub fn from_env() -> ClientResult<Self> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("base_url", defaults.base_url)
            .and_then(|b| b.set_default("menu_resource", defaults.menu_resource))
            .and_then(|b| b.set_default("role_resource", defaults.role_resource))
            .and_then(|b| {
                b.set_default("request_timeout_secs", defaults.request_timeout_secs as i64)
            })
            .and_then(|b| b.set_default("tree_page_size", defaults.tree_page_size as i64))
            .and_then(|b| b.set_default("default_page_size", defaults.default_page_size as i64))
            .and_then(|b| {
                b.set_default(
                    "access_refresh_delay_ms",
                    defaults.access_refresh_delay_ms as i64,
                )
            })
            .and_then(|b| b.set_default("cache_ttl_secs", defaults.cache_ttl_secs as i64))
            .map_err(|e| ClientError::Config(e.to_string()))?
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let config: ClientConfig = settings
            .try_deserialize()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the client cannot work with
    pub fn validate(&self) -> ClientResult<()> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ClientError::Config("base_url must not be empty".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base_url must start with http:// or https://, got {base}"
            )));
        }
        if self.menu_resource.trim().is_empty() || self.role_resource.trim().is_empty() {
            return Err(ClientError::Config(
                "resource names must not be empty".to_string(),
            ));
        }
        if self.tree_page_size == 0 || self.default_page_size == 0 {
            return Err(ClientError::Config(
                "page sizes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn access_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.access_refresh_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_client_config_from_env_defaults() {
        let config = ClientConfig::from_env().expect("Failed to create client config");
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.menu_resource, "menu");
        assert_eq!(config.tree_page_size, 1000);
        assert_eq!(config.access_refresh_delay(), Duration::from_millis(500));
    }

    #[test]
    #[serial]
    fn test_client_config_env_override() {
        // SAFETY: serialised with every other env-touching test
        unsafe {
            std::env::set_var("MENU_ADMIN_BASE_URL", "https://admin.example.com/api");
            std::env::set_var("MENU_ADMIN_TREE_PAGE_SIZE", "250");
        }

        let config = ClientConfig::from_env();

        unsafe {
            std::env::remove_var("MENU_ADMIN_BASE_URL");
            std::env::remove_var("MENU_ADMIN_TREE_PAGE_SIZE");
        }

        let config = config.expect("Failed to create client config");
        assert_eq!(config.base_url, "https://admin.example.com/api");
        assert_eq!(config.tree_page_size, 250);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ClientConfig {
            base_url: "localhost:8000".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));

        let config = ClientConfig {
            tree_page_size: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
