//! Configuration management for the storefront.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Payment credentials are deliberately absent: they are read at call time
//! through [`boxoffice_gateway::EnvCredentials`].

use crate::catalog::Catalog;
use crate::orchestrator::OrderSettings;
use boxoffice_gateway::{IpnNotificationType, PesapalClient};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Catalog file could not be read
    #[error("Failed to read catalog file {path}: {source}")]
    CatalogRead {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not a valid catalog document
    #[error("Invalid catalog file {path}: {source}")]
    CatalogParse {
        /// Path that was parsed
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Catalog document has no ticket types
    #[error("Catalog file {0} defines no ticket types")]
    EmptyCatalog(PathBuf),

    /// Gateway client could not be constructed
    #[error("Failed to build payment client: {0}")]
    Gateway(#[from] boxoffice_gateway::GatewayError),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Payment provider configuration
    pub gateway: GatewayConfig,
    /// Defaults applied to every order
    pub order: OrderSettings,
    /// Optional JSON catalog replacing the built-in event
    pub catalog_path: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

/// Payment provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Explicit provider base URL
    pub base_url: Option<String>,
    /// Use the sandbox endpoint when no base URL is given
    pub sandbox: bool,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// IPN URL to register on start-up
    pub ipn_url: Option<String>,
    /// How the provider should call the IPN URL
    pub ipn_notification_type: IpnNotificationType,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                log_level: "info,boxoffice_storefront=debug".to_string(),
            },
            gateway: GatewayConfig {
                base_url: None,
                sandbox: false,
                timeout_secs: 10,
                ipn_url: None,
                ipn_notification_type: IpnNotificationType::Get,
            },
            order: OrderSettings::default(),
            catalog_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            server: ServerConfig {
                host: non_empty("SERVER_HOST").unwrap_or(defaults.server.host),
                port: lookup("SERVER_PORT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.server.port),
                log_level: non_empty("RUST_LOG").unwrap_or(defaults.server.log_level),
            },
            gateway: GatewayConfig {
                base_url: non_empty("PESAPAL_BASE_URL"),
                sandbox: lookup("PESAPAL_SANDBOX")
                    .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                    .unwrap_or(defaults.gateway.sandbox),
                timeout_secs: lookup("PESAPAL_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(defaults.gateway.timeout_secs),
                ipn_url: non_empty("PESAPAL_IPN_URL"),
                ipn_notification_type: match lookup("PESAPAL_IPN_NOTIFICATION_TYPE")
                    .map(|s| s.trim().to_ascii_uppercase())
                    .as_deref()
                {
                    Some("POST") => IpnNotificationType::Post,
                    _ => defaults.gateway.ipn_notification_type,
                },
            },
            order: OrderSettings {
                currency: non_empty("BOXOFFICE_CURRENCY").unwrap_or(defaults.order.currency),
                country_code: non_empty("BOXOFFICE_COUNTRY_CODE")
                    .unwrap_or(defaults.order.country_code),
                branch: non_empty("BOXOFFICE_BRANCH").unwrap_or(defaults.order.branch),
                callback_url: non_empty("PESAPAL_CALLBACK_URL")
                    .unwrap_or(defaults.order.callback_url),
                notification_id: non_empty("PESAPAL_NOTIFICATION_ID")
                    .unwrap_or(defaults.order.notification_id),
                default_address: non_empty("BOXOFFICE_DEFAULT_ADDRESS")
                    .unwrap_or(defaults.order.default_address),
            },
            catalog_path: non_empty("BOXOFFICE_CATALOG_PATH"),
        }
    }

    /// `host:port` to bind the HTTP server to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// The configured catalog, or the built-in event when no path is set
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the catalog file cannot be read or parsed
    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        match &self.catalog_path {
            Some(path) => Catalog::from_file(path),
            None => Ok(Catalog::default()),
        }
    }

    /// Build the payment client described by this configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Gateway` if the HTTP client cannot be built
    pub fn payment_client(&self) -> Result<PesapalClient, ConfigError> {
        let mut builder =
            PesapalClient::builder().timeout(Duration::from_secs(self.gateway.timeout_secs));

        if let Some(base_url) = &self.gateway.base_url {
            builder = builder.base_url(base_url.clone());
        } else if self.gateway.sandbox {
            builder = builder.sandbox();
        }

        Ok(builder.build()?)
    }
}

impl Catalog {
    /// Load a catalog from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is unreadable, malformed, or lists
    /// no ticket types
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::CatalogParse {
                path: path.to_path_buf(),
                source,
            })?;

        if catalog.ticket_types.is_empty() {
            return Err(ConfigError::EmptyCatalog(path.to_path_buf()));
        }

        tracing::info!(
            path = %path.display(),
            ticket_types = catalog.ticket_types.len(),
            "Catalog loaded"
        );

        Ok(catalog)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[]));

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.gateway.timeout_secs, 10);
        assert!(!config.gateway.sandbox);
        assert!(config.gateway.base_url.is_none());
        assert!(config.gateway.ipn_url.is_none());
        assert_eq!(config.order, OrderSettings::default());
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_overrides_applied() {
        let config = Config::from_lookup(lookup(&[
            ("SERVER_PORT", "3000"),
            ("PESAPAL_SANDBOX", "true"),
            ("PESAPAL_TIMEOUT_SECS", "4"),
            ("PESAPAL_NOTIFICATION_ID", "ipn-1"),
            ("PESAPAL_IPN_NOTIFICATION_TYPE", "post"),
            ("BOXOFFICE_CURRENCY", "KES"),
            ("BOXOFFICE_COUNTRY_CODE", "KE"),
        ]));

        assert_eq!(config.server.port, 3000);
        assert!(config.gateway.sandbox);
        assert_eq!(config.gateway.timeout_secs, 4);
        assert_eq!(config.gateway.ipn_notification_type, IpnNotificationType::Post);
        assert_eq!(config.order.notification_id, "ipn-1");
        assert_eq!(config.order.currency, "KES");
        assert_eq!(config.order.country_code, "KE");
        assert_eq!(config.order.branch, "Concert Tickets");
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("SERVER_PORT", "http"),
            ("PESAPAL_TIMEOUT_SECS", "0"),
        ]));

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.gateway.timeout_secs, 10);
    }

    #[test]
    fn test_payment_client_uses_sandbox() {
        let config = Config::from_lookup(lookup(&[("PESAPAL_SANDBOX", "1")]));
        let client = config.payment_client().unwrap();
        assert_eq!(client.base_url(), boxoffice_gateway::SANDBOX_BASE_URL);
    }

    #[test]
    fn test_explicit_base_url_wins() {
        let config = Config::from_lookup(lookup(&[
            ("PESAPAL_SANDBOX", "1"),
            ("PESAPAL_BASE_URL", "http://localhost:9999"),
        ]));
        let client = config.payment_client().unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999/");
    }

    #[test]
    fn test_catalog_from_file() {
        let path = std::env::temp_dir().join(format!("catalog-{}.json", crate::ids::reference("T")));
        std::fs::write(&path, serde_json::to_string(&Catalog::default()).unwrap()).unwrap();

        let config = Config {
            catalog_path: Some(path.display().to_string()),
            ..Config::default()
        };
        let catalog = config.load_catalog().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(catalog, Catalog::default());
    }

    #[test]
    fn test_missing_catalog_file_errors() {
        let err = Catalog::from_file("/nonexistent/catalog.json").unwrap_err();
        assert!(matches!(err, ConfigError::CatalogRead { .. }));
    }

    #[test]
    fn test_catalog_without_ticket_types_rejected() {
        let path = std::env::temp_dir().join(format!("catalog-{}.json", crate::ids::reference("T")));
        let mut catalog = serde_json::to_value(Catalog::default()).unwrap();
        catalog["ticket_types"] = serde_json::json!([]);
        std::fs::write(&path, catalog.to_string()).unwrap();

        let err = Catalog::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(err, ConfigError::EmptyCatalog(_)));
    }
}
