//! Configuration schema definitions.
//!
//! All types derive Serde traits and default every field, so an empty
//! file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration of the dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Site constants exposed to templates and page metadata.
    pub site: SiteConfig,

    /// Filesystem roots.
    pub paths: PathsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Site constants.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub author: String,
    pub home_url: String,

    /// Page template name, resolved to `template/<name>.template.tera`.
    pub template: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Aspect Dispatch".to_string(),
            author: String::new(),
            home_url: "http://localhost:8080".to_string(),
            template: "default".to_string(),
        }
    }
}

/// Filesystem roots.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of form, field, aspect, metadata, view and template files.
    pub application: PathBuf,

    /// Root of static assets.
    pub public: PathBuf,

    /// Directory of the daily error log files.
    pub log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            application: PathBuf::from("site/application"),
            public: PathBuf::from("site/public"),
            log: PathBuf::from("log"),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Field-definition cache behavior.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// Keep loaded form data across requests. When false every read
    /// reloads the definitions from disk.
    pub reuse_form_data: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Append unexpected errors to the daily error log files.
    pub error_log_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
            error_log_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.site.template, "default");
        assert!(!config.cache.reuse_form_data);
        assert_eq!(config.paths.log, PathBuf::from("log"));
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [site]
            name = "Example"
            author = "Example Team"

            [cache]
            reuse_form_data = true
            "#,
        )
        .unwrap();
        assert_eq!(config.site.name, "Example");
        assert_eq!(config.site.template, "default");
        assert!(config.cache.reuse_form_data);
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
