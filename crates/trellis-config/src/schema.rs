//! Configuration sections.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Server section.
///
/// ```
/// use trellis_config::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.http_addr, "0.0.0.0:8080");
/// assert_eq!(config.request_timeout_secs, 60);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address (e.g. `"0.0.0.0:8080"`).
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// How long to wait for open connections on shutdown, in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Per-request deadline, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Returns the shutdown timeout.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Returns the per-request deadline.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    60
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs.
    #[default]
    Json,
    /// Human-readable format.
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line.
    #[serde(default)]
    pub include_location: bool,
}

impl LoggingConfig {
    /// Converts the section into telemetry settings.
    #[must_use]
    pub fn to_log_config(&self) -> trellis_telemetry::LogConfig {
        trellis_telemetry::LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: match self.format {
                LogFormat::Json => trellis_telemetry::LogFormat::Json,
                LogFormat::Pretty => trellis_telemetry::LogFormat::Pretty,
            },
            span_events: false,
            file_line_info: self.include_location,
            include_target: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Metrics section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Enable request metrics.
    #[serde(default)]
    pub enabled: bool,

    /// Address of the Prometheus `/metrics` listener. When unset, metrics
    /// are recorded but not served.
    #[serde(default)]
    pub addr: Option<String>,
}

impl MetricsConfig {
    /// Converts the section into telemetry settings.
    #[must_use]
    pub fn to_metrics_config(&self) -> trellis_telemetry::MetricsConfig {
        trellis_telemetry::MetricsConfig {
            enabled: self.enabled,
            addr: self.addr.clone(),
            ..trellis_telemetry::MetricsConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_durations() {
        let config = ServerConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_logging_conversion() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            include_location: true,
            ..LoggingConfig::default()
        };
        let log = config.to_log_config();
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, trellis_telemetry::LogFormat::Pretty);
        assert!(log.file_line_info);
    }

    #[test]
    fn test_metrics_conversion() {
        let config = MetricsConfig {
            enabled: true,
            addr: Some("127.0.0.1:9090".to_string()),
        };
        let metrics = config.to_metrics_config();
        assert!(metrics.enabled);
        assert_eq!(metrics.addr.as_deref(), Some("127.0.0.1:9090"));
        assert!(!metrics.duration_buckets.is_empty());
    }

    #[test]
    fn test_log_format_serde() {
        let format: LogFormat = serde_json::from_str("\"pretty\"").unwrap();
        assert_eq!(format, LogFormat::Pretty);
        assert!(serde_json::from_str::<LogFormat>("\"yaml\"").is_err());
    }
}
