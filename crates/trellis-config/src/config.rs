//! The root configuration type.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use trellis_telemetry::TelemetryConfig;

use crate::{ConfigError, LogFormat, LoggingConfig, MetricsConfig, ServerConfig};

/// Complete Trellis service configuration.
///
/// Load it with [`ConfigLoader`](crate::ConfigLoader).
///
/// # Example
///
/// ```
/// use trellis_config::TrellisConfig;
///
/// let config = TrellisConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TrellisConfig {
    /// Server section.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging section.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics section.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl TrellisConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - the server address is not a socket address
    /// - the request timeout is zero
    /// - the log filter does not parse
    /// - metrics are enabled with an invalid listener address
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_secs",
                "must be greater than zero",
            ));
        }

        if self.logging.enabled {
            trellis_telemetry::logging::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        if self.metrics.enabled {
            if let Some(addr) = &self.metrics.addr {
                if addr.parse::<SocketAddr>().is_err() {
                    return Err(ConfigError::invalid_value(
                        "metrics.addr",
                        format!("invalid socket address: {addr}"),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Development preset: pretty `debug` logs with source locations.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config
    }

    /// Production preset: JSON `info` logs and metrics enabled.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.metrics.enabled = true;
        config
    }

    /// Returns the telemetry settings for these sections.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            logging: self.logging.to_log_config(),
            metrics: self.metrics.to_metrics_config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(TrellisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_http_addr() {
        let mut config = TrellisConfig::default();
        config.server.http_addr = "localhost".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.http_addr"));
    }

    #[test]
    fn test_zero_request_timeout() {
        let mut config = TrellisConfig::default();
        config.server.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = TrellisConfig::default();
        config.logging.level = "trellis=loud".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));

        config.logging.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_metrics_addr_checked_when_enabled() {
        let mut config = TrellisConfig::default();
        config.metrics.addr = Some("nowhere".to_string());
        assert!(config.validate().is_ok());

        config.metrics.enabled = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_presets() {
        let dev = TrellisConfig::development();
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert_eq!(dev.telemetry().logging.level, "debug");

        let prod = TrellisConfig::production();
        assert!(prod.metrics.enabled);
        assert!(prod.telemetry().metrics.enabled);
    }
}
