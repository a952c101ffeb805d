//! Observability for Trellis services.
//!
//! - **Logging**: structured JSON or pretty output via `tracing-subscriber`
//! - **Metrics**: Prometheus request metrics via the `metrics` facade
//!
//! # Example
//!
//! ```rust,no_run
//! use trellis_telemetry::{init_telemetry, TelemetryConfig};
//!
//! # #[tokio::main]
//! # async fn main() {
//! init_telemetry(&TelemetryConfig::default()).expect("telemetry");
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/trellis-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use self::logging::{init_logging, LogConfig, LogFormat};
pub use self::metrics::{init_metrics, render_metrics, MetricsConfig, RequestMetrics};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Combined logging and metrics configuration.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Logging settings.
    pub logging: LogConfig,
    /// Metrics settings.
    pub metrics: MetricsConfig,
}

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns the first subsystem error.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}
