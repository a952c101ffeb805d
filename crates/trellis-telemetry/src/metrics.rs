//! Prometheus request metrics.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `trellis_requests_total` | Counter | `route`, `status` | Total requests |
//! | `trellis_request_duration_seconds` | Histogram | `route` | Request latency |
//! | `trellis_in_flight_requests` | Gauge | - | In-flight requests |
//!
//! [`RequestMetrics`] records all three when installed as global
//! middleware. Requests that match no route are labelled `unmatched`.

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use trellis_core::{Handler, RequestContext};
use trellis_middleware::Middleware;

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Request counter name.
pub const REQUESTS_TOTAL: &str = "trellis_requests_total";
/// Request duration histogram name.
pub const REQUEST_DURATION: &str = "trellis_request_duration_seconds";
/// In-flight gauge name.
pub const IN_FLIGHT: &str = "trellis_in_flight_requests";
/// Route label used when no route matched.
pub const UNMATCHED_ROUTE: &str = "unmatched";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address for the exporter's own `/metrics` listener. When `None` the
    /// recorder is installed without a listener and metrics are available
    /// through [`render_metrics`].
    pub addr: Option<String>,

    /// Histogram buckets for request duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: None,
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
            ],
        }
    }
}

/// Installs the Prometheus recorder.
///
/// With an address configured the exporter serves `/metrics` itself and
/// must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for an unparsable address and
/// `TelemetryError::MetricsInit` if the recorder cannot be installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    if let Some(addr) = &config.addr {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| TelemetryError::InvalidAddress(format!("{addr}: {e}")))?;
        builder
            .with_http_listener(addr)
            .install()
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        tracing::info!(%addr, "metrics exporter listening");
    } else {
        let handle = builder
            .install_recorder()
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        let _ = METRICS_HANDLE.set(handle);
    }

    describe_metrics();
    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` unless [`init_metrics`] installed a recorder without a
/// listener address.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests dispatched");
    describe_histogram!(REQUEST_DURATION, "HTTP request duration in seconds");
    describe_gauge!(IN_FLIGHT, "Number of HTTP requests currently being handled");
}

/// Records a completed request.
pub fn record_request(route: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "route" => route.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION, "route" => route.to_string()).record(duration.as_secs_f64());
}

/// Increments the in-flight gauge and decrements it on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a guard and increments the gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT).decrement(1.0);
    }
}

/// Middleware recording request count, latency and in-flight requests.
///
/// Install it with `use_middleware` so it wraps every route and the
/// not-found handler. Handler errors are counted under the status they map
/// to.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestMetrics;

impl Middleware for RequestMetrics {
    fn name(&self) -> &str {
        "request-metrics"
    }

    fn wrap(&self, next: Handler) -> Handler {
        Handler::new(move |ctx: RequestContext| {
            let next = next.clone();
            async move {
                let _in_flight = InFlightGuard::new();
                let route = ctx.route_name().unwrap_or(UNMATCHED_ROUTE).to_string();
                let start = Instant::now();

                let result = next.call(ctx).await;

                let status = match &result {
                    Ok(response) => response.status().as_u16(),
                    Err(err) => err.status_code().as_u16(),
                };
                record_request(&route, status, start.elapsed());
                result
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use metrics_exporter_prometheus::PrometheusRecorder;
    use trellis_core::{HandlerError, Response, ResponseExt};

    fn run_with_recorder(recorder: &PrometheusRecorder, handler: &Handler, ctx: RequestContext) {
        metrics::with_local_recorder(recorder, || {
            let _ = tokio_test::block_on(handler.call(ctx));
        });
    }

    fn named(route: &str) -> RequestContext {
        let mut ctx = RequestContext::mock();
        ctx.set_route_name(route.into());
        ctx
    }

    #[test]
    fn test_default_config_disabled() {
        let config = MetricsConfig::default();
        assert!(!config.enabled);
        assert!(config.addr.is_none());
        assert!(!config.duration_buckets.is_empty());
        assert!(init_metrics(&config).is_ok());
    }

    #[test]
    fn test_invalid_address_rejected() {
        let config = MetricsConfig {
            enabled: true,
            addr: Some("not-an-address".to_string()),
            ..MetricsConfig::default()
        };
        assert!(matches!(
            init_metrics(&config),
            Err(TelemetryError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_record_functions_dont_panic_without_recorder() {
        record_request("test", 200, Duration::from_millis(10));
        drop(InFlightGuard::new());
    }

    #[test]
    fn test_middleware_records_success() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handler = RequestMetrics.wrap(Handler::new(|_ctx| async {
            Ok(Response::empty(StatusCode::OK))
        }));

        run_with_recorder(&recorder, &handler, named("get-user"));
        run_with_recorder(&recorder, &handler, named("get-user"));

        let output = recorder.handle().render();
        assert!(output.contains(r#"trellis_requests_total{route="get-user",status="200"} 2"#));
        assert!(output.contains("trellis_request_duration_seconds"));
        assert!(output.contains("trellis_in_flight_requests 0"));
    }

    #[test]
    fn test_middleware_records_error_status_and_unmatched() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handler = RequestMetrics.wrap(Handler::new(|_ctx| async {
            Err(HandlerError::not_found("missing"))
        }));

        run_with_recorder(&recorder, &handler, RequestContext::mock());

        let output = recorder.handle().render();
        assert!(output.contains(r#"trellis_requests_total{route="unmatched",status="404"} 1"#));
    }
}
