//! HTTP request series registered into the shared registry.

use std::sync::Arc;
use std::time::Duration;

use vitals_core::error::Result;
use vitals_core::metrics::{CounterVec, HistogramVec, Registry};

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION: &str = "http_request_duration_seconds";

/// Upper bounds in seconds.
pub const DURATION_BUCKETS: [f64; 8] = [0.001, 0.005, 0.015, 0.05, 0.1, 0.5, 1.0, 5.0];

#[derive(Clone)]
pub struct HttpMetrics {
    /// Labels: method, route, status.
    pub requests: Arc<CounterVec>,
    /// Labels: method, route.
    pub duration: Arc<HistogramVec>,
}

impl HttpMetrics {
    pub fn register(registry: &Registry) -> Result<Self> {
        let requests = Arc::new(CounterVec::new(
            REQUESTS_TOTAL,
            "Total number of HTTP requests",
            &["method", "route", "status"],
        ));
        let duration = Arc::new(HistogramVec::new(
            REQUEST_DURATION,
            "Duration of HTTP requests in seconds",
            &["method", "route"],
            &DURATION_BUCKETS,
        )?);

        registry.register(requests.clone())?;
        registry.register(duration.clone())?;
        Ok(Self { requests, duration })
    }

    /// One counter increment plus one histogram observation.
    pub fn record(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        let status = status.to_string();
        if let Err(e) = self.requests.inc(&[method, route, &status]) {
            tracing::warn!(error = %e, "request counter update failed");
        }
        if let Err(e) = self.duration.observe(&[method, route], elapsed.as_secs_f64()) {
            tracing::warn!(error = %e, "request duration update failed");
        }
    }
}
