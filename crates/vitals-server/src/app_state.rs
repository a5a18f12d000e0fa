//! Shared application state for the vitals server.
//!
//! Owns the metrics registry (no process-wide singleton) so tests can build a
//! fresh state per case.

use std::sync::Arc;
use std::time::{Duration, Instant};

use vitals_core::error::Result;
use vitals_core::metrics::Registry;

use crate::config::ServerConfig;
use crate::obs::metrics::HttpMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    registry: Arc<Registry>,
    http: HttpMetrics,
    started_at: Instant,
}

impl AppState {
    /// Build state with a registry carrying the process-default collector.
    /// Returns Result so main can report startup errors without panicking.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let registry = Arc::new(Registry::with_process_metrics()?);
        Self::with_registry(cfg, registry)
    }

    /// Build state around a caller-supplied registry and register the HTTP
    /// series into it.
    pub fn with_registry(cfg: ServerConfig, registry: Arc<Registry>) -> Result<Self> {
        let http = HttpMetrics::register(&registry)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                http,
                started_at: Instant::now(),
            }),
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn http_metrics(&self) -> &HttpMetrics {
        &self.inner.http
    }

    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }
}
