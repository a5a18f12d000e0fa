//! Request observability: HTTP series and the instrumentation middleware.

pub mod metrics;
pub mod middleware;
