//! vitals core: error types and the in-process metrics registry.
//!
//! This crate carries no HTTP dependencies. It defines the series types
//! (`CounterVec`, `HistogramVec`), the `Registry` that owns them, and the
//! process-default collector rendered alongside application metrics.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `VitalsError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{Result, VitalsError};
