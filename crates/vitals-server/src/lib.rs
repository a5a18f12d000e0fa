//! vitals server library entry.
//!
//! Wires config, application state, request instrumentation and the HTTP
//! endpoints into an axum stack. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
pub mod server;
