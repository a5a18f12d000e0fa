//! Top-level facade crate for vitals.
//!
//! Re-exports the metrics core and the HTTP server so embedders can depend on
//! a single crate. `prelude` carries what is needed to build and serve the
//! instrumented router:
//!
//! ```no_run
//! use vitals::prelude::*;
//!
//! # async fn run() -> vitals::core::Result<()> {
//! let state = AppState::new(ServerConfig::default())?;
//! let listener = vitals::server::server::bind(state.cfg().listen_addr()).await?;
//! vitals::server::server::serve(listener, state, std::future::pending()).await
//! # }
//! ```

pub mod core {
    pub use vitals_core::*;
}

pub mod server {
    pub use vitals_server::*;
}

pub mod prelude {
    pub use vitals_core::metrics::{Collector, CounterVec, HistogramVec, Registry};
    pub use vitals_core::{Result, VitalsError};
    pub use vitals_server::app_state::AppState;
    pub use vitals_server::config::ServerConfig;
    pub use vitals_server::router::build_router;
}
