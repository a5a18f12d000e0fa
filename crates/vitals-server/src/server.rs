//! Serve the router on a bound listener until `shutdown` resolves.

use std::future::Future;

use tokio::net::TcpListener;

use vitals_core::error::{Result, VitalsError};

use crate::{app_state::AppState, router};

pub async fn bind(addr: std::net::SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| VitalsError::Internal(format!("failed to bind {addr}: {e}")))
}

pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router::build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| VitalsError::Internal(format!("server failed: {e}")))
}
