//! Request instrumentation middleware.
//!
//! The handler's response body is wrapped so that a `Completion` guard travels
//! with it. The server drops the body once it has been fully written or the
//! connection has gone away; the guard's `Drop` is the finalize hook and
//! records exactly one counter increment and one duration observation.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};
use tracing::Instrument;

use crate::app_state::AppState;
use crate::obs::metrics::HttpMetrics;

/// Label values are taken verbatim from the request: no path templating.
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let route = req.uri().path().to_owned();
    let span = tracing::debug_span!("http_request", %method, %route);

    let response = next.run(req).instrument(span.clone()).await;

    let (parts, body) = response.into_parts();
    let completion = Completion {
        metrics: state.http_metrics().clone(),
        method,
        route,
        status: parts.status.as_u16(),
        start,
        span,
    };
    Response::from_parts(
        parts,
        Body::new(CompletionBody {
            inner: body,
            _completion: completion,
        }),
    )
}

struct Completion {
    metrics: HttpMetrics,
    method: String,
    route: String,
    status: u16,
    start: Instant,
    span: tracing::Span,
}

impl Drop for Completion {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        self.metrics
            .record(&self.method, &self.route, self.status, elapsed);

        let _enter = self.span.enter();
        tracing::debug!(
            status = self.status,
            elapsed_ms = elapsed.as_secs_f64() * 1e3,
            "request completed"
        );
    }
}

/// Pass-through body that owns the completion guard.
struct CompletionBody {
    inner: Body,
    _completion: Completion,
}

impl HttpBody for CompletionBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.inner).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
