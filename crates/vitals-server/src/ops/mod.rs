//! HTTP endpoints.
//!
//! - `/`        : greeting
//! - `/health`  : liveness with uptime
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use vitals_core::error::VitalsError;
use vitals_core::metrics::TEXT_FORMAT;

use crate::app_state::AppState;
use crate::error::HttpError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Greeting {
    pub message: String,
    pub version: String,
    /// UTC, RFC 3339 with milliseconds and `Z`.
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    /// Seconds since the application state was built.
    pub uptime: f64,
}

pub async fn greeting(State(state): State<AppState>) -> Json<Greeting> {
    let g = &state.cfg().greeting;
    Json(Greeting {
        message: g.message.clone(),
        version: g.version.clone(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    (
        StatusCode::OK,
        Json(Health {
            status: "healthy".into(),
            uptime: state.uptime().as_secs_f64(),
        }),
    )
}

pub async fn metrics(State(state): State<AppState>) -> Result<Response, HttpError> {
    let body = state.registry().export()?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, TEXT_FORMAT)],
        body,
    )
        .into_response())
}

pub async fn not_found(uri: Uri) -> HttpError {
    VitalsError::NotFound(format!("no route for {}", uri.path())).into()
}
