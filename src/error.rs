//! System-error responses: `NotReady`/`NotFound`/`Validation`/`Fatal`. Rule
//! failures (wrong movie, not connected, ...) are never represented here —
//! the game engine returns them as ordinary `200` payloads with
//! `success: false`.
//!
//! A `color_eyre::Report` plus a `StatusCode` plus a correlation `Uuid`,
//! logged once in `into_response`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre::Report;
use tracing::error;
use uuid::Uuid;

pub struct AppError {
    id: Uuid,
    status: StatusCode,
    inner: Report,
}

impl AppError {
    pub fn new(inner: Report, status: StatusCode) -> Self {
        Self {
            id: Uuid::new_v4(),
            status,
            inner,
        }
    }

    pub fn not_ready() -> Self {
        Self::new(
            color_eyre::eyre::eyre!("graph not loaded"),
            StatusCode::SERVICE_UNAVAILABLE,
        )
    }

    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::new(color_eyre::eyre::eyre!("{what} not found"), StatusCode::NOT_FOUND)
    }

    pub fn validation(message: impl std::fmt::Display) -> Self {
        Self::new(color_eyre::eyre::eyre!("{message}"), StatusCode::BAD_REQUEST)
    }

    pub fn fatal(message: impl std::fmt::Display) -> Self {
        Self::new(
            color_eyre::eyre::eyre!("{message}"),
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError { id, status, inner } = self;
        error!(error_id = %id, status = %status, error = ?inner, "request failed");

        let body = serde_json::json!({
            "error": "request_failed",
            "status": status.as_u16(),
            "message": inner.to_string(),
            "errorId": id.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
