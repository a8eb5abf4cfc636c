//! Unified application error model shared by the HTTP handlers and
//! the realtime channel, with mappers to each protocol's surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// No, invalid or expired session. Always fail closed.
    #[error("unauthorized")]
    Unauthorized,
    /// Authenticated but refused (wrong password on login).
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    Conflict(String),
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    /// Store or downstream failure. Logged at the call site and
    /// surfaced without retry; transient errors are user-visible.
    #[error("internal error")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl AppError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Realtime error frames carry the bare numeric status code as a
    /// text message ("404", "500", ...).
    pub fn ws_frame(&self) -> String {
        self.http_status().as_u16().to_string()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            // Conflict keeps its message (duplicate email at signup);
            // everything else answers with an empty body so status
            // codes stay the only signal.
            AppError::Conflict(msg) | AppError::BadRequest(msg) => msg.clone(),
            _ => String::new(),
        };
        (self.http_status(), body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
