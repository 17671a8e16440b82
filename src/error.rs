use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failure taxonomy for every workflow operation and handler.
///
/// Validation and authorization problems reject the request outright.
/// Upstream generator/research failures only surface here when no degraded
/// result could be produced instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("pitch limit reached: agent already has {count} open pitches (limit {limit})")]
    LimitExceeded { count: i64, limit: i64 },

    #[error("{0}")]
    Conflict(String),

    #[error("upstream service failed: {0}")]
    Upstream(String),

    #[error("storage pool exhausted; a slow request is holding connections, retry shortly")]
    PoolExhausted,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl From<r2d2::Error> for Error {
    fn from(_: r2d2::Error) -> Self {
        // r2d2's only checkout error is a timeout waiting for a connection.
        Error::PoolExhausted
    }
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) | Error::LimitExceeded { .. } => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::PoolExhausted => StatusCode::SERVICE_UNAVAILABLE,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (
            status,
            Json(serde_json::json!({ "success": false, "error": self.to_string() })),
        )
            .into_response()
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
