use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy shared by all services and handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    TooManyRequests(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Maps a unique-constraint violation (SQLSTATE 23505) to `Conflict` with
    /// the given message; any other database error passes through unchanged.
    pub fn conflict_on_unique(err: sqlx::Error, msg: &str) -> Self {
        if has_sqlstate(&err, "23505") {
            ApiError::Conflict(msg.to_string())
        } else {
            ApiError::Database(err)
        }
    }

    /// Maps a foreign-key violation (SQLSTATE 23503) to `NotFound` with the
    /// given message — used where a referenced row is caller-supplied.
    pub fn not_found_on_fk(err: sqlx::Error, msg: &str) -> Self {
        if has_sqlstate(&err, "23503") {
            ApiError::NotFound(msg.to_string())
        } else {
            ApiError::Database(err)
        }
    }

    /// Maps a foreign-key violation to `Conflict` — used where deletion is
    /// forbidden while other rows still reference the target.
    pub fn conflict_on_fk(err: sqlx::Error, msg: &str) -> Self {
        if has_sqlstate(&err, "23503") {
            ApiError::Conflict(msg.to_string())
        } else {
            ApiError::Database(err)
        }
    }
}

fn has_sqlstate(err: &sqlx::Error, code: &str) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|c| c == code)
        .unwrap_or(false)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            ApiError::Database(err) => {
                tracing::error!("database error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            ApiError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
