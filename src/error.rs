use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::database::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Error::ValidationFailed(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "details": details }),
            ),
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            Error::Json(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An unexpected error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
