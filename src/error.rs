//! Typed errors and their mapping onto the uniform response envelope.
//!
//! Every handler returns `Result<_, AppError>`; this `IntoResponse` impl is
//! the single fallback that turns any handler failure into the four-field
//! envelope. Nothing escapes a request uncaught.

use crate::codec::CodecError;
use crate::envelope::Envelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::ModelNotFound(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Codec(_) => StatusCode::BAD_REQUEST,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Db(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Cipher and database internals never leak.
    fn public_message(&self) -> String {
        match self {
            AppError::Codec(_) => "could not decode request payload".to_string(),
            AppError::Db(sqlx::Error::RowNotFound) => "not found".to_string(),
            AppError::Db(_) => "database error".to_string(),
            AppError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let msg = self.public_message();
        let body = Envelope::failure(status, msg);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_errors_map_to_client_error_with_generic_message() {
        let err = AppError::Codec(CodecError::Decrypt);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "could not decode request payload");
    }

    #[test]
    fn db_errors_map_to_server_error_without_detail() {
        let err = AppError::Db(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "database error");
    }

    #[test]
    fn unresolved_model_is_a_not_found_class_error() {
        let err = AppError::ModelNotFound("Webinar".into());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.public_message().contains("Webinar"));
    }
}
