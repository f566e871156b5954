//! HTTP error mapping.
//!
//! Client errors carry a user-facing message. Server errors are logged with
//! their cause and answered with a generic message only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pipeline::{StoreError, SubmissionError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Message for incoherent input.
pub const INCOHERENT_MESSAGE: &str = "Se tiene que escribir algo coherente";

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body is not valid JSON of the expected shape.
    #[error("Cuerpo de la petición inválido")]
    InvalidBody,

    /// The query string could not be parsed.
    #[error("Parámetros de consulta inválidos")]
    InvalidQuery,

    /// An inbound submission failed validation.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// The comment did not pass the coherence gate.
    #[error("Se tiene que escribir algo coherente")]
    Incoherent,

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(&'static str),

    /// The route exists but not for this method.
    #[error("Método no permitido para este endpoint")]
    MethodNotAllowed,

    /// Appending to the history failed.
    #[error("Error al guardar el análisis")]
    Persistence(#[source] StoreError),

    /// Any other failure reading the history.
    #[error("Error interno del servidor")]
    Internal(#[source] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody | ApiError::InvalidQuery | ApiError::Submission(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Incoherent => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Persistence(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Persistence(source) | ApiError::Internal(source) = &self {
            error!(error = %source, "request failed");
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
