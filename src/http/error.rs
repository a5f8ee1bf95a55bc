//! Error-to-response translation for the HTTP layer
//!
//! The core's error kinds map onto transport status codes here, so the
//! business logic never sees HTTP types and the handlers never branch on
//! error internals.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, error};

use crate::types::TransferError;

/// A transport-level error: a status code plus a JSON error body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status to return
    pub status: StatusCode,
    /// Human-readable message placed in the `error` body field
    pub message: String,
}

impl ApiError {
    /// A 400 with the given message, for input rejected at the boundary
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<TransferError> for ApiError {
    fn from(error: TransferError) -> Self {
        let status = match error {
            TransferError::InvalidAmount { .. }
            | TransferError::SameAccount { .. }
            | TransferError::AccountNotFound { .. }
            | TransferError::NotEnoughFunds { .. } => StatusCode::BAD_REQUEST,
            TransferError::Contention { .. } => StatusCode::CONFLICT,
            TransferError::ArithmeticOverflow { .. } | TransferError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!(%error, "request failed");
        } else {
            debug!(%error, "request rejected");
        }

        ApiError {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
