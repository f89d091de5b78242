//! HTTP mapping of store errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bookshelf_core::StoreError;
use serde::Serialize;

/// Body shape shared by every error response and the delete acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error returned by request handlers.
///
/// Wraps the store error so handlers can use `?`. Client mistakes map to
/// 4xx; only an exhausted id space is a server fault.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub StoreError);

impl ApiError {
    /// Status code sent for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            StoreError::NotFound => StatusCode::NOT_FOUND,
            StoreError::Validation => StatusCode::BAD_REQUEST,
            StoreError::IdsExhausted => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(MessageBody::new(self.to_string()))).into_response()
    }
}
