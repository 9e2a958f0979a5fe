//! Error taxonomy shared by every crate in the gateway.
//!
//! Each variant maps to exactly one HTTP status and error `type` string.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Model '{0}' not found")]
    ModelNotFound(String),

    #[error("Model '{0}' is not running")]
    ModelNotRunning(String),

    #[error("{0}")]
    Validation(String),

    #[error("Request timed out")]
    RequestTimeout,

    #[error("Upstream inference error: {0}")]
    Inference { status: StatusCode, message: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl GatewayError {
    fn error_type(&self) -> &'static str {
        match self {
            GatewayError::ModelNotFound(_) => "model_not_found",
            GatewayError::ModelNotRunning(_) => "model_not_running",
            GatewayError::Validation(_) => "validation_error",
            GatewayError::RequestTimeout => "request_timeout",
            GatewayError::Inference { .. } => "inference_error",
            GatewayError::Connection(_) => "connection_error",
            GatewayError::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            GatewayError::ModelNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::ModelNotRunning(_) => StatusCode::BAD_REQUEST,
            GatewayError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            GatewayError::Inference { status, .. } => *status,
            GatewayError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    message: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.error_type();
        let message = self.to_string();
        tracing::warn!(error_type = kind, %message, "request failed");
        (status, Json(ErrorBody { error: ErrorDetail { message, kind } })).into_response()
    }
}
