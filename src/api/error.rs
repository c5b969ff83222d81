//! API error handling for consistent JSON error responses.

use crate::error::BotError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

/// API error type that converts to JSON responses.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Map<String, Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = self.details;
        body.insert("error".to_string(), json!(self.message));
        (self.status, Json(Value::Object(body))).into_response()
    }
}

impl From<BotError> for ApiError {
    fn from(err: BotError) -> Self {
        let message = err.to_string();
        match err {
            BotError::Input(_) => Self::bad_request(message),
            BotError::AssetNotFound(_) | BotError::NotFound(_) => Self::not_found(message),
            BotError::Upstream { status, body } => Self::new(StatusCode::BAD_GATEWAY, message)
                .with_detail("upstream_status", status)
                .with_detail("upstream_body", body),
            BotError::MalformedResponse(_) => Self::new(StatusCode::BAD_GATEWAY, message),
            BotError::Exposure(_) => Self::new(StatusCode::SERVICE_UNAVAILABLE, message),
            BotError::Io(_) => Self::internal(message),
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
