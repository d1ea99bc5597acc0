use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::domain::error::TodoError;
use crate::domain::todo::Todo;

/// Body of `POST /api/todos` and `PATCH /api/todos/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContentBody {
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
}

/// `{ "todo": ... }` wrapper used by every single-record response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoEnvelope {
    pub todo: Todo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub description: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), description: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, message) }

    pub fn with_description(mut self, description: impl Into<Value>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<TodoError> for ApiError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            TodoError::Store(source) => {
                tracing::error!(error = %source, retryable = source.is_retryable(), "todo store failed");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope { error: ErrorBody { message: self.message, description: self.description } };
        (self.status, axum::Json(body)).into_response()
    }
}
