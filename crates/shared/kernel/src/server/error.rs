use super::state::ApiStateError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// JSON error body. The shape depends on the route that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ErrorBody {
    /// `{"error": "..."}`
    Single { error: String },
    /// `{"error": "...", "details": "..."}`
    Detailed { error: String, details: String },
    /// `{"errors": ["..."]}`
    List { errors: Vec<String> },
}

/// An HTTP error ready to be rendered by axum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    #[must_use]
    pub const fn new(status: StatusCode, body: ErrorBody) -> Self {
        Self { status, body }
    }

    pub fn single(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, ErrorBody::Single { error: message.into() })
    }

    pub fn list(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, ErrorBody::List { errors: vec![message.into()] })
    }

    pub fn detailed(status: StatusCode, message: impl Into<String>, details: impl ToString) -> Self {
        Self::new(
            status,
            ErrorBody::Detailed { error: message.into(), details: details.to_string() },
        )
    }

    /// `404 {"error": message}`
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::single(StatusCode::NOT_FOUND, message)
    }

    /// `400 {"errors": [message]}`
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::list(StatusCode::BAD_REQUEST, message)
    }

    /// `500 {"errors": ["An error occurred while <action>"]}`
    pub fn internal(action: &str) -> Self {
        Self::list(StatusCode::INTERNAL_SERVER_ERROR, format!("An error occurred while {action}"))
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ApiStateError> for ApiError {
    fn from(err: ApiStateError) -> Self {
        error!(error = %err, "Application state is incomplete");
        Self::internal("resolving application state")
    }
}

/// Body rejections become `400 {"errors": [...]}`.
///
/// A body that parses but has the wrong types reports the decoder's message; an absent,
/// empty or non-JSON body reports `Request body is required`.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => Self::bad_request(err.body_text()),
            _ => Self::bad_request("Request body is required"),
        }
    }
}
