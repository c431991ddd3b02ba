use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError { status: StatusCode::BAD_REQUEST, message: msg.into() }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError { status: StatusCode::NOT_FOUND, message: msg.into() }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError { status: StatusCode::INTERNAL_SERVER_ERROR, message: msg.into() }
    }

    pub fn missing_field(field: &str) -> Self {
        ApiError::bad_request(format!("Missing required field '{}'", field))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<fnswitch_domain::DomainError> for ApiError {
    fn from(e: fnswitch_domain::DomainError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<fnswitch_driver::ControlError> for ApiError {
    fn from(e: fnswitch_driver::ControlError) -> Self {
        ApiError::internal(format!("An error occurred: {}", e))
    }
}
