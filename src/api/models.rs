use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

pub const MSG_FETCHED: &str = "Content fetched successfully";
pub const MSG_FETCHED_FALLBACK: &str = "Content fetched successfully (fallback to full page)";

#[derive(Debug, Deserialize)]
pub struct ReaderParams {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Uniform envelope for every response, success or failure.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse<T> {
    pub success: bool,
    pub message: String,
    pub status_code: u16,
    pub response_object: Option<T>,
}

impl<T> ServiceResponse<T> {
    pub fn ok(message: impl Into<String>, object: T) -> ServiceResponse<T> {
        ServiceResponse {
            success: true,
            message: message.into(),
            status_code: StatusCode::OK.as_u16(),
            response_object: Some(object),
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> ServiceResponse<T> {
        ServiceResponse {
            success: false,
            message: message.into(),
            status_code: status.as_u16(),
            response_object: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        // the emitted status always mirrors the envelope
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
