use std::error::Error as StdError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use brewcache_api_types::ErrorBody;

use crate::application::error::ErrorReport;

/// Error response carrying a fixed public message.
///
/// The diagnostic chain travels in an [`ErrorReport`] extension for the
/// logging middleware and never reaches the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    report: ErrorReport,
}

impl ApiError {
    pub fn bad_request(
        source: &'static str,
        message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
            report: ErrorReport::from_message(source, StatusCode::BAD_REQUEST, detail),
        }
    }

    pub fn internal(source: &'static str, message: &'static str, error: &dyn StdError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
            report: ErrorReport::from_error(source, StatusCode::INTERNAL_SERVER_ERROR, error),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &'static str {
        self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message.to_string(),
        };
        let mut response = (self.status, Json(body)).into_response();
        self.report.attach(&mut response);
        response
    }
}
