// Error type for the HTTP layer. Every failure leaves the handler as
// `{"status": false, "error": <kind>, "message": <detail>}`.

use crate::fooocus::UpstreamError;
use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    // Client input
    MissingImage,
    BadRequest(String),
    Multipart(MultipartError),
    PayloadTooLarge { limit: usize },
    Unauthorized(String),

    // Pipeline failures, all reported as 500
    Upstream(UpstreamError),
    ImageProcessing(String),
    Internal(String),
}

impl ApiError {
    fn parts(self) -> (StatusCode, &'static str, String) {
        match self {
            Self::MissingImage => (
                StatusCode::BAD_REQUEST,
                "Missing required parameter",
                "Parameter 'image' (file) is required in form-data.".to_string(),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Invalid request", msg),
            Self::Multipart(err) => (err.status(), "Invalid form data", err.body_text()),
            Self::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "File too large",
                format!("Parameter 'image' must not exceed {} bytes.", limit),
            ),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "Unauthorized", msg),
            Self::Upstream(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Image upscale failed",
                err.to_string(),
            ),
            Self::ImageProcessing(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Image upscale failed",
                format!("Image processing error: {}", msg),
            ),
            Self::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Image upscale failed",
                msg,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = self.parts();

        let body = Json(json!({
            "status": false,
            "error": error,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        Self::Upstream(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err)
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<image::ImageError> for ApiError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Image task failed: {}", err))
    }
}
