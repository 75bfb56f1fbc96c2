use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use services::services::{image::ImageError, task::TaskServiceError};
use thiserror::Error;
use tracing::{debug, error};
use ts_rs::TS;
use validator::ValidationErrors;

const TASK_NOT_FOUND: &str = "Task not found!";
const FILE_NOT_FOUND: &str = "File not found!";
const INTERNAL_ERROR: &str = "Internal server error";

/// One entry of a 400 response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    TaskService(#[from] TaskServiceError),
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

impl ApiError {
    /// Body extraction failure. Oversized bodies keep their 413, everything
    /// else is a plain bad request.
    pub fn rejected(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(message)
        } else {
            ApiError::BadRequest(message)
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::Validation(fields)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(vec![FieldError::new("body", message)]),
            )
                .into_response(),
            ApiError::PayloadTooLarge(message) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(vec![FieldError::new("body", message)]),
            )
                .into_response(),
            ApiError::Multipart(e) => {
                ApiError::rejected(e.status(), e.body_text()).into_response()
            }
            ApiError::TaskService(TaskServiceError::NotFound) => {
                (StatusCode::NOT_FOUND, TASK_NOT_FOUND).into_response()
            }
            ApiError::TaskService(TaskServiceError::Image(ImageError::Missing(what))) => {
                debug!(%what, "Image not available");
                (StatusCode::NOT_FOUND, FILE_NOT_FOUND).into_response()
            }
            ApiError::TaskService(e) => {
                error!(error = %e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response()
            }
        }
    }
}
