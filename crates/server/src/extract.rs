//! Request body extraction for task writes: JSON or multipart form data.

use std::{fmt::Display, str::FromStr};

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Request},
    http::{HeaderMap, header, request::Parts},
};
use db::models::task::TaskDto;
use services::services::image::ImageUpload;
use tracing::debug;
use validator::Validate;

use crate::error::{ApiError, FieldError};

/// Task id from the `{id}` path segment. Unparsable ids are reported like any
/// other field error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskId(pub i64);

impl<S> FromRequestParts<S> for TaskId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Validation(vec![FieldError::new("id", e.body_text())]))?;
        Ok(TaskId(id))
    }
}

/// A validated task body plus the image file, if one was sent.
///
/// Multipart text parts carry the DTO fields by their JSON names; the one
/// part with a file name is the image.
#[derive(Debug)]
pub struct TaskPayload {
    pub dto: TaskDto,
    pub image: Option<ImageUpload>,
}

impl<S> FromRequest<S> for TaskPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let payload = if is_multipart(req.headers()) {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;
            Self::from_multipart(multipart).await?
        } else {
            let Json(dto) = Json::<TaskDto>::from_request(req, state)
                .await
                .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;
            Self { dto, image: None }
        };

        payload.dto.validate()?;
        Ok(payload)
    }
}

impl TaskPayload {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut dto = TaskDto::default();
        let mut image = None;
        let mut errors = Vec::new();

        while let Some(field) = multipart.next_field().await? {
            if let Some(file_name) = field.file_name().map(str::to_owned) {
                let bytes = field.bytes().await?;
                image = Some(ImageUpload::new(Some(file_name), bytes));
                continue;
            }

            let name = field.name().unwrap_or_default().to_owned();
            let value = field.text().await?;
            match name.as_str() {
                "id" => dto.id = parse_field(&name, &value, &mut errors),
                "description" => dto.description = Some(value),
                "status" => dto.status = parse_field(&name, &value, &mut errors),
                "image" => dto.image = Some(value),
                "isCompleted" => dto.is_completed = parse_field(&name, &value, &mut errors),
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        Ok(Self { dto, image })
    }
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

/// Blank form values count as absent.
fn parse_field<T>(name: &str, value: &str, errors: &mut Vec<FieldError>) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.push(FieldError::new(name, format!("invalid value {value:?}: {e}")));
            None
        }
    }
}
