use axum::{
    Router,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::get,
};
use db::models::task::TaskDto;
use services::services::task::TaskImage;
use tokio_util::io::ReaderStream;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::{TaskId, TaskPayload},
};

const FALLBACK_IMAGE_TYPE: &str = "image/jpeg";

pub async fn list_tasks(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<Vec<TaskDto>>, ApiError> {
    let tasks = deployment.task_service().list_all().await?;
    Ok(ResponseJson(tasks))
}

pub async fn get_task(
    State(deployment): State<DeploymentImpl>,
    TaskId(id): TaskId,
) -> Result<ResponseJson<TaskDto>, ApiError> {
    let task = deployment.task_service().find_by_id(id).await?;
    Ok(ResponseJson(task))
}

/// GET /api/tasks/{id}/image
/// Stream the attached image back to the client
pub async fn get_task_image(
    State(deployment): State<DeploymentImpl>,
    TaskId(id): TaskId,
) -> Result<Response, ApiError> {
    let TaskImage { file, path } = deployment.task_service().open_image(id).await?;

    let content_type = mime_guess::from_path(&path)
        .first_raw()
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or(FALLBACK_IMAGE_TYPE);
    let body = Body::from_stream(ReaderStream::new(file));

    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

pub async fn create_task(
    State(deployment): State<DeploymentImpl>,
    payload: TaskPayload,
) -> Result<(StatusCode, ResponseJson<TaskDto>), ApiError> {
    let task = deployment
        .task_service()
        .save_task(payload.dto, payload.image)
        .await?;
    Ok((StatusCode::CREATED, ResponseJson(task)))
}

/// PUT and PATCH /api/tasks/{id}
/// Fields left out of the body keep their stored values
pub async fn update_task(
    State(deployment): State<DeploymentImpl>,
    TaskId(id): TaskId,
    payload: TaskPayload,
) -> Result<ResponseJson<TaskDto>, ApiError> {
    let task = deployment
        .task_service()
        .update_task(payload.dto, id, payload.image)
        .await?;
    Ok(ResponseJson(task))
}

pub async fn delete_task(
    State(deployment): State<DeploymentImpl>,
    TaskId(id): TaskId,
) -> Result<StatusCode, ApiError> {
    deployment.task_service().delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/tasks",
        Router::new()
            .route("/", get(list_tasks).post(create_task))
            .route(
                "/{id}",
                get(get_task)
                    .put(update_task)
                    .patch(update_task)
                    .delete(delete_task),
            )
            .route("/{id}/image", get(get_task_image)),
    )
}
