//! Task CRUD on top of the `tasks` table, with optional image attachments.

use std::path::PathBuf;

use db::models::task::{SaveTask, Task, TaskDto};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::fs::File;
use tracing::{error, info, warn};

use super::image::{ImageError, ImageService, ImageUpload};

#[derive(Debug, Error)]
pub enum TaskServiceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("task not found")]
    NotFound,
    #[error("image error: {0}")]
    Image(#[from] ImageError),
}

/// An opened task image ready to be streamed.
#[derive(Debug)]
pub struct TaskImage {
    pub file: File,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TaskService {
    pool: SqlitePool,
    images: ImageService,
}

impl TaskService {
    pub fn new(pool: SqlitePool, images: ImageService) -> Self {
        Self { pool, images }
    }

    pub async fn list_all(&self) -> Result<Vec<TaskDto>, TaskServiceError> {
        let tasks = Task::find_all(&self.pool).await?;
        Ok(tasks.into_iter().map(TaskDto::from).collect())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<TaskDto, TaskServiceError> {
        Ok(self.existing(id).await?.into())
    }

    /// Open the image attached to task `id`. A task without an image, or one
    /// whose file has since disappeared, reports [`ImageError::Missing`].
    pub async fn open_image(&self, id: i64) -> Result<TaskImage, TaskServiceError> {
        let task = self.existing(id).await?;
        let Some(path) = task.image else {
            return Err(ImageError::Missing(format!("task {id} has no image")).into());
        };
        let file = self.images.open_image(&path).await?;
        Ok(TaskImage {
            file,
            path: PathBuf::from(path),
        })
    }

    /// Create a task. A failed image upload does not fail the request; the
    /// task is created without an image.
    pub async fn save_task(
        &self,
        dto: TaskDto,
        image: Option<ImageUpload>,
    ) -> Result<TaskDto, TaskServiceError> {
        let image_path = match image {
            Some(upload) => match self.images.upload_image(&upload).await {
                Ok(path) => path,
                Err(e) => {
                    warn!(error = %e, "Image upload failed, creating task without image");
                    None
                }
            },
            None => None,
        };

        let data =
            dto.into_new_task(image_path.as_ref().map(|p| p.to_string_lossy().into_owned()));
        let task = self.save_or_discard(&data, image_path).await?;
        info!(task_id = task.id, has_image = task.image.is_some(), "Task created");
        Ok(task.into())
    }

    /// Partially update task `id`. Unlike create, a failed image upload fails
    /// the whole request.
    pub async fn update_task(
        &self,
        dto: TaskDto,
        id: i64,
        image: Option<ImageUpload>,
    ) -> Result<TaskDto, TaskServiceError> {
        let previous = self.existing(id).await?;

        let image_path = match image {
            Some(upload) => self.images.upload_image(&upload).await.map_err(|e| {
                error!(task_id = id, error = %e, "Image upload failed while updating task");
                e
            })?,
            None => None,
        };

        let data = dto.merge_onto(
            &previous,
            image_path.as_ref().map(|p| p.to_string_lossy().into_owned()),
        );
        let task = self.save_or_discard(&data, image_path).await?;
        info!(task_id = id, "Task updated");
        Ok(task.into())
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<(), TaskServiceError> {
        self.existing(id).await?;
        Task::delete(&self.pool, id).await?;
        info!(task_id = id, "Task deleted");
        Ok(())
    }

    /// Persist `data`; if that fails, the freshly stored image no row points
    /// at is removed again.
    async fn save_or_discard(
        &self,
        data: &SaveTask,
        stored_image: Option<PathBuf>,
    ) -> Result<Task, TaskServiceError> {
        match Task::save(&self.pool, data).await {
            Ok(task) => Ok(task),
            Err(e) => {
                if let Some(path) = stored_image {
                    self.images.remove_image(&path).await;
                }
                Err(e.into())
            }
        }
    }

    async fn existing(&self, id: i64) -> Result<Task, TaskServiceError> {
        Task::find_by_id(&self.pool, id)
            .await?
            .ok_or(TaskServiceError::NotFound)
    }
}
