use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use validator::{Validate, ValidationError};

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// A persisted task row.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub description: String,
    pub status: TaskStatus,
    pub image: Option<String>, // Absolute path of the stored upload
    pub is_completed: bool,
}

/// Wire representation of a task. Everything but `description` is optional on
/// input; absent fields are filled by the service on create and merged from
/// the stored row on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    #[ts(type = "number | null")]
    pub id: Option<i64>,
    #[validate(
        required(message = "The description is required!"),
        custom(function = "not_blank", message = "The description is required!")
    )]
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub image: Option<String>,
    pub is_completed: Option<bool>,
}

/// Row to be written by [`Task::save`]. `id: None` inserts a new row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTask {
    pub id: Option<i64>,
    pub description: String,
    pub status: TaskStatus,
    pub image: Option<String>,
    pub is_completed: bool,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

impl From<Task> for TaskDto {
    fn from(task: Task) -> Self {
        Self {
            id: Some(task.id),
            description: Some(task.description),
            status: Some(task.status),
            image: task.image,
            is_completed: Some(task.is_completed),
        }
    }
}

impl From<&Task> for SaveTask {
    fn from(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            description: task.description.clone(),
            status: task.status,
            image: task.image.clone(),
            is_completed: task.is_completed,
        }
    }
}

impl TaskDto {
    /// New row for a create request. Status and completion always start at
    /// their defaults whatever the client sent; the image reference is only
    /// ever a path the server stored itself.
    pub fn into_new_task(self, image: Option<String>) -> SaveTask {
        SaveTask {
            id: None,
            description: self.description.unwrap_or_default(),
            status: TaskStatus::Pending,
            image,
            is_completed: false,
        }
    }

    /// Partial merge over `previous`: fields the client left out keep their
    /// stored value, `description` is always replaced. The row id comes from
    /// `previous`, never from the body.
    pub fn merge_onto(self, previous: &Task, image: Option<String>) -> SaveTask {
        SaveTask {
            id: Some(previous.id),
            description: self.description.unwrap_or_default(),
            status: self.status.unwrap_or(previous.status),
            image: image.or_else(|| previous.image.clone()),
            is_completed: self.is_completed.unwrap_or(previous.is_completed),
        }
    }
}

impl Task {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"SELECT id, description, status, image, is_completed
               FROM tasks
               ORDER BY id ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"SELECT id, description, status, image, is_completed
               FROM tasks
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Upsert by id. Without an id the store assigns one.
    pub async fn save(pool: &SqlitePool, data: &SaveTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"INSERT INTO tasks (id, description, status, image, is_completed)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT(id) DO UPDATE SET
                   description = excluded.description,
                   status = excluded.status,
                   image = excluded.image,
                   is_completed = excluded.is_completed
               RETURNING id, description, status, image, is_completed"#,
        )
        .bind(data.id)
        .bind(&data.description)
        .bind(data.status)
        .bind(&data.image)
        .bind(data.is_completed)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn sample_task() -> Task {
        Task {
            id: 1,
            description: "Task 1".to_string(),
            status: TaskStatus::Pending,
            image: Some("www.example.com".to_string()),
            is_completed: false,
        }
    }

    fn new_task(description: &str) -> SaveTask {
        SaveTask {
            id: None,
            description: description.to_string(),
            status: TaskStatus::Pending,
            image: None,
            is_completed: false,
        }
    }

    #[test]
    fn test_entity_dto_round_trip() {
        let task = sample_task();
        let dto = TaskDto::from(task.clone());

        assert_eq!(dto.id, Some(1));
        assert_eq!(dto.description.as_deref(), Some("Task 1"));
        assert_eq!(dto.status, Some(TaskStatus::Pending));
        assert_eq!(dto.image.as_deref(), Some("www.example.com"));
        assert_eq!(dto.is_completed, Some(false));
        assert_eq!(dto.merge_onto(&task, None), SaveTask::from(&task));
    }

    #[test]
    fn test_dto_json_uses_camel_case() {
        let dto = TaskDto::from(sample_task());
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "description": "Task 1",
                "status": "PENDING",
                "image": "www.example.com",
                "isCompleted": false
            })
        );

        let parsed: TaskDto =
            serde_json::from_str(r#"{"description":"x","status":"IN_PROGRESS"}"#).unwrap();
        assert_eq!(parsed.status, Some(TaskStatus::InProgress));
        assert_eq!(parsed.is_completed, None);
    }

    #[test]
    fn test_status_parses_from_wire_name() {
        assert_eq!("COMPLETED".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        assert_eq!(TaskStatus::InProgress.to_string(), "IN_PROGRESS");
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_description_validation() {
        let valid = TaskDto {
            description: Some("Write report".to_string()),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        for description in [None, Some(String::new()), Some("   ".to_string())] {
            let dto = TaskDto {
                description,
                ..Default::default()
            };
            let errors = dto.validate().unwrap_err();
            let field_errors = errors.field_errors();
            let description_errors = field_errors.get("description").unwrap();
            assert_eq!(
                description_errors[0].message.as_deref(),
                Some("The description is required!")
            );
        }
    }

    #[test]
    fn test_new_task_forces_defaults() {
        let dto = TaskDto {
            id: Some(99),
            description: Some("Ship it".to_string()),
            status: Some(TaskStatus::Completed),
            image: Some("/etc/passwd".to_string()),
            is_completed: Some(true),
        };
        let task = dto.into_new_task(None);
        assert_eq!(task.id, None);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(!task.is_completed);
        assert_eq!(task.image, None);
    }

    #[test]
    fn test_merge_keeps_omitted_fields() {
        let previous = Task {
            status: TaskStatus::InProgress,
            is_completed: true,
            ..sample_task()
        };
        let dto = TaskDto {
            id: Some(42),
            description: Some("Renamed".to_string()),
            ..Default::default()
        };
        let merged = dto.merge_onto(&previous, None);
        assert_eq!(merged.id, Some(1));
        assert_eq!(merged.description, "Renamed");
        assert_eq!(merged.status, TaskStatus::InProgress);
        assert!(merged.is_completed);
        assert_eq!(merged.image, previous.image);
    }

    #[test]
    fn test_merge_overwrites_supplied_fields() {
        let dto = TaskDto {
            description: Some("Done now".to_string()),
            status: Some(TaskStatus::Completed),
            is_completed: Some(true),
            ..Default::default()
        };
        let merged = dto.merge_onto(&sample_task(), Some("/uploads/new.png".to_string()));
        assert_eq!(merged.status, TaskStatus::Completed);
        assert!(merged.is_completed);
        assert_eq!(merged.image.as_deref(), Some("/uploads/new.png"));
    }

    #[tokio::test]
    async fn test_save_assigns_ids_and_lists_in_order() {
        let db = DBService::new_in_memory().await.unwrap();
        assert!(Task::find_all(&db.pool).await.unwrap().is_empty());

        let first = Task::save(&db.pool, &new_task("first")).await.unwrap();
        let second = Task::save(&db.pool, &new_task("second")).await.unwrap();
        assert_ne!(first.id, second.id);

        let ids: Vec<i64> = Task::find_all(&db.pool)
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_save_with_id_updates_in_place() {
        let db = DBService::new_in_memory().await.unwrap();
        let created = Task::save(&db.pool, &new_task("before")).await.unwrap();

        let updated = Task::save(
            &db.pool,
            &SaveTask {
                id: Some(created.id),
                description: "after".to_string(),
                status: TaskStatus::Completed,
                image: Some("/tmp/x.png".to_string()),
                is_completed: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(Task::find_all(&db.pool).await.unwrap().len(), 1);
        let stored = Task::find_by_id(&db.pool, created.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = DBService::new_in_memory().await.unwrap();
        let created = Task::save(&db.pool, &new_task("short lived")).await.unwrap();

        assert_eq!(Task::delete(&db.pool, created.id).await.unwrap(), 1);
        assert_eq!(Task::delete(&db.pool, created.id).await.unwrap(), 0);
        assert!(Task::find_by_id(&db.pool, created.id).await.unwrap().is_none());
    }
}
