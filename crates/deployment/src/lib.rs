use std::path::Path;

use db::DBService;
use services::services::{image::ImageService, task::TaskService};
use thiserror::Error;
use tracing::info;

mod config;

pub use config::DeploymentConfig;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Shared application state. Cheap to clone; every handler gets its own copy.
#[derive(Clone)]
pub struct Deployment {
    config: DeploymentConfig,
    db: DBService,
    images: ImageService,
}

impl Deployment {
    pub async fn new(config: DeploymentConfig) -> Result<Self, DeploymentError> {
        if let Some(dir) = sqlite_parent_dir(&config.database_url) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let db = DBService::new(&config.database_url).await?;
        Ok(Self::with_db(config, db))
    }

    /// Build around an already opened database, e.g. an in-memory one.
    pub fn with_db(config: DeploymentConfig, db: DBService) -> Self {
        let images = ImageService::new(&config.upload_dir);
        info!(upload_dir = %config.upload_dir.display(), "Image uploads configured");
        Self { config, db, images }
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn task_service(&self) -> TaskService {
        TaskService::new(self.db().pool.clone(), self.images.clone())
    }
}

/// Directory holding a file-backed SQLite database, if the url names one.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Path::new(path).parent().filter(|p| !p.as_os_str().is_empty())
}
