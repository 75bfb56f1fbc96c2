use std::path::PathBuf;

use directories::ProjectDirs;

const UPLOADS_DIR_NAME: &str = "img-uploads";
const DATABASE_FILE_NAME: &str = "db.sqlite";

/// Root directory for everything the server writes to disk.
///
/// Debug builds keep their state next to the workspace so it is easy to wipe;
/// release builds use the platform data directory.
pub fn asset_dir() -> PathBuf {
    if cfg!(debug_assertions) {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../dev_assets")
    } else {
        ProjectDirs::from("app", "brickup", "task-api")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("task-api-data"))
    }
}

pub fn uploads_dir() -> PathBuf {
    asset_dir().join(UPLOADS_DIR_NAME)
}

pub fn database_url() -> String {
    format!("sqlite://{}", asset_dir().join(DATABASE_FILE_NAME).to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uploads_dir_lives_under_asset_dir() {
        assert!(uploads_dir().starts_with(asset_dir()));
        assert!(uploads_dir().ends_with(UPLOADS_DIR_NAME));
    }

    #[test]
    fn test_database_url_is_sqlite() {
        let url = database_url();
        assert!(url.starts_with("sqlite://"));
        assert!(url.ends_with(DATABASE_FILE_NAME));
    }
}
