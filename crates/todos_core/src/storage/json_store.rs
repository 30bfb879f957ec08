use crate::error::AppError;
use crate::model::{Task, TaskList};
use std::path::{Path, PathBuf};
use tracing::debug;

const STORE_FILE_NAME: &str = "todos.json";
const STORE_ENV_VAR: &str = "TODOS_STORE_PATH";

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("todos").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("todos")
            .join(STORE_FILE_NAME))
    }
}

/// Read the task array at `path`. A missing or blank file is an empty list.
pub fn load_tasks(path: &Path) -> Result<TaskList, AppError> {
    if !path.exists() {
        debug!(path = %path.display(), "store does not exist yet");
        return Ok(TaskList::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    if content.trim().is_empty() {
        return Ok(TaskList::default());
    }

    let tasks: Vec<Task> = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    let tasks = TaskList::from_tasks(tasks)?;
    debug!(path = %path.display(), count = tasks.len(), "loaded tasks");

    Ok(tasks)
}

pub fn save_tasks(path: &Path, tasks: &TaskList) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let content = serde_json::to_string_pretty(tasks)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    debug!(path = %path.display(), count = tasks.len(), "saved tasks");
    Ok(())
}
