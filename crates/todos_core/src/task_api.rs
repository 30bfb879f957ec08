use crate::error::AppError;
use crate::model::{Priority, Task, TaskList, TaskStatus};
use crate::storage::json_store;
use std::path::Path;
use time::{Date, Duration, OffsetDateTime};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub status: Option<TaskStatus>,
    pub ready_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetail {
    pub task: Task,
    pub can_start: bool,
    pub blockers: Vec<u32>,
}

pub fn add_task(title: &str, assigned_to: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    add_task_with_path(&path, title, assigned_to)
}

pub fn edit_task(id: u32, new_title: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    edit_task_with_path(&path, id, new_title)
}

pub fn update_task_status(id: u32, status: TaskStatus) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    update_task_status_with_path(&path, id, status, OffsetDateTime::now_utc())
}

pub fn complete_task(id: u32) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    complete_task_with_path(&path, id, OffsetDateTime::now_utc())
}

pub fn delete_task(id: u32) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    delete_task_with_path(&path, id)
}

pub fn set_task_priority(id: u32, priority: Priority) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    set_task_priority_with_path(&path, id, priority)
}

pub fn assign_task(id: u32, assigned_to: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    assign_task_with_path(&path, id, assigned_to)
}

pub fn set_task_due_date(id: u32, due_date: Option<Date>) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    set_task_due_date_with_path(&path, id, due_date)
}

pub fn set_task_estimate(id: u32, estimate: Option<Duration>) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    set_task_estimate_with_path(&path, id, estimate)
}

pub fn log_task_time(id: u32, spent: Duration) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    log_task_time_with_path(&path, id, spent)
}

pub fn add_task_dependency(id: u32, dependency: u32) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    add_task_dependency_with_path(&path, id, dependency)
}

pub fn remove_task_dependency(id: u32, dependency: u32) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    remove_task_dependency_with_path(&path, id, dependency)
}

pub fn list_tasks(filter: ListFilter) -> Result<Vec<Task>, AppError> {
    let path = json_store::store_path()?;
    list_tasks_with_path(&path, filter)
}

pub fn get_task(id: u32) -> Result<TaskDetail, AppError> {
    let path = json_store::store_path()?;
    get_task_with_path(&path, id)
}

/// Load, apply one mutation, and save only if it succeeded.
fn mutate_with_path<F>(path: &Path, operation: &'static str, apply: F) -> Result<Task, AppError>
where
    F: FnOnce(&mut TaskList) -> Result<Task, AppError>,
{
    let mut tasks = json_store::load_tasks(path)?;
    let task = apply(&mut tasks)?;
    json_store::save_tasks(path, &tasks)?;
    info!(operation, task_id = task.id(), "task updated");

    Ok(task)
}

fn add_task_with_path(path: &Path, title: &str, assigned_to: &str) -> Result<Task, AppError> {
    mutate_with_path(path, "add", |tasks| tasks.add(title, assigned_to).cloned())
}

fn edit_task_with_path(path: &Path, id: u32, new_title: &str) -> Result<Task, AppError> {
    mutate_with_path(path, "edit", |tasks| tasks.edit_title(id, new_title).cloned())
}

fn update_task_status_with_path(
    path: &Path,
    id: u32,
    status: TaskStatus,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    mutate_with_path(path, "status", |tasks| {
        tasks.update_status(id, status, now).cloned()
    })
}

fn complete_task_with_path(path: &Path, id: u32, now: OffsetDateTime) -> Result<Task, AppError> {
    mutate_with_path(path, "done", |tasks| tasks.complete(id, now).cloned())
}

fn delete_task_with_path(path: &Path, id: u32) -> Result<Task, AppError> {
    mutate_with_path(path, "delete", |tasks| tasks.delete(id))
}

fn set_task_priority_with_path(
    path: &Path,
    id: u32,
    priority: Priority,
) -> Result<Task, AppError> {
    mutate_with_path(path, "priority", |tasks| {
        tasks.set_priority(id, priority).cloned()
    })
}

fn assign_task_with_path(path: &Path, id: u32, assigned_to: &str) -> Result<Task, AppError> {
    mutate_with_path(path, "assign", |tasks| tasks.assign(id, assigned_to).cloned())
}

fn set_task_due_date_with_path(
    path: &Path,
    id: u32,
    due_date: Option<Date>,
) -> Result<Task, AppError> {
    mutate_with_path(path, "due", |tasks| tasks.set_due_date(id, due_date).cloned())
}

fn set_task_estimate_with_path(
    path: &Path,
    id: u32,
    estimate: Option<Duration>,
) -> Result<Task, AppError> {
    mutate_with_path(path, "estimate", |tasks| {
        tasks.set_estimate(id, estimate).cloned()
    })
}

fn log_task_time_with_path(path: &Path, id: u32, spent: Duration) -> Result<Task, AppError> {
    mutate_with_path(path, "log", |tasks| tasks.log_time(id, spent).cloned())
}

fn add_task_dependency_with_path(
    path: &Path,
    id: u32,
    dependency: u32,
) -> Result<Task, AppError> {
    mutate_with_path(path, "depend", |tasks| {
        tasks.add_dependency(id, dependency).cloned()
    })
}

fn remove_task_dependency_with_path(
    path: &Path,
    id: u32,
    dependency: u32,
) -> Result<Task, AppError> {
    mutate_with_path(path, "undepend", |tasks| {
        tasks.remove_dependency(id, dependency).cloned()
    })
}

fn list_tasks_with_path(path: &Path, filter: ListFilter) -> Result<Vec<Task>, AppError> {
    let tasks = json_store::load_tasks(path)?;
    Ok(filter_tasks(&tasks, filter))
}

fn filter_tasks(tasks: &TaskList, filter: ListFilter) -> Vec<Task> {
    let ready: Vec<u32> = if filter.ready_only {
        tasks.ready().into_iter().map(Task::id).collect()
    } else {
        Vec::new()
    };

    tasks
        .iter()
        .filter(|task| filter.status.is_none_or(|status| task.status == status))
        .filter(|task| !filter.ready_only || ready.contains(&task.id()))
        .cloned()
        .collect()
}

fn get_task_with_path(path: &Path, id: u32) -> Result<TaskDetail, AppError> {
    let tasks = json_store::load_tasks(path)?;
    let task = tasks.find_by_id(id)?;

    Ok(TaskDetail {
        task: task.clone(),
        can_start: task.can_start(&tasks),
        blockers: tasks.blockers(id)?,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        ListFilter, add_task_dependency_with_path, add_task_with_path, assign_task_with_path,
        complete_task_with_path, delete_task_with_path, edit_task_with_path, get_task_with_path,
        list_tasks_with_path, log_task_time_with_path, remove_task_dependency_with_path,
        set_task_due_date_with_path, set_task_estimate_with_path, set_task_priority_with_path,
        update_task_status_with_path,
    };
    use crate::model::{Priority, Task, TaskStatus};
    use crate::storage::json_store;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use time::macros::{date, datetime};
    use time::{Duration, OffsetDateTime};

    const NOW: OffsetDateTime = datetime!(2025-12-20 12:00 UTC);

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("todos-{nanos}-{file_name}"))
    }

    fn seed(path: &PathBuf, titles: &[&str]) {
        for title in titles {
            add_task_with_path(path, title, "").unwrap();
        }
    }

    fn ids(tasks: &[Task]) -> Vec<u32> {
        tasks.iter().map(Task::id).collect()
    }

    #[test]
    fn add_task_writes_to_store() {
        let path = temp_path("add-task.json");
        let first = add_task_with_path(&path, "Write spec", "").unwrap();
        let second = add_task_with_path(&path, "Review spec", "sam").unwrap();
        let loaded = json_store::load_tasks(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
        assert_eq!(second.assigned_to, "sam");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.find_by_id(2).unwrap(), &second);
    }

    #[test]
    fn add_task_reports_exhausted_ids_without_saving() {
        let path = temp_path("max-id.json");
        let content = "[{\"id\": 4294967295, \"task\": \"last\", \"status\": \"Not Started\", \"priority\": \"Low\"}]";
        std::fs::write(&path, content).unwrap();

        let err = add_task_with_path(&path, "overflow", "").unwrap_err();
        let after = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
        assert_eq!(after, content);
    }

    #[test]
    fn edit_task_updates_title() {
        let path = temp_path("edit-task.json");
        seed(&path, &["old"]);

        let updated = edit_task_with_path(&path, 1, "new").unwrap();
        let loaded = json_store::load_tasks(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(updated.title, "new");
        assert_eq!(loaded.find_by_id(1).unwrap().title, "new");
    }

    #[test]
    fn failed_mutation_leaves_store_untouched() {
        let path = temp_path("edit-missing.json");
        seed(&path, &["old"]);
        let before = std::fs::read_to_string(&path).unwrap();

        let err = edit_task_with_path(&path, 2, "new").unwrap_err();
        let after = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(err.code(), "not_found");
        assert_eq!(before, after);
    }

    #[test]
    fn update_status_persists_completion_invariant() {
        let path = temp_path("status.json");
        seed(&path, &["one"]);

        let completed = update_task_status_with_path(&path, 1, TaskStatus::Completed, NOW).unwrap();
        assert_eq!(completed.completed_at, Some(NOW));

        let reopened =
            update_task_status_with_path(&path, 1, TaskStatus::NotStarted, NOW).unwrap();
        let loaded = json_store::load_tasks(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reopened.completed_at, None);
        assert_eq!(loaded.find_by_id(1).unwrap().completed_at, None);
    }

    #[test]
    fn complete_task_marks_completed() {
        let path = temp_path("done.json");
        seed(&path, &["one"]);

        let done = complete_task_with_path(&path, 1, NOW).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.completed_at, Some(NOW));
    }

    #[test]
    fn delete_task_removes_task() {
        let path = temp_path("delete.json");
        seed(&path, &["one", "two"]);

        let removed = delete_task_with_path(&path, 1).unwrap();
        let loaded = json_store::load_tasks(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(removed.title, "one");
        assert_eq!(ids(loaded.as_slice()), vec![2]);
    }

    #[test]
    fn delete_task_rejects_missing_id() {
        let path = temp_path("delete-missing.json");
        let err = delete_task_with_path(&path, 1).unwrap_err();

        assert_eq!(err.code(), "not_found");
        assert!(!path.exists());
    }

    #[test]
    fn attribute_updates_persist() {
        let path = temp_path("attributes.json");
        seed(&path, &["one", "two"]);

        set_task_priority_with_path(&path, 1, Priority::High).unwrap();
        assign_task_with_path(&path, 1, "jo").unwrap();
        set_task_due_date_with_path(&path, 1, Some(date!(2026 - 01 - 10))).unwrap();
        set_task_estimate_with_path(&path, 1, Some(Duration::hours(3))).unwrap();
        log_task_time_with_path(&path, 1, Duration::minutes(40)).unwrap();
        add_task_dependency_with_path(&path, 1, 2).unwrap();

        let loaded = json_store::load_tasks(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let task = loaded.find_by_id(1).unwrap();
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.assigned_to, "jo");
        assert_eq!(task.due_date, Some(date!(2026 - 01 - 10)));
        assert_eq!(task.estimated_time, Some(Duration::hours(3)));
        assert_eq!(task.time_spent, Some(Duration::minutes(40)));
        assert_eq!(task.depends_on, vec![2]);
    }

    #[test]
    fn remove_dependency_persists() {
        let path = temp_path("undepend.json");
        seed(&path, &["one", "two"]);
        add_task_dependency_with_path(&path, 1, 2).unwrap();

        let task = remove_task_dependency_with_path(&path, 1, 2).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(task.depends_on.is_empty());
    }

    #[test]
    fn list_tasks_applies_filters() {
        let path = temp_path("list.json");
        seed(&path, &["one", "two", "three"]);
        add_task_dependency_with_path(&path, 3, 1).unwrap();
        update_task_status_with_path(&path, 2, TaskStatus::InProgress, NOW).unwrap();

        let all = list_tasks_with_path(&path, ListFilter::default()).unwrap();
        let in_progress = list_tasks_with_path(
            &path,
            ListFilter {
                status: Some(TaskStatus::InProgress),
                ready_only: false,
            },
        )
        .unwrap();
        let ready = list_tasks_with_path(
            &path,
            ListFilter {
                status: None,
                ready_only: true,
            },
        )
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ids(&all), vec![1, 2, 3]);
        assert_eq!(ids(&in_progress), vec![2]);
        assert_eq!(ids(&ready), vec![1, 2]);
    }

    #[test]
    fn get_task_reports_readiness() {
        let path = temp_path("show.json");
        seed(&path, &["one", "two"]);
        add_task_dependency_with_path(&path, 2, 1).unwrap();
        add_task_dependency_with_path(&path, 2, 5).unwrap();

        let detail = get_task_with_path(&path, 2).unwrap();
        let missing = get_task_with_path(&path, 9).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(!detail.can_start);
        assert_eq!(detail.blockers, vec![1, 5]);
        assert_eq!(missing.code(), "not_found");
    }
}
