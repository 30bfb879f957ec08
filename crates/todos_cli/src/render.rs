use tabled::settings::Style;
use tabled::{Table, Tabled};
use todos_core::config::Palette;
use todos_core::error::AppError;
use todos_core::model::Task;
use todos_core::model::timing::{format_date, format_duration, local_date};
use todos_core::task_api::TaskDetail;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "Id")]
    id: u32,
    #[tabled(rename = "Task")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Assigned To")]
    assigned_to: String,
    #[tabled(rename = "Due Date")]
    due_date: String,
    #[tabled(rename = "Estimated Time")]
    estimated_time: String,
    #[tabled(rename = "Time Spent")]
    time_spent: String,
    #[tabled(rename = "Completed At")]
    completed_at: String,
    #[tabled(rename = "Depends On")]
    depends_on: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            title: task.title.clone(),
            status: task.status.to_string(),
            priority: task.priority.to_string(),
            assigned_to: assignee_label(task),
            due_date: task.due_date.map(format_date).unwrap_or_default(),
            estimated_time: task.estimated_time.map(format_duration).unwrap_or_default(),
            time_spent: task.time_spent.map(format_duration).unwrap_or_default(),
            completed_at: task
                .completed_at
                .map(|at| format_date(local_date(at)))
                .unwrap_or_default(),
            depends_on: join_ids(&task.depends_on),
        }
    }
}

fn assignee_label(task: &Task) -> String {
    if task.assigned_to.is_empty() {
        String::new()
    } else {
        format!("@{}", task.assigned_to)
    }
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn task_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks.".to_string();
    }

    let rows: Vec<TaskRow> = tasks.iter().map(TaskRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn task_json(task: &Task) -> Result<String, AppError> {
    serde_json::to_string(task).map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn tasks_json(tasks: &[Task]) -> Result<String, AppError> {
    serde_json::to_string(tasks).map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn detail_json(detail: &TaskDetail) -> Result<String, AppError> {
    let mut value = serde_json::to_value(&detail.task)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    value["canStart"] = serde_json::Value::Bool(detail.can_start);
    value["blockers"] = serde_json::json!(detail.blockers);
    Ok(value.to_string())
}

/// One-line confirmation such as `Added task: Write spec (1)`.
pub fn summary(verb: &str, task: &Task, palette: &Palette) -> String {
    format!(
        "{verb} task: {} ({})",
        task.title,
        palette.accentize(&task.id().to_string())
    )
}

pub fn detail_text(detail: &TaskDetail, palette: &Palette) -> String {
    let task = &detail.task;
    let dash = || "-".to_string();
    let readiness = if detail.can_start {
        "yes".to_string()
    } else {
        format!("no (waiting on {})", join_ids(&detail.blockers))
    };

    let lines = [
        format!("Task {}: {}", palette.accentize(&task.id().to_string()), task.title),
        format!(
            "  Status:         {}",
            palette.paint_status(task.status, &task.status.to_string())
        ),
        format!("  Priority:       {}", task.priority),
        format!(
            "  Assigned To:    {}",
            Some(assignee_label(task))
                .filter(|label| !label.is_empty())
                .unwrap_or_else(dash)
        ),
        format!(
            "  Due Date:       {}",
            task.due_date.map(format_date).unwrap_or_else(dash)
        ),
        format!(
            "  Estimated Time: {}",
            task.estimated_time.map(format_duration).unwrap_or_else(dash)
        ),
        format!(
            "  Time Spent:     {}",
            task.time_spent.map(format_duration).unwrap_or_else(dash)
        ),
        format!(
            "  Completed At:   {}",
            task.completed_at
                .map(|at| palette.mutedize(&format_date(local_date(at))))
                .unwrap_or_else(dash)
        ),
        format!(
            "  Depends On:     {}",
            Some(join_ids(&task.depends_on))
                .filter(|ids| !ids.is_empty())
                .unwrap_or_else(dash)
        ),
        format!("  Ready:          {readiness}"),
    ];

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{detail_json, detail_text, summary, task_table};
    use todos_core::config::palette_for_theme;
    use todos_core::model::{Task, TaskList};
    use todos_core::task_api::TaskDetail;
    use time::Duration;

    fn sample() -> TaskList {
        let mut tasks = TaskList::default();
        tasks.add("Write spec", "sam").unwrap();
        tasks.add("Review spec", "").unwrap();
        tasks.add_dependency(2, 1).unwrap();
        tasks.set_estimate(2, Some(Duration::minutes(90))).unwrap();
        tasks
    }

    fn detail_of(tasks: &TaskList, id: u32) -> TaskDetail {
        let task: &Task = tasks.find_by_id(id).unwrap();
        TaskDetail {
            task: task.clone(),
            can_start: task.can_start(tasks),
            blockers: tasks.blockers(id).unwrap(),
        }
    }

    #[test]
    fn task_table_lists_every_task() {
        let tasks = sample();
        let table = task_table(tasks.as_slice());

        assert!(table.contains("Assigned To"));
        assert!(table.contains("Write spec"));
        assert!(table.contains("@sam"));
        assert!(table.contains("⏳ Not Started"));
        assert!(table.contains("1h30m"));
    }

    #[test]
    fn task_table_handles_empty_list() {
        assert_eq!(task_table(&[]), "No tasks.");
    }

    #[test]
    fn summary_names_task() {
        let tasks = sample();
        let line = summary("Added", tasks.find_by_id(1).unwrap(), &palette_for_theme(None));
        assert_eq!(line, "Added task: Write spec (1)");
    }

    #[test]
    fn detail_reports_blockers() {
        let tasks = sample();
        let detail = detail_of(&tasks, 2);

        let text = detail_text(&detail, &palette_for_theme(None));
        assert!(text.contains("Ready:          no (waiting on 1)"));
        assert!(text.contains("Assigned To:    -"));

        let json: serde_json::Value = serde_json::from_str(&detail_json(&detail).unwrap()).unwrap();
        assert_eq!(json["canStart"], false);
        assert_eq!(json["blockers"], serde_json::json!([1]));
        assert_eq!(json["task"], "Review spec");
    }
}
