use crate::error::AppError;
use crate::model::status::{Priority, TaskStatus};
use crate::model::task::Task;
use crate::model::timing::is_storable;
use serde::Serialize;
use std::collections::HashSet;
use time::{Date, Duration, OffsetDateTime};
use tracing::warn;

/// Tasks in insertion order. Lookups are linear scans by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    /// Wrap tasks read from storage, rejecting zero or repeated ids and
    /// any `completed_at` that disagrees with the status.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, AppError> {
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if task.id() == 0 {
                return Err(AppError::invalid_data("task ids must be positive"));
            }
            if !seen.insert(task.id()) {
                return Err(AppError::invalid_data(format!(
                    "duplicate task id {}",
                    task.id()
                )));
            }
            if task.is_complete() != task.completed_at.is_some() {
                return Err(AppError::invalid_data(format!(
                    "task {} is {} but completedAt is {}",
                    task.id(),
                    task.status.label(),
                    if task.completed_at.is_some() { "set" } else { "missing" }
                )));
            }
        }

        Ok(Self { tasks })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn find_by_id(&self, id: u32) -> Result<&Task, AppError> {
        self.tasks
            .iter()
            .find(|task| task.id() == id)
            .ok_or(AppError::NotFound(id))
    }

    pub fn find_index_by_id(&self, id: u32) -> Result<usize, AppError> {
        self.tasks
            .iter()
            .position(|task| task.id() == id)
            .ok_or(AppError::NotFound(id))
    }

    fn find_by_id_mut(&mut self, id: u32) -> Result<&mut Task, AppError> {
        self.tasks
            .iter_mut()
            .find(|task| task.id() == id)
            .ok_or(AppError::NotFound(id))
    }

    fn next_id(&self) -> Option<u32> {
        self.tasks.iter().map(Task::id).max().unwrap_or(0).checked_add(1)
    }

    pub fn add(&mut self, title: &str, assigned_to: &str) -> Result<&Task, AppError> {
        let id = self
            .next_id()
            .ok_or_else(|| AppError::invalid_data("task id space exhausted"))?;
        let index = self.tasks.len();
        self.tasks.push(Task::new(id, title, assigned_to));
        Ok(&self.tasks[index])
    }

    /// Remove one task. Other tasks keep any `depends_on` entries pointing at it.
    pub fn delete(&mut self, id: u32) -> Result<Task, AppError> {
        let index = self.find_index_by_id(id)?;
        Ok(self.tasks.remove(index))
    }

    pub fn edit_title(&mut self, id: u32, title: &str) -> Result<&Task, AppError> {
        let task = self.find_by_id_mut(id)?;
        task.title = title.to_string();
        Ok(task)
    }

    /// Set `status`, keeping `completed_at` present exactly while completed.
    ///
    /// A task that is already completed keeps its original timestamp; use
    /// [`TaskList::complete`] to stamp it again.
    pub fn update_status(
        &mut self,
        id: u32,
        status: TaskStatus,
        now: OffsetDateTime,
    ) -> Result<&Task, AppError> {
        let task = self.find_by_id_mut(id)?;

        if status == TaskStatus::Completed {
            if !task.is_complete() || task.completed_at.is_none() {
                task.completed_at = Some(now);
            }
        } else {
            task.completed_at = None;
        }
        task.status = status;

        Ok(task)
    }

    pub fn complete(&mut self, id: u32, now: OffsetDateTime) -> Result<&Task, AppError> {
        let task = self.find_by_id_mut(id)?;
        task.mark_complete(now);
        Ok(task)
    }

    pub fn set_priority(&mut self, id: u32, priority: Priority) -> Result<&Task, AppError> {
        let task = self.find_by_id_mut(id)?;
        task.priority = priority;
        Ok(task)
    }

    pub fn assign(&mut self, id: u32, assigned_to: &str) -> Result<&Task, AppError> {
        let task = self.find_by_id_mut(id)?;
        task.assigned_to = assigned_to.to_string();
        Ok(task)
    }

    pub fn set_due_date(&mut self, id: u32, due_date: Option<Date>) -> Result<&Task, AppError> {
        let task = self.find_by_id_mut(id)?;
        task.due_date = due_date;
        Ok(task)
    }

    pub fn set_estimate(
        &mut self,
        id: u32,
        estimate: Option<Duration>,
    ) -> Result<&Task, AppError> {
        let task = self.find_by_id_mut(id)?;
        task.estimated_time = estimate;
        Ok(task)
    }

    /// Add `spent` to the task's tracked time, starting from zero when unset.
    pub fn log_time(&mut self, id: u32, spent: Duration) -> Result<&Task, AppError> {
        if spent.is_negative() {
            return Err(AppError::invalid_input("time spent cannot be negative"));
        }

        let task = self.find_by_id_mut(id)?;
        let total = task
            .time_spent
            .unwrap_or(Duration::ZERO)
            .checked_add(spent)
            .filter(|total| is_storable(*total))
            .ok_or_else(|| AppError::invalid_input("time spent is out of range"))?;
        task.time_spent = Some(total);
        Ok(task)
    }

    /// Record that `id` waits on `dependency`. Neither existence of the
    /// dependency nor cycles are checked.
    pub fn add_dependency(&mut self, id: u32, dependency: u32) -> Result<&Task, AppError> {
        let known = self.find_index_by_id(dependency).is_ok();
        let task = self.find_by_id_mut(id)?;

        if id == dependency {
            warn!(task_id = id, "task depends on itself and can never start");
        } else if !known {
            warn!(task_id = id, dependency, "dependency does not match any task");
        }

        if !task.depends_on.contains(&dependency) {
            task.depends_on.push(dependency);
        }
        Ok(task)
    }

    pub fn remove_dependency(&mut self, id: u32, dependency: u32) -> Result<&Task, AppError> {
        let task = self.find_by_id_mut(id)?;
        task.depends_on.retain(|dep| *dep != dependency);
        Ok(task)
    }

    pub fn filter_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.status == status)
            .collect()
    }

    /// Open tasks whose dependencies are all completed.
    pub fn ready(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.status.is_open() && task.can_start(self))
            .collect()
    }

    /// Dependencies of `id` that are missing or not yet completed.
    pub fn blockers(&self, id: u32) -> Result<Vec<u32>, AppError> {
        let task = self.find_by_id(id)?;
        Ok(task
            .depends_on
            .iter()
            .copied()
            .filter(|dep| !self.find_by_id(*dep).is_ok_and(Task::is_complete))
            .collect())
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
