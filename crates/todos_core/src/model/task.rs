use crate::model::collection::TaskList;
use crate::model::status::{Priority, TaskStatus};
use crate::model::timing::{date_option, duration_option};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

/// One stored task. Keys are camelCase, with the title under `task`; unset
/// optional fields are omitted rather than written as null.
///
/// `completed_at` is present exactly when `status` is `Completed`;
/// [`TaskList::from_tasks`] rejects records that break this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: u32,
    #[serde(rename = "task")]
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default, with = "date_option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    #[serde(default, with = "duration_option", skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<Duration>,
    #[serde(default, with = "duration_option", skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<Duration>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<u32>,
}

impl Task {
    /// Only [`TaskList::add`] hands out ids.
    pub(crate) fn new(id: u32, title: &str, assigned_to: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            status: TaskStatus::NotStarted,
            priority: Priority::Low,
            assigned_to: assigned_to.to_string(),
            due_date: None,
            estimated_time: None,
            time_spent: None,
            completed_at: None,
            depends_on: Vec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn is_complete(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Whether every dependency exists in `tasks` and is completed.
    ///
    /// A dangling dependency id counts as unsatisfied rather than an error.
    pub fn can_start(&self, tasks: &TaskList) -> bool {
        self.depends_on
            .iter()
            .all(|dep| tasks.find_by_id(*dep).is_ok_and(Task::is_complete))
    }

    pub fn mark_complete(&mut self, now: OffsetDateTime) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(now);
    }
}
