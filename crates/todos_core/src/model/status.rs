use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Glyphs stripped from status text before matching.
const STATUS_GLYPHS: [&str; 11] = [
    "✅", "✓", "🟢", "🔄", "🚧", "🟡", "⏳", "❌", "🚫", "🔴", "⛔",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Rejected,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Rejected => "Rejected",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::NotStarted => "⏳",
            Self::InProgress => "🚧",
            Self::Completed => "✅",
            Self::Rejected => "❌",
        }
    }

    /// True for states a task can still be worked on from.
    pub fn is_open(self) -> bool {
        matches!(self, Self::NotStarted | Self::InProgress)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.glyph(), self.label())
    }
}

/// Normalize loosely worded, optionally emoji-decorated status text.
///
/// Known glyphs are removed, the rest is trimmed and lowercased and then
/// matched exactly against the synonym groups. The error carries `input` as
/// given, before any stripping.
pub fn parse_status(input: &str) -> Result<TaskStatus, AppError> {
    let cleaned = strip_status_glyphs(input);

    match cleaned.trim().to_lowercase().as_str() {
        "in progress" => Ok(TaskStatus::InProgress),
        "complete" | "completed" | "done" => Ok(TaskStatus::Completed),
        "not started" | "pending" | "todo" => Ok(TaskStatus::NotStarted),
        "reject" | "rejected" => Ok(TaskStatus::Rejected),
        _ => Err(AppError::invalid_status(input)),
    }
}

fn strip_status_glyphs(input: &str) -> String {
    STATUS_GLYPHS
        .iter()
        .fold(input.to_string(), |text, glyph| text.replace(glyph, ""))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn parse_priority(input: &str) -> Result<Priority, AppError> {
    match input.trim().to_lowercase().as_str() {
        "high" => Ok(Priority::High),
        "medium" => Ok(Priority::Medium),
        "low" => Ok(Priority::Low),
        _ => Err(AppError::invalid_input(format!(
            "invalid priority: {input} (expected high, medium or low)"
        ))),
    }
}
