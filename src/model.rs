//! Core entities of the board: tasks, comments, people.
//!
//! A `Task` is mutated exclusively through [`crate::mutation::BoardController`];
//! everything here is plain data. Partial updates travel as [`TaskPatch`]
//! inside the process and as [`TaskUpdate`] over the persistence boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};
use crate::status::Status;

/// Task priority, independent of status. Filtering and visual emphasis only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" | "critical" => Ok(Priority::Urgent),
            other => Err(Error::Validation(format!(
                "unknown priority '{other}' (expected low, medium, high, urgent)"
            ))),
        }
    }
}

/// A project member. Read-only to the board core: the surrounding
/// application owns the member universe, tasks only reference it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Identity of the interactive user, supplied externally. Drives the
/// "mine only" filter and comment ownership checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl CurrentUser {
    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id.clone(),
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// A unit of work. `status` is the single source of truth for placement:
/// Kanban columns and Gantt lanes are both derived from it, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<Profile>,
    #[serde(default)]
    pub comment_count: u32,
}

impl Task {
    pub fn assignee_ids(&self) -> Vec<String> {
        self.assignees.iter().map(|a| a.id.clone()).collect()
    }

    pub fn has_assignee(&self, user_id: &str) -> bool {
        self.assignees.iter().any(|a| a.id == user_id)
    }
}

/// A partial task update proposed by a gesture. Unset fields are untouched
/// by the merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub started_at: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub assignees: Option<Vec<Profile>>,
}

impl TaskPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn dates(started_at: NaiveDate, due_date: NaiveDate) -> Self {
        Self {
            started_at: Some(started_at),
            due_date: Some(due_date),
            ..Self::default()
        }
    }

    pub fn assignees(assignees: Vec<Profile>) -> Self {
        Self {
            assignees: Some(assignees),
            ..Self::default()
        }
    }

    /// An empty patch is a no-op and must never reach the gateway.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merge this patch into a task. Only set fields are applied.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(started_at) = self.started_at {
            task.started_at = Some(started_at);
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(assignees) = &self.assignees {
            task.assignees = assignees.clone();
        }
    }

    /// Wire shape for the persistence boundary. Assignees collapse to an
    /// id list; the server replaces the whole set.
    pub fn to_update(&self) -> TaskUpdate {
        TaskUpdate {
            task_name: self.name.clone(),
            task_description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            started_at: self.started_at,
            due_date: self.due_date,
            assignee_ids: self
                .assignees
                .as_ref()
                .map(|list| list.iter().map(|a| a.id.clone()).collect()),
        }
    }
}

/// Partial task update as sent to the persistence boundary.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<String>>,
}

/// A comment on a task. Conceptually owned by the task; edit and delete are
/// gated on the author matching the current user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub task_id: String,
    pub author: Profile,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_edited: bool,
}

impl Comment {
    /// Build a fresh comment authored by the current user. Ulid ids sort by
    /// creation time, which keeps threads ordered.
    pub fn new(task_id: impl Into<String>, author: Profile, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Ulid::new().to_string(),
            task_id: task_id.into(),
            author,
            text: text.into(),
            created_at: now,
            updated_at: now,
            is_edited: false,
        }
    }
}

/// Comment edit as sent to the persistence boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentUpdate {
    pub comment_text: String,
}
