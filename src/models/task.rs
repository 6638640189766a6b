use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Number of tasks returned by a list call when no limit is given.
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Upper bound for the `limit` query parameter.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Todo,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Done,
}

/// Request body for creating a task.
///
/// Unknown fields are rejected. `owner_id` is the one exception: it is accepted
/// and thrown away, the owner is always the authenticated caller.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TaskInput {
    /// The title of the task. Must not be empty.
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,

    /// An optional description for the task.
    #[serde(default)]
    pub description: Option<String>,

    /// Initial status, `TODO` when omitted.
    #[serde(default)]
    pub status: Option<TaskStatus>,

    #[serde(default)]
    pub owner_id: Option<IgnoredAny>,
}

/// Request body for updating a task. Every field is optional; absent fields are left alone.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TaskUpdateInput {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    #[serde(default)]
    pub title: Option<String>,

    /// `Some(None)` when the client sent `"description": null`, which clears it.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub status: Option<TaskStatus>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    /// Identifier of the user who owns the task. Never changes.
    pub owner_id: Uuid,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update, `None` until the row is first modified.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Validated data for a task about to be inserted.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

/// A partial update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
}

/// Query parameters accepted when listing tasks.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TaskQuery {
    /// Returns `(limit, offset)` with the limit clamped to `1..=100` and the offset to `>= 0`.
    pub fn pagination(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

impl From<TaskInput> for NewTask {
    fn from(input: TaskInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            status: input.status.unwrap_or_default(),
        }
    }
}

impl From<TaskUpdateInput> for TaskChanges {
    fn from(input: TaskUpdateInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            status: input.status,
        }
    }
}

impl Task {
    /// Builds a task the way the database would: fresh id, `created_at` now, no `updated_at`.
    pub fn new(owner_id: Uuid, new_task: NewTask) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: new_task.title,
            description: new_task.description,
            status: new_task.status,
            owner_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Applies the supplied fields of a partial update.
    pub fn apply(&mut self, changes: TaskChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
    }
}
