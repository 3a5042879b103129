use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Task priority. Defaults to `Medium` when the server record carries none.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parses a user-supplied priority string.
    pub fn parse(s: &str) -> Option<Priority> {
        match s.to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    /// Numeric rank used for sorting: high = 3, medium = 2, low = 1.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// How often a recurring task repeats.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecurringFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl RecurringFrequency {
    /// Parses a user-supplied recurrence string.
    pub fn parse(s: &str) -> Option<RecurringFrequency> {
        match s.to_lowercase().as_str() {
            "daily" => Some(RecurringFrequency::Daily),
            "weekly" => Some(RecurringFrequency::Weekly),
            "monthly" => Some(RecurringFrequency::Monthly),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecurringFrequency::Daily => "daily",
            RecurringFrequency::Weekly => "weekly",
            RecurringFrequency::Monthly => "monthly",
        }
    }
}

/// Represents a single task as the client sees it.
///
/// The server only persists the base fields (title, description, completion,
/// due date); priority, category, recurrence and reminder settings are
/// client-side extensions kept on the in-memory record.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Task {
    /// Unique identifier, assigned by the server (0 until created).
    pub id: i64,
    /// The task title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Whether the task has been completed.
    pub completed: bool,
    /// When the task was completed, if it is.
    pub completed_at: Option<NaiveDateTime>,
    /// Optional calendar due date.
    pub due_date: Option<NaiveDate>,
    /// Optional time of day, independent of `due_date`.
    pub due_time: Option<NaiveTime>,
    /// Task priority.
    pub priority: Priority,
    /// Optional category reference.
    pub category_id: Option<String>,
    /// Whether completing this task spawns the next occurrence.
    pub is_recurring: bool,
    /// Must be set whenever `is_recurring` is true.
    pub recurring_frequency: Option<RecurringFrequency>,
    /// Reminder flag; no delivery mechanism exists yet.
    pub reminder_enabled: bool,
    /// Owning user, server-assigned.
    pub user_id: i64,
    /// Creation timestamp, server-assigned.
    pub created_at: NaiveDateTime,
    /// Last-update timestamp, server-assigned.
    pub updated_at: NaiveDateTime,
}

impl Task {
    /// Converts a server record into the client shape, filling the
    /// client-only fields with defaults.
    pub fn from_wire(wire: TaskWire) -> Task {
        let completed_at = if wire.is_completed {
            Some(wire.updated_at)
        } else {
            None
        };
        Task {
            id: wire.id,
            title: wire.title,
            description: wire.description,
            completed: wire.is_completed,
            completed_at,
            due_date: wire.due_date.map(|d| d.date()),
            due_time: None,
            priority: Priority::default(),
            category_id: None,
            is_recurring: false,
            recurring_frequency: None,
            reminder_enabled: false,
            user_id: wire.user_id,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

/// A category for grouping tasks. Simulated client-side until the backend
/// grows category persistence.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Display color, e.g. a hex string.
    pub color: String,
    pub user_id: String,
}

/// Caller-supplied fields for creating a task.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub priority: Priority,
    pub category_id: Option<String>,
    pub is_recurring: bool,
    pub recurring_frequency: Option<RecurringFrequency>,
    pub reminder_enabled: bool,
}

/// Partial update applied to an existing task. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub priority: Option<Priority>,
    pub category_id: Option<String>,
    pub is_recurring: Option<bool>,
    pub recurring_frequency: Option<RecurringFrequency>,
    pub reminder_enabled: Option<bool>,
}

/// Task record as the backend serves it. The wire field is `is_completed`;
/// the client-local field is `completed`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TaskWire {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_completed: bool,
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
    pub user_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Request body for `POST /api/tasks/`. The server overrides `user_id` with
/// the authenticated user.
#[derive(Serialize, Debug, Clone)]
pub struct TaskCreate {
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub due_date: Option<NaiveDateTime>,
    pub user_id: i64,
}

/// Request body for `PUT /api/tasks/{id}`.
#[derive(Serialize, Debug, Clone, Default)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
}
