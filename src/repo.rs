use chrono::{NaiveDateTime, NaiveTime, Utc};

use crate::categories::CategoryStore;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::filter::{self, TaskFilters};
use crate::models::{Category, Task, TaskCreate, TaskDraft, TaskPatch, TaskUpdate};
use crate::recurrence::next_due_date;

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Owns the authoritative in-memory copy of the user's tasks and keeps it
/// consistent with the backend.
///
/// Every mutation talks to the server first and only touches the local list
/// once the server has accepted the change, so a failed request leaves the
/// list exactly as it was. Mutations take `&mut self`, which rules out two
/// operations interleaving on the same list.
pub struct TaskRepository {
    client: ApiClient,
    categories: Box<dyn CategoryStore>,
    tasks: Vec<Task>,
}

impl TaskRepository {
    pub fn new(client: ApiClient, categories: Box<dyn CategoryStore>) -> TaskRepository {
        TaskRepository {
            client,
            categories,
            tasks: Vec::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }

    /// The current in-memory list, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Filtered and sorted snapshot for display.
    pub fn filtered(&self, filters: &TaskFilters) -> Vec<Task> {
        filter::apply(&self.tasks, filters)
    }

    /// Replaces the in-memory list with the server's records. Client-only
    /// fields come back at their defaults (priority medium, no recurrence).
    pub async fn fetch_all(&mut self) -> Result<(), ApiError> {
        let wires = self.client.get_tasks(None).await?;
        self.tasks = wires.into_iter().map(Task::from_wire).collect();
        Ok(())
    }

    /// Fetches a single task by id without touching the local list.
    pub async fn fetch_one(&mut self, id: i64) -> Result<Task, ApiError> {
        let wire = self.client.get_task(id).await?;
        Ok(Task::from_wire(wire))
    }

    /// Creates a task on the server and prepends the returned record,
    /// merged with the draft's client-only fields, to the local list.
    pub async fn create(&mut self, draft: TaskDraft) -> Result<Task, ApiError> {
        validate_draft(&draft)?;

        let body = TaskCreate {
            title: draft.title.clone(),
            description: draft.description.clone(),
            is_completed: false,
            due_date: draft.due_date.map(|d| d.and_time(NaiveTime::MIN)),
            // Overridden server-side with the authenticated user.
            user_id: 0,
        };
        let wire = self.client.create_task(&body).await?;

        let mut task = Task::from_wire(wire);
        task.due_date = draft.due_date;
        task.due_time = draft.due_time;
        task.priority = draft.priority;
        task.category_id = draft.category_id;
        task.is_recurring = draft.is_recurring;
        task.recurring_frequency = draft.recurring_frequency;
        task.reminder_enabled = draft.reminder_enabled;

        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    /// Merges partial fields into the identified record, locally and on the
    /// server. An id that is not in the local list is a no-op returning
    /// `Ok(None)`.
    pub async fn update(&mut self, id: i64, patch: TaskPatch) -> Result<Option<Task>, ApiError> {
        let Some(pos) = self.tasks.iter().position(|t| t.id == id) else {
            return Ok(None);
        };

        let body = TaskUpdate {
            title: patch.title.clone(),
            description: patch.description.clone(),
            is_completed: patch.completed,
            due_date: patch.due_date.map(|d| d.and_time(NaiveTime::MIN)),
        };
        let wire = self.client.update_task(id, &body).await?;

        let task = &mut self.tasks[pos];
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = Some(description);
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
            task.completed_at = if completed { Some(now()) } else { None };
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(due_time) = patch.due_time {
            task.due_time = Some(due_time);
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(category_id) = patch.category_id {
            task.category_id = Some(category_id);
        }
        if let Some(is_recurring) = patch.is_recurring {
            task.is_recurring = is_recurring;
        }
        if let Some(frequency) = patch.recurring_frequency {
            task.recurring_frequency = Some(frequency);
        }
        if let Some(reminder) = patch.reminder_enabled {
            task.reminder_enabled = reminder;
        }
        task.updated_at = wire.updated_at;

        Ok(Some(task.clone()))
    }

    /// Deletes on the server, then locally. An id that is not in the local
    /// list is a no-op returning `Ok(false)`; a server failure leaves the
    /// list unchanged.
    pub async fn delete(&mut self, id: i64) -> Result<bool, ApiError> {
        if !self.tasks.iter().any(|t| t.id == id) {
            return Ok(false);
        }
        self.client.delete_task(id).await?;
        self.tasks.retain(|t| t.id != id);
        Ok(true)
    }

    /// Flips a task's completion state.
    ///
    /// Completing a recurring task first creates and persists the next
    /// occurrence (same settings, advanced due date), then marks the
    /// original complete. The occurrence is created before the completion
    /// update is sent; if creating it fails, the original stays pending.
    pub async fn toggle_complete(&mut self, id: i64) -> Result<Option<Task>, ApiError> {
        let Some(current) = self.tasks.iter().find(|t| t.id == id).cloned() else {
            return Ok(None);
        };
        let completed = !current.completed;

        if completed && current.is_recurring {
            if let Some(frequency) = current.recurring_frequency {
                let due = next_due_date(current.due_date, frequency);
                self.create(TaskDraft {
                    title: current.title.clone(),
                    description: current.description.clone(),
                    due_date: Some(due),
                    due_time: current.due_time,
                    priority: current.priority,
                    category_id: current.category_id.clone(),
                    is_recurring: true,
                    recurring_frequency: Some(frequency),
                    reminder_enabled: current.reminder_enabled,
                })
                .await?;
            }
        }

        self.update(
            id,
            TaskPatch {
                completed: Some(completed),
                ..TaskPatch::default()
            },
        )
        .await
    }

    // ── Categories ────────────────────────────────────────────────────

    pub fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.categories.list()
    }

    pub fn add_category(&mut self, name: &str, color: &str) -> Result<Category, ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("category name is required".into()));
        }
        self.categories.add(name, color)
    }

    pub fn remove_category(&mut self, id: &str) -> Result<bool, ApiError> {
        self.categories.remove(id)
    }
}

/// Submit-time checks: a title is required, and a recurring task must name
/// its frequency.
fn validate_draft(draft: &TaskDraft) -> Result<(), ApiError> {
    if draft.title.trim().is_empty() {
        return Err(ApiError::Validation("task title is required".into()));
    }
    if draft.is_recurring && draft.recurring_frequency.is_none() {
        return Err(ApiError::Validation(
            "recurring tasks need a frequency (daily, weekly, monthly)".into(),
        ));
    }
    Ok(())
}
