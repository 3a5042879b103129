use std::cmp::Ordering;

use crate::models::{Priority, Task};

/// Completion-status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Option<StatusFilter> {
        match s.to_lowercase().as_str() {
            "all" => Some(StatusFilter::All),
            "completed" | "done" => Some(StatusFilter::Completed),
            "pending" | "open" => Some(StatusFilter::Pending),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Completed => "completed",
            StatusFilter::Pending => "pending",
        }
    }
}

/// Which field the task list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    DueDate,
    Priority,
    Title,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<SortKey> {
        match s.to_lowercase().as_str() {
            "created" | "created_at" => Some(SortKey::CreatedAt),
            "due" | "due_date" => Some(SortKey::DueDate),
            "priority" => Some(SortKey::Priority),
            "title" => Some(SortKey::Title),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created",
            SortKey::DueDate => "due",
            SortKey::Priority => "priority",
            SortKey::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<SortOrder> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Some(SortOrder::Asc),
            "desc" | "descending" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// The full set of client-side view controls for the task list.
#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    /// Case-insensitive substring match on the title; empty matches all.
    pub search: String,
    /// `None` means "all".
    pub priority: Option<Priority>,
    /// `None` means "all".
    pub category: Option<String>,
    pub status: StatusFilter,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

/// A task is included iff it passes every active filter.
pub fn matches(task: &Task, filters: &TaskFilters) -> bool {
    if !filters.search.is_empty()
        && !task
            .title
            .to_lowercase()
            .contains(&filters.search.to_lowercase())
    {
        return false;
    }
    if let Some(priority) = filters.priority {
        if task.priority != priority {
            return false;
        }
    }
    if let Some(category) = &filters.category {
        if task.category_id.as_deref() != Some(category.as_str()) {
            return false;
        }
    }
    match filters.status {
        StatusFilter::All => true,
        StatusFilter::Completed => task.completed,
        StatusFilter::Pending => !task.completed,
    }
}

/// Stable sort by a single key.
///
/// Tasks without a due date always sort last when ordering by due date,
/// regardless of direction; every other comparison flips with the order.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey, order: SortOrder) {
    let flip = |ord: Ordering| match order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    };
    tasks.sort_by(|a, b| match key {
        SortKey::Title => flip(a.title.cmp(&b.title)),
        SortKey::Priority => flip(a.priority.rank().cmp(&b.priority.rank())),
        SortKey::CreatedAt => flip(a.created_at.cmp(&b.created_at)),
        SortKey::DueDate => match (a.due_date, b.due_date) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => flip(x.cmp(&y)),
        },
    });
}

/// Filters and sorts a snapshot of the task list for display.
pub fn apply(tasks: &[Task], filters: &TaskFilters) -> Vec<Task> {
    let mut visible: Vec<Task> = tasks
        .iter()
        .filter(|t| matches(t, filters))
        .cloned()
        .collect();
    sort_tasks(&mut visible, filters.sort_by, filters.sort_order);
    visible
}
