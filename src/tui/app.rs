use chrono::{NaiveDate, NaiveTime};
use ratatui::widgets::TableState;
use tokio::runtime::Handle;

use crate::filter::{SortKey, SortOrder, StatusFilter, TaskFilters};
use crate::models::{Category, Priority, RecurringFrequency, Task, TaskDraft, TaskPatch};
use crate::repo::TaskRepository;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
    Searching,
}

pub enum ViewMode {
    Tasks,
    Categories,
}

pub enum InputField {
    None,
    Title,
    Description,
    Due,
    DueTime,
    Priority,
    Category,
    Recur,
}

/// State for the multi-step "Add" wizard (tasks and categories).
#[derive(Default)]
pub struct AddState {
    pub title: String,
    pub description: Option<String>,
    pub due: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub priority: Priority,
    pub category: Option<String>,
    pub recur: Option<RecurringFrequency>,
    /// Tasks: 0 Title, 1 Description, 2 Due, 3 Priority, 4 Category, 5 Recurrence.
    /// Categories: 0 Name, 1 Color.
    pub step: usize,
}

pub struct App {
    pub repo: TaskRepository,
    rt: Handle,
    /// Filtered and sorted snapshot backing the task table.
    pub visible: Vec<Task>,
    pub categories: Vec<Category>,
    pub filters: TaskFilters,
    pub state: TableState,
    pub category_state: TableState,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub target_id: Option<i64>,
    pub add_state: AddState,
    /// Last operation result, shown in the status line.
    pub status_message: Option<String>,
}

impl App {
    /// Creates the app state and loads tasks from the backend.
    pub fn new(rt: Handle, repo: TaskRepository) -> App {
        let mut app = App {
            repo,
            rt,
            visible: Vec::new(),
            categories: Vec::new(),
            filters: TaskFilters::default(),
            state: TableState::default(),
            category_state: TableState::default(),
            view_mode: ViewMode::Tasks,
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            target_id: None,
            add_state: AddState::default(),
            status_message: None,
        };
        app.refresh_remote();
        app
    }

    /// Re-fetches the task list from the backend.
    pub fn refresh_remote(&mut self) {
        if let Err(e) = self.rt.block_on(self.repo.fetch_all()) {
            self.status_message = Some(format!("Failed to fetch tasks: {e}"));
        }
        self.refresh_view();
    }

    /// Rebuilds the visible snapshot from the in-memory list and clamps the
    /// selections.
    pub fn refresh_view(&mut self) {
        self.visible = self.repo.filtered(&self.filters);
        if self.visible.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.visible.len() {
                self.state.select(Some(self.visible.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }

        self.categories = self.repo.categories().unwrap_or_default();
        if self.categories.is_empty() {
            self.category_state.select(None);
        } else if let Some(i) = self.category_state.selected() {
            if i >= self.categories.len() {
                self.category_state.select(Some(self.categories.len() - 1));
            }
        } else {
            self.category_state.select(Some(0));
        }
    }

    /// Selects the next item in the current list.
    pub fn next(&mut self) {
        match self.view_mode {
            ViewMode::Tasks => {
                if self.visible.is_empty() {
                    return;
                }
                let i = match self.state.selected() {
                    Some(i) => {
                        if i >= self.visible.len() - 1 {
                            0
                        } else {
                            i + 1
                        }
                    }
                    None => 0,
                };
                self.state.select(Some(i));
            }
            ViewMode::Categories => {
                if self.categories.is_empty() {
                    return;
                }
                let i = match self.category_state.selected() {
                    Some(i) => {
                        if i >= self.categories.len() - 1 {
                            0
                        } else {
                            i + 1
                        }
                    }
                    None => 0,
                };
                self.category_state.select(Some(i));
            }
        }
    }

    /// Selects the previous item in the current list.
    pub fn previous(&mut self) {
        match self.view_mode {
            ViewMode::Tasks => {
                if self.visible.is_empty() {
                    return;
                }
                let i = match self.state.selected() {
                    Some(i) => {
                        if i == 0 {
                            self.visible.len() - 1
                        } else {
                            i - 1
                        }
                    }
                    None => 0,
                };
                self.state.select(Some(i));
            }
            ViewMode::Categories => {
                if self.categories.is_empty() {
                    return;
                }
                let i = match self.category_state.selected() {
                    Some(i) => {
                        if i == 0 {
                            self.categories.len() - 1
                        } else {
                            i - 1
                        }
                    }
                    None => 0,
                };
                self.category_state.select(Some(i));
            }
        }
    }

    fn selected_task_id(&self) -> Option<i64> {
        let i = self.state.selected()?;
        self.visible.get(i).map(|t| t.id)
    }

    /// Toggles completion on the selected task.
    pub fn toggle_complete_selected(&mut self) {
        if let ViewMode::Categories = self.view_mode {
            return;
        }
        let Some(id) = self.selected_task_id() else {
            return;
        };
        match self.rt.block_on(self.repo.toggle_complete(id)) {
            Ok(Some(task)) => {
                self.status_message = Some(if task.completed {
                    format!("Task {} completed", id)
                } else {
                    format!("Task {} reopened", id)
                });
            }
            Ok(None) => self.status_message = Some(format!("Task {} not found", id)),
            Err(e) => self.status_message = Some(format!("Failed to update task: {e}")),
        }
        self.refresh_view();
    }

    /// Deletes the currently selected task or category.
    pub fn delete_selected(&mut self) {
        match self.view_mode {
            ViewMode::Tasks => {
                let Some(id) = self.selected_task_id() else {
                    return;
                };
                match self.rt.block_on(self.repo.delete(id)) {
                    Ok(true) => self.status_message = Some(format!("Task {} removed", id)),
                    Ok(false) => self.status_message = Some(format!("Task {} not found", id)),
                    Err(e) => self.status_message = Some(format!("Failed to remove task: {e}")),
                }
                self.refresh_view();
            }
            ViewMode::Categories => {
                let Some(i) = self.category_state.selected() else {
                    return;
                };
                let Some(category) = self.categories.get(i) else {
                    return;
                };
                let id = category.id.clone();
                match self.repo.remove_category(&id) {
                    Ok(true) => self.status_message = Some("Category removed".into()),
                    Ok(false) => self.status_message = Some("Category not found".into()),
                    Err(e) => {
                        self.status_message = Some(format!("Failed to remove category: {e}"))
                    }
                }
                self.refresh_view();
            }
        }
    }

    /// Cycles the status filter: all -> pending -> completed.
    pub fn cycle_status_filter(&mut self) {
        self.filters.status = match self.filters.status {
            StatusFilter::All => StatusFilter::Pending,
            StatusFilter::Pending => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        };
        self.status_message = Some(format!("Status filter: {}", self.filters.status.as_str()));
        self.refresh_view();
    }

    /// Cycles the sort key: created -> due -> priority -> title.
    pub fn cycle_sort_key(&mut self) {
        self.filters.sort_by = match self.filters.sort_by {
            SortKey::CreatedAt => SortKey::DueDate,
            SortKey::DueDate => SortKey::Priority,
            SortKey::Priority => SortKey::Title,
            SortKey::Title => SortKey::CreatedAt,
        };
        self.status_message = Some(format!(
            "Sorting by {} ({})",
            self.filters.sort_by.as_str(),
            self.filters.sort_order.as_str()
        ));
        self.refresh_view();
    }

    /// Flips the sort direction.
    pub fn toggle_sort_order(&mut self) {
        self.filters.sort_order = match self.filters.sort_order {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        };
        self.status_message = Some(format!(
            "Sorting by {} ({})",
            self.filters.sort_by.as_str(),
            self.filters.sort_order.as_str()
        ));
        self.refresh_view();
    }

    /// Toggles between Task and Category views.
    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Tasks => ViewMode::Categories,
            ViewMode::Categories => ViewMode::Tasks,
        };
    }

    // ── Search ────────────────────────────────────────────────────────

    pub fn start_search(&mut self) {
        if let ViewMode::Categories = self.view_mode {
            return;
        }
        self.input_mode = InputMode::Searching;
        self.input_buffer = self.filters.search.clone();
    }

    /// Live-applies the search buffer while typing.
    pub fn apply_search(&mut self) {
        self.filters.search = self.input_buffer.clone();
        self.refresh_view();
    }

    pub fn cancel_search(&mut self) {
        self.input_buffer.clear();
        self.filters.search.clear();
        self.input_mode = InputMode::Normal;
        self.refresh_view();
    }

    // ── Add wizard ────────────────────────────────────────────────────

    /// Initiates the "Add" wizard for the current view.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    /// Initiates editing of a specific field for the selected task.
    pub fn start_edit(&mut self, field: InputField) {
        if let ViewMode::Categories = self.view_mode {
            return;
        }
        let Some(i) = self.state.selected() else {
            return;
        };
        let Some(t) = self.visible.get(i) else {
            return;
        };
        self.target_id = Some(t.id);
        self.input_mode = InputMode::Editing;
        self.input_buffer.clear();

        // Pre-fill buffer for editing
        match field {
            InputField::Title => self.input_buffer = t.title.clone(),
            InputField::Description => {
                self.input_buffer = t.description.clone().unwrap_or_default()
            }
            InputField::Due => {
                self.input_buffer = t.due_date.map(|d| d.to_string()).unwrap_or_default()
            }
            InputField::DueTime => {
                self.input_buffer = t
                    .due_time
                    .map(|t| t.format("%H:%M").to_string())
                    .unwrap_or_default()
            }
            InputField::Priority => self.input_buffer = t.priority.as_str().to_string(),
            InputField::Category => {
                self.input_buffer = t.category_id.clone().unwrap_or_default()
            }
            InputField::Recur => {
                self.input_buffer = t
                    .recurring_frequency
                    .map(|f| f.as_str().to_string())
                    .unwrap_or_default()
            }
            InputField::None => {}
        }
        self.input_field = field;
    }

    /// Handles a submitted input line based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            _ => {}
        }
    }

    /// Resolves a category entered by name or id to a category id.
    fn resolve_category(&self, input: &str) -> String {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(input))
            .map(|c| c.id.clone())
            .unwrap_or_else(|| input.to_string())
    }

    /// Handles input for the "Add" wizard.
    fn handle_adding_input(&mut self) {
        match self.view_mode {
            ViewMode::Tasks => match self.add_state.step {
                0 => {
                    // Title
                    if !self.input_buffer.is_empty() {
                        self.add_state.title = self.input_buffer.clone();
                        self.add_state.step += 1;
                        self.input_buffer.clear();
                    }
                }
                1 => {
                    // Description
                    if !self.input_buffer.is_empty() {
                        self.add_state.description = Some(self.input_buffer.clone());
                    }
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
                2 => {
                    // Due date
                    if !self.input_buffer.is_empty() {
                        match NaiveDate::parse_from_str(&self.input_buffer, "%Y-%m-%d") {
                            Ok(date) => self.add_state.due = Some(date),
                            Err(_) => {
                                self.status_message =
                                    Some("Invalid due date, use YYYY-MM-DD".into());
                                return;
                            }
                        }
                    }
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
                3 => {
                    // Priority
                    if !self.input_buffer.is_empty() {
                        match Priority::parse(&self.input_buffer) {
                            Some(priority) => self.add_state.priority = priority,
                            None => {
                                self.status_message =
                                    Some("Unknown priority (low, medium, high)".into());
                                return;
                            }
                        }
                    }
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
                4 => {
                    // Category
                    if !self.input_buffer.is_empty() {
                        let id = self.resolve_category(&self.input_buffer);
                        self.add_state.category = Some(id);
                    }
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
                5 => {
                    // Recurrence, then submit
                    if !self.input_buffer.is_empty() {
                        match RecurringFrequency::parse(&self.input_buffer) {
                            Some(freq) => self.add_state.recur = Some(freq),
                            None => {
                                self.status_message =
                                    Some("Unknown recurrence (daily, weekly, monthly)".into());
                                return;
                            }
                        }
                    }
                    let draft = TaskDraft {
                        title: self.add_state.title.clone(),
                        description: self.add_state.description.clone(),
                        due_date: self.add_state.due,
                        due_time: self.add_state.time,
                        priority: self.add_state.priority,
                        category_id: self.add_state.category.clone(),
                        is_recurring: self.add_state.recur.is_some(),
                        recurring_frequency: self.add_state.recur,
                        reminder_enabled: false,
                    };
                    match self.rt.block_on(self.repo.create(draft)) {
                        Ok(task) => {
                            self.status_message = Some(format!("Task {} added", task.id))
                        }
                        Err(e) => self.status_message = Some(format!("Failed to add task: {e}")),
                    }
                    self.input_mode = InputMode::Normal;
                    self.input_buffer.clear();
                    self.refresh_view();
                }
                _ => {}
            },
            ViewMode::Categories => match self.add_state.step {
                0 => {
                    // Name
                    if !self.input_buffer.is_empty() {
                        self.add_state.title = self.input_buffer.clone();
                        self.add_state.step += 1;
                        self.input_buffer.clear();
                    }
                }
                1 => {
                    // Color, then submit
                    let color = if self.input_buffer.is_empty() {
                        "#6366f1".to_string()
                    } else {
                        self.input_buffer.clone()
                    };
                    let name = self.add_state.title.clone();
                    match self.repo.add_category(&name, &color) {
                        Ok(category) => {
                            self.status_message =
                                Some(format!("Category '{}' added", category.name))
                        }
                        Err(e) => {
                            self.status_message = Some(format!("Failed to add category: {e}"))
                        }
                    }
                    self.input_mode = InputMode::Normal;
                    self.input_buffer.clear();
                    self.refresh_view();
                }
                _ => {}
            },
        }
    }

    /// Handles input for the "Edit" mode.
    fn handle_editing_input(&mut self) {
        let Some(id) = self.target_id else {
            return;
        };
        let mut patch = TaskPatch::default();
        match self.input_field {
            InputField::Title => {
                if self.input_buffer.is_empty() {
                    self.status_message = Some("Title cannot be empty".into());
                    return;
                }
                patch.title = Some(self.input_buffer.clone());
            }
            InputField::Description => patch.description = Some(self.input_buffer.clone()),
            InputField::Due => match NaiveDate::parse_from_str(&self.input_buffer, "%Y-%m-%d") {
                Ok(date) => patch.due_date = Some(date),
                Err(_) => {
                    self.status_message = Some("Invalid due date, use YYYY-MM-DD".into());
                    return;
                }
            },
            InputField::DueTime => match NaiveTime::parse_from_str(&self.input_buffer, "%H:%M") {
                Ok(time) => patch.due_time = Some(time),
                Err(_) => {
                    self.status_message = Some("Invalid time, use HH:MM".into());
                    return;
                }
            },
            InputField::Priority => match Priority::parse(&self.input_buffer) {
                Some(priority) => patch.priority = Some(priority),
                None => {
                    self.status_message = Some("Unknown priority (low, medium, high)".into());
                    return;
                }
            },
            InputField::Category => {
                if !self.input_buffer.is_empty() {
                    patch.category_id = Some(self.resolve_category(&self.input_buffer));
                }
            }
            InputField::Recur => match RecurringFrequency::parse(&self.input_buffer) {
                Some(freq) => {
                    patch.is_recurring = Some(true);
                    patch.recurring_frequency = Some(freq);
                }
                None => {
                    self.status_message = Some("Unknown recurrence (daily, weekly, monthly)".into());
                    return;
                }
            },
            InputField::None => {}
        }

        match self.rt.block_on(self.repo.update(id, patch)) {
            Ok(Some(_)) => self.status_message = Some(format!("Task {} updated", id)),
            Ok(None) => self.status_message = Some(format!("Task {} not found", id)),
            Err(e) => self.status_message = Some(format!("Failed to update task: {e}")),
        }
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.refresh_view();
    }
}
