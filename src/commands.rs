use std::io::{self, BufRead, Write};

use chrono::{Local, NaiveDate, NaiveTime};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::auth::{validate_login, validate_signup};
use crate::chat;
use crate::client::ApiClient;
use crate::filter::{SortKey, SortOrder, StatusFilter, TaskFilters};
use crate::models::{Priority, RecurringFrequency, Task, TaskDraft, TaskPatch};
use crate::repo::TaskRepository;

/// Logs in and persists the bearer token. Credentials are validated before
/// anything is sent.
pub async fn cmd_login(client: &mut ApiClient, email: String, password: String) {
    if let Err(e) = validate_login(&email, &password) {
        eprintln!("{e}");
        return;
    }
    match client.login(&email, &password).await {
        Ok(()) => println!("Logged in as {email}."),
        Err(e) => eprintln!("Login failed: {e}"),
    }
}

/// Creates an account and persists the bearer token the backend returns.
pub async fn cmd_signup(client: &mut ApiClient, email: String, password: String, confirm: String) {
    if let Err(e) = validate_signup(&email, &password, &confirm) {
        eprintln!("{e}");
        return;
    }
    match client.signup(&email, &password).await {
        Ok(()) => println!("Account created. Logged in as {email}."),
        Err(e) => eprintln!("Signup failed: {e}"),
    }
}

/// Ends the session by deleting the stored token.
pub fn cmd_logout(client: &mut ApiClient) {
    match client.logout() {
        Ok(()) => println!("Logged out."),
        Err(e) => eprintln!("Failed to clear session: {e}"),
    }
}

/// Adds a new task.
#[allow(clippy::too_many_arguments)]
pub async fn cmd_add(
    repo: &mut TaskRepository,
    title: String,
    description: Option<String>,
    due: Option<String>,
    time: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    recur: Option<String>,
    reminder: bool,
    silent: bool,
) {
    let due_date = match due {
        Some(d) => match NaiveDate::parse_from_str(&d, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(e) => {
                if !silent {
                    eprintln!("Invalid due date '{}': {}. Use YYYY-MM-DD.", d, e);
                }
                return;
            }
        },
        None => None,
    };
    let due_time = match time {
        Some(t) => match NaiveTime::parse_from_str(&t, "%H:%M") {
            Ok(time) => Some(time),
            Err(e) => {
                if !silent {
                    eprintln!("Invalid due time '{}': {}. Use HH:MM.", t, e);
                }
                return;
            }
        },
        None => None,
    };
    let priority = match priority {
        Some(p) => match Priority::parse(&p) {
            Some(priority) => priority,
            None => {
                if !silent {
                    eprintln!("Unknown priority '{}'. Supported: low, medium, high.", p);
                }
                return;
            }
        },
        None => Priority::default(),
    };
    let recurring_frequency = match recur {
        Some(r) => match RecurringFrequency::parse(&r) {
            Some(freq) => Some(freq),
            None => {
                if !silent {
                    eprintln!(
                        "Unknown recurrence pattern '{}'. Supported: daily, weekly, monthly.",
                        r
                    );
                }
                return;
            }
        },
        None => None,
    };

    let draft = TaskDraft {
        title,
        description,
        due_date,
        due_time,
        priority,
        category_id: category,
        is_recurring: recurring_frequency.is_some(),
        recurring_frequency,
        reminder_enabled: reminder,
    };
    match repo.create(draft).await {
        Ok(task) => {
            if !silent {
                println!("Task added (id = {})", task.id);
            }
        }
        Err(e) => {
            if !silent {
                eprintln!("Failed to add task: {e}");
            }
        }
    }
}

/// Toggles a task's completion state by id.
///
/// Completing a recurring task also reports the next occurrence.
pub async fn cmd_complete(repo: &mut TaskRepository, id: i64, silent: bool) {
    if let Err(e) = repo.fetch_all().await {
        if !silent {
            eprintln!("Failed to fetch tasks: {e}");
        }
        return;
    }

    let was_recurring = repo
        .get(id)
        .map(|t| !t.completed && t.is_recurring && t.recurring_frequency.is_some())
        .unwrap_or(false);

    match repo.toggle_complete(id).await {
        Ok(Some(task)) => {
            if !silent {
                if task.completed {
                    println!("Task {} marked as complete.", id);
                } else {
                    println!("Task {} marked as pending.", id);
                }
                if was_recurring {
                    if let Some(next) = repo.tasks().first() {
                        if let Some(due) = next.due_date {
                            println!("Recurring task created due on {}", due);
                        }
                    }
                }
            }
        }
        Ok(None) => {
            if !silent {
                eprintln!("Task {} not found.", id);
            }
        }
        Err(e) => {
            if !silent {
                eprintln!("Failed to update task: {e}");
            }
        }
    }
}

/// Removes a task by id.
pub async fn cmd_remove(repo: &mut TaskRepository, id: i64, silent: bool) {
    if let Err(e) = repo.fetch_all().await {
        if !silent {
            eprintln!("Failed to fetch tasks: {e}");
        }
        return;
    }
    match repo.delete(id).await {
        Ok(true) => {
            if !silent {
                println!("Task {} removed.", id);
            }
        }
        Ok(false) => {
            if !silent {
                eprintln!("Task {} not found.", id);
            }
        }
        Err(e) => {
            if !silent {
                eprintln!("Failed to remove task: {e}");
            }
        }
    }
}

/// Edits an existing task's details.
#[allow(clippy::too_many_arguments)]
pub async fn cmd_edit(
    repo: &mut TaskRepository,
    id: i64,
    title: Option<String>,
    description: Option<String>,
    due: Option<String>,
    time: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    recur: Option<String>,
    reminder: Option<bool>,
    silent: bool,
) {
    let mut patch = TaskPatch {
        title,
        description,
        category_id: category,
        reminder_enabled: reminder,
        ..TaskPatch::default()
    };
    if let Some(d) = due {
        match NaiveDate::parse_from_str(&d, "%Y-%m-%d") {
            Ok(date) => patch.due_date = Some(date),
            Err(e) => {
                if !silent {
                    eprintln!("Invalid due date '{}': {}. Use YYYY-MM-DD.", d, e);
                }
                return;
            }
        }
    }
    if let Some(t) = time {
        match NaiveTime::parse_from_str(&t, "%H:%M") {
            Ok(parsed) => patch.due_time = Some(parsed),
            Err(e) => {
                if !silent {
                    eprintln!("Invalid due time '{}': {}. Use HH:MM.", t, e);
                }
                return;
            }
        }
    }
    if let Some(p) = priority {
        match Priority::parse(&p) {
            Some(parsed) => patch.priority = Some(parsed),
            None => {
                if !silent {
                    eprintln!("Unknown priority '{}'. Supported: low, medium, high.", p);
                }
                return;
            }
        }
    }
    if let Some(r) = recur {
        match RecurringFrequency::parse(&r) {
            Some(freq) => {
                patch.is_recurring = Some(true);
                patch.recurring_frequency = Some(freq);
            }
            None => {
                if !silent {
                    eprintln!(
                        "Unknown recurrence pattern '{}'. Supported: daily, weekly, monthly.",
                        r
                    );
                }
                return;
            }
        }
    }

    if let Err(e) = repo.fetch_all().await {
        if !silent {
            eprintln!("Failed to fetch tasks: {e}");
        }
        return;
    }
    match repo.update(id, patch).await {
        Ok(Some(_)) => {
            if !silent {
                println!("Task {} updated.", id);
            }
        }
        Ok(None) => {
            if !silent {
                eprintln!("Task {} not found.", id);
            }
        }
        Err(e) => {
            if !silent {
                eprintln!("Failed to update task: {e}");
            }
        }
    }
}

/// Prints one task in detail.
pub async fn cmd_show(repo: &mut TaskRepository, id: i64) {
    match repo.fetch_one(id).await {
        Ok(task) => print_task_detail(&task),
        Err(e) => eprintln!("Failed to fetch task {}: {}", id, e),
    }
}

fn print_task_detail(task: &Task) {
    println!("Task {}", task.id);
    println!("  Title:     {}", task.title);
    if let Some(description) = &task.description {
        println!("  Details:   {}", description);
    }
    println!(
        "  Status:    {}",
        if task.completed { "Done" } else { "Pending" }
    );
    if let Some(at) = task.completed_at {
        println!("  Done at:   {}", at);
    }
    if let Some(due) = task.due_date {
        println!("  Due:       {}", due);
    }
    if let Some(time) = task.due_time {
        println!("  Time:      {}", time.format("%H:%M"));
    }
    println!("  Priority:  {}", task.priority.as_str());
    if let Some(category) = &task.category_id {
        println!("  Category:  {}", category);
    }
    if let Some(freq) = task.recurring_frequency {
        println!("  Repeats:   {}", freq.as_str());
    }
    println!("  Created:   {}", task.created_at);
}

/// Lists tasks in a formatted table after applying the view filters.
pub async fn cmd_list(
    repo: &mut TaskRepository,
    status: Option<String>,
    search: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    sort: Option<String>,
    order: Option<String>,
) {
    let mut filters = TaskFilters::default();
    if let Some(s) = status {
        match StatusFilter::parse(&s) {
            Some(parsed) => filters.status = parsed,
            None => {
                eprintln!("Unknown status '{}'. Supported: all, pending, completed.", s);
                return;
            }
        }
    }
    if let Some(s) = search {
        filters.search = s;
    }
    if let Some(p) = priority {
        match Priority::parse(&p) {
            Some(parsed) => filters.priority = Some(parsed),
            None => {
                eprintln!("Unknown priority '{}'. Supported: low, medium, high.", p);
                return;
            }
        }
    }
    filters.category = category;
    if let Some(s) = sort {
        match SortKey::parse(&s) {
            Some(parsed) => filters.sort_by = parsed,
            None => {
                eprintln!("Unknown sort key '{}'. Supported: created, due, priority, title.", s);
                return;
            }
        }
    }
    if let Some(o) = order {
        match SortOrder::parse(&o) {
            Some(parsed) => filters.sort_order = parsed,
            None => {
                eprintln!("Unknown sort order '{}'. Supported: asc, desc.", o);
                return;
            }
        }
    }

    if let Err(e) = repo.fetch_all().await {
        eprintln!("Failed to fetch tasks: {e}");
        return;
    }
    let tasks = repo.filtered(&filters);
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let category_names: Vec<(String, String)> = repo
        .categories()
        .unwrap_or_default()
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let category_name = |id: &Option<String>| -> String {
        let Some(id) = id else { return String::new() };
        category_names
            .iter()
            .find(|(cid, _)| cid == id)
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| id.clone())
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Time Left").add_attribute(Attribute::Bold),
            Cell::new("Recur").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    let today = Local::now().date_naive();

    for t in tasks {
        let (time_left_str, overdue) = match t.due_date {
            Some(due) => {
                let days_left = (due - today).num_days();
                if days_left < 0 {
                    (format!("{}d overdue", days_left.abs()), !t.completed)
                } else if days_left == 0 {
                    ("Today".to_string(), false)
                } else {
                    (format!("{}d", days_left), false)
                }
            }
            None => ("-".to_string(), false),
        };

        let priority_color = match t.priority {
            Priority::High => Color::Red,
            Priority::Medium => Color::Yellow,
            Priority::Low => Color::Green,
        };
        let status = if t.completed { "Done" } else { "Pending" };
        let status_color = if t.completed { Color::Green } else { Color::Yellow };

        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.title),
            Cell::new(category_name(&t.category_id)),
            Cell::new(t.priority.as_str()).fg(priority_color),
            Cell::new(t.due_date.map(|d| d.to_string()).unwrap_or_default()),
            Cell::new(time_left_str).fg(if overdue { Color::Red } else { Color::Reset }),
            Cell::new(t.recurring_frequency.map(|f| f.as_str()).unwrap_or("")),
            Cell::new(status).fg(status_color),
        ]);
    }

    println!("{table}");
}

/// Adds a new category.
pub fn cmd_category_add(repo: &mut TaskRepository, name: String, color: String, silent: bool) {
    match repo.add_category(&name, &color) {
        Ok(category) => {
            if !silent {
                println!("Category '{}' added (id = {}).", category.name, category.id);
            }
        }
        Err(e) => {
            if !silent {
                eprintln!("Failed to add category: {e}");
            }
        }
    }
}

/// Lists all categories.
pub fn cmd_category_list(repo: &TaskRepository) {
    let categories = match repo.categories() {
        Ok(categories) => categories,
        Err(e) => {
            eprintln!("Failed to load categories: {e}");
            return;
        }
    };
    if categories.is_empty() {
        println!("No categories found.");
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Name", "Color"]);
    for c in categories {
        table.add_row(vec![c.id, c.name, c.color]);
    }
    println!("{table}");
}

/// Removes a category by id.
pub fn cmd_category_remove(repo: &mut TaskRepository, id: String, silent: bool) {
    match repo.remove_category(&id) {
        Ok(true) => {
            if !silent {
                println!("Category '{}' removed.", id);
            }
        }
        Ok(false) => {
            if !silent {
                eprintln!("Category '{}' not found.", id);
            }
        }
        Err(e) => {
            if !silent {
                eprintln!("Failed to remove category: {e}");
            }
        }
    }
}

/// Interactive chat with the (canned) assistant. Exits on EOF or 'quit'.
pub fn cmd_chat() {
    println!("{}", chat::WELCOME);
    println!("(type 'quit' to exit)");
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        println!("{}", chat::reply(line));
    }
}
