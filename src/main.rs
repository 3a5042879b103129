//! # TaskFlow
//!
//! A terminal client for the TaskFlow task-management backend. TaskFlow combines a fast CLI for quick entry with a rich TUI (Terminal User Interface) for interactive management.
//!
//! ## Features
//!
//! *   **Backend-synced**: Tasks live on the TaskFlow REST API; every command authenticates with your stored bearer token and refreshes it transparently when it expires.
//! *   **Dual Interface**:
//!     *   **CLI**: Scriptable and quick for single commands.
//!     *   **TUI**: Interactive dashboard to manage tasks visually.
//! *   **Filtering & Sorting**: Search by title, narrow by priority, category or status, and sort by creation date, due date, priority or title.
//! *   **Recurrence**: Daily, weekly, and monthly recurring tasks; completing one schedules the next occurrence.
//! *   **Categories**: Local categories for grouping tasks until the backend grows its own.
//!
//! ## Usage
//!
//! ### Accounts
//!
//! ```bash
//! taskflow signup --email you@example.com --password secret1 --confirm secret1
//! taskflow login --email you@example.com --password secret1
//! taskflow logout
//! ```
//!
//! ### Interactive Mode (TUI)
//!
//! Simply run the command without arguments to launch the interactive UI:
//!
//! ```bash
//! taskflow
//! # or explicitly
//! taskflow ui
//! ```
//!
//! #### TUI Key Bindings
//!
//! **Global**
//! *   `q`: Quit
//!
//! **Task View**
//! *   `a`: Add new task
//! *   `Space`: Toggle Done on the selected task
//! *   `d`: Delete selected task
//! *   `/`: Search by title
//! *   `c`: Cycle status filter (all / pending / completed)
//! *   `s`: Cycle sort key, `o`: Flip sort order
//! *   `n`: Edit title, `e`: Edit description, `t`: Edit due date, `h`: Edit due time
//! *   `p`: Edit priority, `g`: Edit category, `r`: Edit recurrence
//! *   `v`: Switch to Categories view
//!
//! **Category View**
//! *   `a`: Add new category
//! *   `d`: Delete selected category
//! *   `v`: Switch back to Tasks view
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! # Basic task
//! taskflow add "Write report" --priority high --due 2025-12-01
//!
//! # Recurring task with a reminder flag
//! taskflow add "Team standup" --recur daily --time 09:30 --reminder
//!
//! # List open tasks due soonest first
//! taskflow list --status pending --sort due --order asc
//!
//! # Complete / remove / inspect
//! taskflow complete <ID>
//! taskflow remove <ID>
//! taskflow show <ID>
//!
//! # Categories
//! taskflow category add Work --color '#7c3aed'
//! taskflow category list
//! ```
//!
//! ## Configuration
//!
//! *   `TASKFLOW_API_URL`: backend base URL (default `http://localhost:8000`).
//! *   `TASKFLOW_TOKEN_FILE`: where the bearer token is stored (default `~/.local/share/taskflow/token.json` on Linux).
//! *   `TASKFLOW_CATEGORIES_FILE`: where local categories are stored.
//! *   `RUST_LOG`: tracing filter for diagnostics, e.g. `RUST_LOG=taskflow=debug`.

mod auth;
mod categories;
mod chat;
mod client;
mod commands;
mod error;
mod filter;
mod models;
mod recurrence;
mod repo;
mod session;
mod tui;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

use categories::LocalCategoryStore;
use client::{ApiClient, ApiConfig};
use commands::*;
use repo::TaskRepository;
use session::Session;
use tui::run_tui;

#[derive(Parser)]
#[command(name = "taskflow")]
#[command(about = "Terminal client for the TaskFlow task manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the backend and store the session token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,
        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and log in
    Signup {
        /// Account email
        #[arg(short, long)]
        email: String,
        /// Account password (at least 6 characters)
        #[arg(short, long)]
        password: String,
        /// Password confirmation
        #[arg(short, long)]
        confirm: String,
    },
    /// Log out and forget the session token
    Logout,
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Longer description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// Due date in YYYY-MM-DD
        #[arg(short, long)]
        due: Option<String>,
        /// Due time of day in HH:MM
        #[arg(short, long)]
        time: Option<String>,
        /// Priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<String>,
        /// Category id
        #[arg(short, long)]
        category: Option<String>,
        /// Recurrence (daily, weekly, monthly)
        #[arg(short, long)]
        recur: Option<String>,
        /// Enable the reminder flag
        #[arg(long)]
        reminder: bool,
    },
    /// List tasks
    List {
        /// Status filter (all, pending, completed)
        #[arg(short, long)]
        status: Option<String>,
        /// Search in task titles
        #[arg(long)]
        search: Option<String>,
        /// Priority filter (low, medium, high)
        #[arg(short, long)]
        priority: Option<String>,
        /// Category filter (category id)
        #[arg(short, long)]
        category: Option<String>,
        /// Sort key (created, due, priority, title)
        #[arg(long)]
        sort: Option<String>,
        /// Sort order (asc, desc)
        #[arg(short, long)]
        order: Option<String>,
    },
    /// Toggle a task's completion state
    Complete {
        id: i64,
    },
    /// Remove a task
    Remove {
        id: i64,
    },
    /// Edit a task
    Edit {
        id: i64,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// New due date in YYYY-MM-DD
        #[arg(short, long)]
        due: Option<String>,
        /// New due time in HH:MM
        #[arg(long)]
        time: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<String>,
        /// New category id
        #[arg(short, long)]
        category: Option<String>,
        /// New recurrence
        #[arg(short, long)]
        recur: Option<String>,
        /// Enable or disable the reminder flag
        #[arg(long)]
        reminder: Option<bool>,
    },
    /// Show one task in detail
    Show {
        id: i64,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Talk to the TaskFlow assistant
    Chat,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// Add a new category
    Add {
        /// Category name
        name: String,
        /// Display color
        #[arg(short, long, default_value = "#6366f1")]
        color: String,
    },
    /// List categories
    List,
    /// Remove a category
    Remove {
        /// Category id
        id: String,
    },
}

fn make_client() -> ApiClient {
    let session = Session::load(session::default_token_path());
    ApiClient::new(ApiConfig::from_env(), session)
}

fn make_repo() -> TaskRepository {
    TaskRepository::new(make_client(), Box::new(LocalCategoryStore::open_default()))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            return;
        }
    };

    match cli.command {
        Some(Commands::Login { email, password }) => {
            rt.block_on(cmd_login(&mut make_client(), email, password))
        }
        Some(Commands::Signup {
            email,
            password,
            confirm,
        }) => rt.block_on(cmd_signup(&mut make_client(), email, password, confirm)),
        Some(Commands::Logout) => cmd_logout(&mut make_client()),
        Some(Commands::Add {
            title,
            description,
            due,
            time,
            priority,
            category,
            recur,
            reminder,
        }) => rt.block_on(cmd_add(
            &mut make_repo(),
            title,
            description,
            due,
            time,
            priority,
            category,
            recur,
            reminder,
            false,
        )),
        Some(Commands::List {
            status,
            search,
            priority,
            category,
            sort,
            order,
        }) => rt.block_on(cmd_list(
            &mut make_repo(),
            status,
            search,
            priority,
            category,
            sort,
            order,
        )),
        Some(Commands::Complete { id }) => rt.block_on(cmd_complete(&mut make_repo(), id, false)),
        Some(Commands::Remove { id }) => rt.block_on(cmd_remove(&mut make_repo(), id, false)),
        Some(Commands::Edit {
            id,
            title,
            description,
            due,
            time,
            priority,
            category,
            recur,
            reminder,
        }) => rt.block_on(cmd_edit(
            &mut make_repo(),
            id,
            title,
            description,
            due,
            time,
            priority,
            category,
            recur,
            reminder,
            false,
        )),
        Some(Commands::Show { id }) => rt.block_on(cmd_show(&mut make_repo(), id)),
        Some(Commands::Category { command }) => match command {
            CategoryCommands::Add { name, color } => {
                cmd_category_add(&mut make_repo(), name, color, false)
            }
            CategoryCommands::List => cmd_category_list(&make_repo()),
            CategoryCommands::Remove { id } => cmd_category_remove(&mut make_repo(), id, false),
        },
        Some(Commands::Chat) => cmd_chat(),
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "taskflow", &mut io::stdout());
        }
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(rt.handle().clone(), make_repo()) {
                eprintln!("Error running TUI: {}", e);
            }
        }
    }
}
