pub mod app;
pub mod ui;

use std::{error::Error, io};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::runtime::Handle;

use crate::repo::TaskRepository;
use app::{App, InputField, InputMode};
use ui::ui;

pub fn run_tui(rt: Handle, repo: TaskRepository) -> Result<(), Box<dyn Error>> {
    if !repo.is_authenticated() {
        return Err("not logged in; run `taskflow login --email <email> --password <password>` first".into());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(rt, repo);

    // Run loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match app.input_mode {
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Char(' ') => app.toggle_complete_selected(),
                    KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                    KeyCode::Char('a') => app.start_add(),
                    KeyCode::Char('n') => app.start_edit(InputField::Title),
                    KeyCode::Char('e') => app.start_edit(InputField::Description),
                    KeyCode::Char('t') => app.start_edit(InputField::Due), // 't' for Time/Date
                    KeyCode::Char('h') => app.start_edit(InputField::DueTime),
                    KeyCode::Char('p') => app.start_edit(InputField::Priority),
                    KeyCode::Char('g') => app.start_edit(InputField::Category),
                    KeyCode::Char('r') => app.start_edit(InputField::Recur),
                    KeyCode::Char('c') => app.cycle_status_filter(),
                    KeyCode::Char('s') => app.cycle_sort_key(),
                    KeyCode::Char('o') => app.toggle_sort_order(),
                    KeyCode::Char('/') => app.start_search(),
                    KeyCode::Char('v') => app.toggle_view(),
                    KeyCode::Char('R') => app.refresh_remote(),
                    _ => {}
                },
                InputMode::Searching => match key.code {
                    KeyCode::Enter => {
                        app.input_mode = InputMode::Normal;
                    }
                    KeyCode::Esc => app.cancel_search(),
                    KeyCode::Char(c) => {
                        app.input_buffer.push(c);
                        app.apply_search();
                    }
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                        app.apply_search();
                    }
                    _ => {}
                },
                InputMode::Editing | InputMode::Adding => match key.code {
                    KeyCode::Enter => app.handle_input(),
                    KeyCode::Esc => {
                        app.input_mode = InputMode::Normal;
                        app.input_buffer.clear();
                    }
                    KeyCode::Char(c) => {
                        app.input_buffer.push(c);
                    }
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                    }
                    _ => {}
                },
            }
        }
    }
}
