use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::app::{App, InputField, InputMode, ViewMode};
use crate::models::Priority;

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(0),    // Table
                Constraint::Length(1), // Status line
                Constraint::Length(3), // Help
            ]
            .as_ref(),
        )
        .split(f.area());

    match app.view_mode {
        ViewMode::Tasks => {
            let today = Local::now().date_naive();

            let rows: Vec<Row> = app
                .visible
                .iter()
                .map(|t| {
                    let time_left_str = match t.due_date {
                        Some(due) => {
                            let days_left = (due - today).num_days();
                            if days_left < 0 {
                                format!("{}d overdue", days_left.abs())
                            } else if days_left == 0 {
                                "Today".to_string()
                            } else {
                                format!("{}d", days_left)
                            }
                        }
                        None => "-".to_string(),
                    };

                    let style = if t.completed {
                        Style::default().fg(Color::DarkGray)
                    } else {
                        match t.priority {
                            Priority::High => Style::default().fg(Color::Red),
                            Priority::Medium => Style::default().fg(Color::Yellow),
                            Priority::Low => Style::default().fg(Color::Green),
                        }
                    };

                    let category = t
                        .category_id
                        .as_ref()
                        .map(|id| {
                            app.categories
                                .iter()
                                .find(|c| &c.id == id)
                                .map(|c| c.name.clone())
                                .unwrap_or_else(|| id.clone())
                        })
                        .unwrap_or_default();

                    Row::new(vec![
                        Cell::from(t.id.to_string()),
                        Cell::from(t.title.clone()),
                        Cell::from(category),
                        Cell::from(t.priority.as_str()),
                        Cell::from(t.due_date.map(|d| d.to_string()).unwrap_or_default()),
                        Cell::from(time_left_str),
                        Cell::from(t.recurring_frequency.map(|r| r.as_str()).unwrap_or("")),
                        Cell::from(if t.completed { "Done" } else { "Pending" }),
                    ])
                    .style(style)
                })
                .collect();

            let widths = [
                Constraint::Length(4),
                Constraint::Min(20),
                Constraint::Length(12),
                Constraint::Length(8),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(8),
                Constraint::Length(8),
            ];

            let title = format!(
                "TaskFlow - Tasks (status: {}, sort: {} {}{})",
                app.filters.status.as_str(),
                app.filters.sort_by.as_str(),
                app.filters.sort_order.as_str(),
                if app.filters.search.is_empty() {
                    String::new()
                } else {
                    format!(", search: '{}'", app.filters.search)
                }
            );

            let table = Table::new(rows, widths)
                .header(
                    Row::new(vec![
                        "ID", "Title", "Category", "Priority", "Due", "Time Left", "Recur",
                        "Status",
                    ])
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .bottom_margin(1),
                )
                .block(Block::default().borders(Borders::ALL).title(title))
                .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
                .highlight_symbol(">> ");

            f.render_stateful_widget(table, chunks[0], &mut app.state);
        }
        ViewMode::Categories => {
            let rows: Vec<Row> = app
                .categories
                .iter()
                .map(|c| {
                    Row::new(vec![
                        Cell::from(c.id.clone()),
                        Cell::from(c.name.clone()),
                        Cell::from(c.color.clone()),
                    ])
                })
                .collect();

            let widths = [
                Constraint::Length(10),
                Constraint::Min(20),
                Constraint::Length(10),
            ];

            let table = Table::new(rows, widths)
                .header(
                    Row::new(vec!["ID", "Name", "Color"])
                        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                        .bottom_margin(1),
                )
                .block(Block::default().borders(Borders::ALL).title("TaskFlow - Categories"))
                .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
                .highlight_symbol(">> ");

            f.render_stateful_widget(table, chunks[0], &mut app.category_state);
        }
    }

    let status = Paragraph::new(app.status_message.clone().unwrap_or_default())
        .style(Style::default().fg(Color::Magenta));
    f.render_widget(status, chunks[1]);

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view_mode {
            ViewMode::Tasks => {
                "q: Quit | a: Add | Space: Done | d: Del | /: Search | c: Status | s: Sort | o: Order | n: Title | e: Desc | t: Due | h: Time | p: Prio | g: Cat | r: Recur | v: Categories"
            }
            ViewMode::Categories => "q: Quit | a: Add | d: Del | v: View Tasks",
        },
        InputMode::Searching => "Type to search | Enter: Keep | Esc: Clear",
        InputMode::Editing => "Enter: Save | Esc: Cancel",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    // Render Input Box if needed
    match app.input_mode {
        InputMode::Editing | InputMode::Adding => {
            let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
            f.render_widget(Clear, area); // Clear the area first

            let title = match app.input_mode {
                InputMode::Adding => match app.view_mode {
                    ViewMode::Tasks => match app.add_state.step {
                        0 => "Add Task: Enter Title",
                        1 => "Add Task: Enter Description (Optional)",
                        2 => "Add Task: Enter Due Date (YYYY-MM-DD, Optional)",
                        3 => "Add Task: Enter Priority (low/medium/high, Optional)",
                        4 => "Add Task: Enter Category (Optional)",
                        5 => "Add Task: Enter Recurrence (daily/weekly/monthly, Optional)",
                        _ => "Add Task",
                    },
                    ViewMode::Categories => match app.add_state.step {
                        0 => "Add Category: Enter Name",
                        1 => "Add Category: Enter Color (Optional)",
                        _ => "Add Category",
                    },
                },
                InputMode::Editing => match app.input_field {
                    InputField::Title => "Edit Title",
                    InputField::Description => "Edit Description",
                    InputField::Due => "Edit Due Date (YYYY-MM-DD)",
                    InputField::DueTime => "Edit Due Time (HH:MM)",
                    InputField::Priority => "Edit Priority (low/medium/high)",
                    InputField::Category => "Edit Category",
                    InputField::Recur => "Edit Recurrence (daily/weekly/monthly)",
                    _ => "Edit",
                },
                _ => "",
            };

            let input = Paragraph::new(app.input_buffer.as_str())
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL).title(title));

            f.render_widget(input, area);
        }
        _ => {}
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height - height) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height - height) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
