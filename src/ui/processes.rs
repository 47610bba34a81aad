//! Processes view rendering.
//!
//! Displays the process table, filtered by name, sorted by the chosen
//! column and cut to the configured number of rows.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::format::{format_bytes, format_percent};
use crate::data::ProcessSortColumn;
use crate::source::ProcessStatus;

/// Render the Processes view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let processes = app.visible_processes();

    let header = Row::new(vec![
        Cell::from(format_header("PID", ProcessSortColumn::Pid, app)),
        Cell::from(format_header("Name", ProcessSortColumn::Name, app)),
        Cell::from(format_header("CPU%", ProcessSortColumn::Cpu, app)),
        Cell::from(format_header("MEM%", ProcessSortColumn::Memory, app)),
        Cell::from(format_header("Memory", ProcessSortColumn::Memory, app)),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = processes
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(p.pid.to_string()),
                Cell::from(p.name.clone()),
                Cell::from(format_percent(p.cpu_percent))
                    .style(app.theme.usage_style(p.cpu_percent)),
                Cell::from(format_percent(p.memory_percent))
                    .style(app.theme.usage_style(p.memory_percent)),
                Cell::from(format_bytes(p.memory_bytes)),
                Cell::from(p.status.label()).style(status_style(app, p.status)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(8),
        Constraint::Fill(3),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(9),
    ];

    let selected_visual_index = app.selected_process_index.min(processes.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    // Build title with filter info
    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    // Show scroll position if there are items
    let position_info = if !processes.is_empty() {
        format!(" [{}/{}]", selected_visual_index + 1, processes.len())
    } else {
        String::new()
    };

    let title = format!(
        " Processes ({}/{}) [s:sort {}{}]{}{} ",
        processes.len(),
        app.processes.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !processes.is_empty() {
        state.select(Some(selected_visual_index));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, col: ProcessSortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

fn status_style(app: &App, status: ProcessStatus) -> Style {
    match status {
        ProcessStatus::Running => Style::default().fg(app.theme.healthy),
        ProcessStatus::Zombie | ProcessStatus::Dead => Style::default().fg(app.theme.critical),
        ProcessStatus::Stopped => Style::default().fg(app.theme.warning),
        _ => Style::default(),
    }
}
