//! Overlay rendering.
//!
//! The process detail modal and the terminate confirmation dialog.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::format::{format_bytes, format_percent, format_timestamp};
use crate::source::ProcessDetail;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 14;

/// Render the process detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(ref detail) = app.detail else {
        return;
    };

    // Width: 90% of screen, clamped to [MIN_OVERLAY_WIDTH, 100]
    let overlay_width = (area.width * 90 / 100).clamp(MIN_OVERLAY_WIDTH, 100);
    let overlay_height = (area.height * 80 / 100).clamp(MIN_OVERLAY_HEIGHT, 24);
    let overlay_area = super::centered(area, overlay_width, overlay_height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Min(8),    // Facts
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    let block = Block::default()
        .title(format!(" Process {} ", detail.pid))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(detail_lines(app, detail))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, chunks[0]);

    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Esc:close  x:terminate ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[1]);
}

fn detail_lines<'a>(app: &App, detail: &'a ProcessDetail) -> Vec<Line<'a>> {
    let label = |text: &'static str| {
        Span::styled(format!(" {:<12}", text), Style::default().add_modifier(Modifier::DIM))
    };
    let unknown = || "-".to_string();

    let command_line = if detail.command_line.is_empty() {
        unknown()
    } else {
        detail.command_line.join(" ")
    };

    vec![
        Line::from(vec![Span::styled(
            format!(" {} ", detail.name),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![label("Status"), Span::raw(detail.status.label())]),
        Line::from(vec![
            label("CPU"),
            Span::styled(
                format_percent(detail.cpu_percent),
                app.theme.usage_style(detail.cpu_percent),
            ),
            Span::raw("   "),
            label("Memory"),
            Span::styled(
                format_percent(detail.memory_percent),
                app.theme.usage_style(detail.memory_percent),
            ),
        ]),
        Line::from(vec![
            label("Resident"),
            Span::raw(format_bytes(detail.resident_bytes)),
            Span::raw("   "),
            label("Virtual"),
            Span::raw(format_bytes(detail.virtual_bytes)),
        ]),
        Line::from(vec![
            label("Started"),
            Span::raw(format_timestamp(detail.start_time)),
            Span::raw("   "),
            label("Threads"),
            Span::raw(detail.threads.map(|n| n.to_string()).unwrap_or_else(unknown)),
        ]),
        Line::from(vec![
            label("Executable"),
            Span::raw(detail.exe.clone().unwrap_or_else(unknown)),
        ]),
        Line::from(vec![
            label("Directory"),
            Span::raw(detail.cwd.clone().unwrap_or_else(unknown)),
        ]),
        Line::from(vec![label("Command"), Span::raw(command_line)]),
    ]
}

/// Render the yes/no dialog for a pending terminate.
pub fn render_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref pending) = app.pending_terminate else {
        return;
    };

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw(" Terminate "),
            Span::styled(
                pending.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" (pid {})?", pending.pid)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(" y", Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD)),
            Span::raw(":yes  "),
            Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("/Esc:no"),
        ]),
    ];

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.critical));

    let dialog_area = super::centered(area, 44, 6);
    frame.render_widget(Clear, dialog_area);
    frame.render_widget(Paragraph::new(lines).block(block), dialog_area);
}
