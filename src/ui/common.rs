//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_duration;
use crate::data::format::format_percent;
use crate::data::rate::format_rate;
use crate::tracker::sampler::since_last_success;
use crate::tracker::MetricsView;

/// Render the header bar with the current values and sampling health.
///
/// Displays: health indicator, CPU, memory, network and disk rates.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.metrics;
    let current = &view.current;
    let health = &view.health;

    let status_style = app.theme.health_style(health);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled(" ● ", status_style),
        Span::styled("SYSDASH ", bold),
    ];

    if view.seq == 0 {
        spans.push(Span::raw("│ Waiting for first sample..."));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        return;
    }

    let disk = if current.throughput.disk_available {
        format_rate(current.throughput.disk_total())
    } else {
        "n/a".to_string()
    };

    spans.extend([
        Span::raw("│ CPU "),
        Span::styled(
            format_percent(current.cpu_percent),
            app.theme.usage_style(current.cpu_percent),
        ),
        Span::raw(" │ MEM "),
        Span::styled(
            format_percent(current.memory_percent),
            app.theme.usage_style(current.memory_percent),
        ),
        Span::raw(" │ NET "),
        Span::raw(format!(
            "↑{} ↓{}",
            format_rate(current.throughput.net_sent),
            format_rate(current.throughput.net_recv)
        )),
        Span::raw(" │ DISK "),
        Span::raw(disk),
    ]);

    if health.degraded {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled("DEGRADED", status_style));
    }
    if app.is_paused() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            "PAUSED",
            Style::default().fg(app.theme.warning).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Overview "),
        Line::from(" 2:Cores "),
        Line::from(" 3:System "),
        Line::from(" 4:Processes "),
    ];

    let selected = match app.current_view {
        View::Overview => 0,
        View::Cores => 1,
        View::System => 2,
        View::Processes => 3,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: current view, source, time since the last sample, available
/// controls. Temporary messages and source errors take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let health = &app.metrics.health;
    if health.degraded {
        let err = health.last_error.as_deref().unwrap_or("unknown error");
        let paragraph = Paragraph::new(format!(
            " Source failing ({} in a row): {} | q:quit",
            health.consecutive_failures, err
        ))
        .style(app.theme.health_style(health));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Processes if app.filter_active => "Type to search | Enter:apply Esc:cancel",
        View::Processes => "/:search s:sort Enter:detail x:kill p:pause ?:help q:quit",
        View::System => "r:refresh Tab:switch p:pause ?:help q:quit",
        View::Overview | View::Cores => "Tab:switch p:pause e:export ?:help q:quit",
    };

    let updated = sample_age(&app.metrics);

    let status = format!(
        " {} | {} | {} | {}",
        app.current_view.label(),
        app.source_description(),
        updated,
        controls,
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Sequence number and age of the last successful sample.
pub fn sample_age(view: &MetricsView) -> String {
    match since_last_success(view) {
        Some(elapsed) => format!("#{} {} ago", view.seq, format_duration(elapsed)),
        None => "no samples".to_string(),
    }
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab/1-4     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Processes"),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from("  Enter     Process detail"),
        Line::from("  x         Terminate process"),
        Line::from(""),
        section(" General"),
        Line::from("  p         Pause/resume sampling"),
        Line::from("  r         Refresh system info"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);
    let help_area = super::centered(area, 42, 27);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
