//! Overview rendering.
//!
//! Four line charts (CPU %, memory %, network MB/s, disk MB/s) drawn from
//! the tracker histories, plus a line of quick stats.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::format::{format_bytes, format_percent, format_uptime};
use crate::data::rate::format_rate;
use crate::data::RollingHistory;
use crate::tracker::Metric;

/// Smallest y-axis ceiling for rate charts, so idle links stay flat.
const MIN_RATE_CEILING: f64 = 0.1;

/// Render the Overview: a 2x2 grid of charts and a stats line.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Min(6), Constraint::Length(3)]).split(area);

    let rows = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);
    let top = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    render_chart(frame, app, Metric::Cpu, top[0]);
    render_chart(frame, app, Metric::Memory, top[1]);
    render_chart(frame, app, Metric::Network, bottom[0]);
    render_chart(frame, app, Metric::Disk, bottom[1]);

    render_stats(frame, app, chunks[1]);
}

/// Chart points, right-aligned so the newest sample sits at the right edge.
pub fn chart_points(history: &RollingHistory<f64>) -> Vec<(f64, f64)> {
    let offset = history.capacity() - history.len();
    history
        .iter()
        .enumerate()
        .map(|(i, value)| ((offset + i) as f64, *value))
        .collect()
}

/// Upper y bound for a metric's chart.
pub fn y_ceiling(metric: Metric, history: &RollingHistory<f64>) -> f64 {
    match metric {
        Metric::Cpu | Metric::Memory => 100.0,
        Metric::Network | Metric::Disk => (history.max() * 1.2).max(MIN_RATE_CEILING),
    }
}

fn format_value(metric: Metric, value: f64) -> String {
    match metric {
        Metric::Cpu | Metric::Memory => format_percent(value),
        Metric::Network | Metric::Disk => format_rate(value),
    }
}

fn render_chart(frame: &mut Frame, app: &App, metric: Metric, area: Rect) {
    let view = &app.metrics;
    let history = view.history.get(metric);
    let points = chart_points(history);
    let color = app.theme.metric_color(metric);

    let current = if metric == Metric::Disk && !view.current.throughput.disk_available {
        "n/a".to_string()
    } else {
        format_value(metric, view.current.get(metric))
    };

    let ceiling = y_ceiling(metric, history);
    let x_max = history.capacity().saturating_sub(1).max(1) as f64;

    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let title = Line::from(vec![
        Span::raw(format!(" {} ", metric.label())),
        Span::styled(
            format!("{} ", current),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ]);

    let y_labels = vec![
        Span::raw("0"),
        Span::raw(match metric {
            Metric::Cpu | Metric::Memory => "100%".to_string(),
            _ => format_rate(ceiling),
        }),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .style(Style::default().fg(app.theme.border)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, ceiling])
                .labels(y_labels)
                .style(Style::default().fg(app.theme.border)),
        );

    frame.render_widget(chart, area);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let mut spans = Vec::new();

    match app.partitions.iter().find(|p| p.mount_path == "/") {
        Some(root) => {
            let used = root.used_percent();
            spans.push(Span::raw(" Root "));
            spans.push(Span::styled(format_percent(used), app.theme.usage_style(used)));
            spans.push(Span::styled(
                format!(
                    " ({} of {})",
                    format_bytes(root.used_bytes),
                    format_bytes(root.total_bytes)
                ),
                dim,
            ));
        }
        None => spans.push(Span::styled(" Root partition not found", dim)),
    }

    if let Some(ref info) = app.static_info {
        spans.push(Span::raw("  │  Uptime "));
        spans.push(Span::raw(format_uptime(info.uptime)));
        spans.push(Span::raw("  │  Swap "));
        spans.push(Span::raw(format!(
            "{} / {}",
            format_bytes(info.used_swap),
            format_bytes(info.total_swap)
        )));
    }

    let view = &app.metrics;
    spans.push(Span::raw("  │  History "));
    spans.push(Span::raw(format!(
        "{}/{}",
        view.history.cpu.len(),
        view.history.cpu.capacity()
    )));

    let block = Block::default()
        .title(" Quick Stats ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_are_right_aligned() {
        let mut history = RollingHistory::new(5);
        history.push(1.0);
        history.push(2.0);
        assert_eq!(chart_points(&history), vec![(3.0, 1.0), (4.0, 2.0)]);
    }

    #[test]
    fn rate_ceiling_has_headroom_and_floor() {
        let mut history = RollingHistory::new(5);
        assert_eq!(y_ceiling(Metric::Network, &history), MIN_RATE_CEILING);
        history.push(10.0);
        assert!((y_ceiling(Metric::Disk, &history) - 12.0).abs() < 1e-9);
        assert_eq!(y_ceiling(Metric::Cpu, &history), 100.0);
    }
}
