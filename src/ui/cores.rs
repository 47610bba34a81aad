//! Per-core CPU rendering.
//!
//! One row per logical core: its current utilisation and a sparkline of
//! its recent history, newest reading at the right edge.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Sparkline},
    Frame,
};

use crate::app::App;
use crate::data::format::format_percent;
use crate::data::RollingHistory;

/// Width of the "cpu12  100.0% " label column.
const LABEL_WIDTH: u16 = 15;

/// Render the Cores view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let total = app.cores.len();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
        .title(cores_title(total, area.height.saturating_sub(2) as usize));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if total == 0 {
        frame.render_widget(Paragraph::new(" Waiting for per-core readings..."), inner);
        return;
    }

    let shown = total.min(inner.height as usize);
    let rows = Layout::vertical(vec![Constraint::Length(1); shown]).split(inner);

    for (index, (history, row)) in app.cores.iter().zip(rows.iter()).enumerate() {
        let columns =
            Layout::horizontal([Constraint::Length(LABEL_WIDTH), Constraint::Min(1)]).split(*row);
        let current = history.latest().copied().unwrap_or(0.0);

        let label = Line::from(vec![
            Span::styled(format!(" cpu{:<3}", index), app.theme.header),
            Span::styled(format!("{:>7} ", format_percent(current)), app.theme.usage_style(current)),
        ]);
        frame.render_widget(Paragraph::new(label), columns[0]);

        let data = sparkline_data(history, columns[1].width as usize);
        let sparkline = Sparkline::default()
            .data(&data)
            .max(100)
            .style(app.theme.usage_style(current));
        frame.render_widget(sparkline, columns[1]);
    }
}

/// Block title, noting when the terminal is too short for every core.
pub fn cores_title(total: usize, rows: usize) -> String {
    if total > rows && rows > 0 {
        format!(" Cores (showing {} of {}) ", rows, total)
    } else {
        format!(" Cores ({}) ", total)
    }
}

/// The newest `width` readings as whole percents, oldest first.
///
/// The sparkline draws from its first value, so the tail is kept.
pub fn sparkline_data(history: &RollingHistory<f64>, width: usize) -> Vec<u64> {
    let skip = history.len().saturating_sub(width);
    history
        .iter()
        .skip(skip)
        .map(|value| value.round().clamp(0.0, 100.0) as u64)
        .collect()
}
