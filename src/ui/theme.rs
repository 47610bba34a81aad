//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::tracker::{Metric, TrackerHealth};

/// Usage at or above this percentage is shown as a warning.
const USAGE_WARNING: f64 = 70.0;
/// Usage at or above this percentage is shown as critical.
const USAGE_CRITICAL: f64 = 90.0;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for warning-level values.
    pub warning: Color,
    /// Color for critical values and degraded health.
    pub critical: Color,
    /// Color for healthy status.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Line colors for the four charts.
    pub cpu: Color,
    pub memory: Color,
    pub network: Color,
    pub disk: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            cpu: Color::LightRed,
            memory: Color::LightMagenta,
            network: Color::LightCyan,
            disk: Color::LightYellow,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            cpu: Color::Red,
            memory: Color::Magenta,
            network: Color::Blue,
            disk: Color::Rgb(160, 110, 0),
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Line color of a chart.
    pub fn metric_color(&self, metric: Metric) -> Color {
        match metric {
            Metric::Cpu => self.cpu,
            Metric::Memory => self.memory,
            Metric::Network => self.network,
            Metric::Disk => self.disk,
        }
    }

    /// Style for the sampling health indicator.
    pub fn health_style(&self, health: &TrackerHealth) -> Style {
        if health.degraded {
            Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
        } else if health.consecutive_failures > 0 {
            Style::default().fg(self.warning)
        } else {
            Style::default().fg(self.healthy)
        }
    }

    /// Style for a usage percentage (CPU, memory, disk fullness).
    pub fn usage_style(&self, percent: f64) -> Style {
        if percent >= USAGE_CRITICAL {
            Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
        } else if percent >= USAGE_WARNING {
            Style::default().fg(self.warning)
        } else {
            Style::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_health_is_critical() {
        let theme = Theme::dark();
        let health = TrackerHealth {
            consecutive_failures: 3,
            degraded: true,
            last_error: None,
        };
        assert_eq!(theme.health_style(&health).fg, Some(theme.critical));
        assert_eq!(
            theme.health_style(&TrackerHealth::default()).fg,
            Some(theme.healthy)
        );
    }

    #[test]
    fn usage_thresholds() {
        let theme = Theme::light();
        assert_eq!(theme.usage_style(50.0).fg, None);
        assert_eq!(theme.usage_style(75.0).fg, Some(theme.warning));
        assert_eq!(theme.usage_style(95.0).fg, Some(theme.critical));
    }
}
