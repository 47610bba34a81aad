use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // A pending terminate swallows everything until answered
    if app.pending_terminate.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let _ = app.confirm_terminate();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
                app.cancel_terminate();
            }
            _ => {}
        }
        return;
    }

    // If detail overlay is shown, handle overlay-specific keys
    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            KeyCode::Char('x') => app.request_terminate(),
            _ => {}
        }
        return;
    }

    // If filter input is active, handle text input
    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        // Direct view access
        KeyCode::Char('1') => app.set_view(View::Overview),
        KeyCode::Char('2') => app.set_view(View::Cores),
        KeyCode::Char('3') => app.set_view(View::System),
        KeyCode::Char('4') => app.set_view(View::Processes),

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Process detail and control
        KeyCode::Enter => app.enter_detail(),
        KeyCode::Char('x') => app.request_terminate(),

        // Go back (Esc and Backspace)
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        // Refresh the one-shot queries
        KeyCode::Char('r') => {
            app.refresh_all();
            app.set_status_message("Refreshed".to_string());
        }

        // Pause/resume sampling
        KeyCode::Char('p') => app.toggle_pause(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Sorting (Processes view)
        KeyCode::Char('s') if app.current_view == View::Processes => app.cycle_sort(),
        KeyCode::Char('S') if app.current_view == View::Processes => {
            app.toggle_sort_direction()
        }

        // Filter (start typing to filter)
        KeyCode::Char('/') => {
            app.set_view(View::Processes);
            app.start_filter();
        }

        // Clear filter
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        // Export
        KeyCode::Char('e') => match app.export_state() {
            Ok(()) => {
                let message = format!("Exported to {}", app.export_path.display());
                app.set_status_message(message);
            }
            Err(e) => app.set_status_message(e.to_string()),
        },

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        // Confirm filter
        KeyCode::Enter => {
            app.filter_active = false;
        }

        // Cancel filter (keep text but exit input mode)
        KeyCode::Esc => {
            app.cancel_filter();
        }

        // Clear and exit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        // Backspace
        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        // Type characters
        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        // Scroll wheel
        MouseEventKind::ScrollUp => {
            app.select_prev();
        }
        MouseEventKind::ScrollDown => {
            app.select_next();
        }

        // Click to select
        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Check if clicking in the process table (after header, tabs, table header)
            if app.current_view == View::Processes && clicked_row > content_start_row {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                if item_row < app.visible_processes().len() {
                    app.selected_process_index = item_row;
                }
            }

            // Check for tab clicks (row 1, after header)
            if clicked_row == 1 {
                if let Some(view) = tab_at_column(mouse.column) {
                    app.set_view(view);
                }
            }
        }

        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => {
            app.go_back();
        }

        _ => {}
    }
}

/// The tab under a column of the tab bar.
///
/// Each title is padded by one space a side and followed by a divider.
pub fn tab_at_column(col: u16) -> Option<View> {
    match col {
        0..=14 => Some(View::Overview),
        15..=26 => Some(View::Cores),
        27..=39 => Some(View::System),
        40..=55 => Some(View::Processes),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::source::ScriptedSource;
    use crate::tracker::{Tracker, TrackerConfig};

    fn app() -> App {
        let tracker = Tracker::new(Box::new(ScriptedSource::demo()), TrackerConfig::default());
        let mut app = App::new(tracker, Box::new(ScriptedSource::demo()), &Settings::default());
        app.refresh_all();
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn number_keys_switch_views() {
        let mut app = app();
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.current_view, View::Processes);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.current_view, View::System);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.current_view, View::Cores);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_view, View::System);
    }

    #[test]
    fn tab_clicks_follow_title_widths() {
        assert_eq!(tab_at_column(0), Some(View::Overview));
        assert_eq!(tab_at_column(20), Some(View::Cores));
        assert_eq!(tab_at_column(30), Some(View::System));
        assert_eq!(tab_at_column(50), Some(View::Processes));
        assert_eq!(tab_at_column(70), None);
    }

    #[test]
    fn typing_filters_until_enter() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        assert!(app.filter_active);
        for c in "ssh".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert!(!app.filter_active);
        assert_eq!(app.filter_text, "ssh");

        // 'q' typed into the filter must not quit
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('c'));
        assert!(app.filter_text.is_empty());
    }

    #[test]
    fn terminate_flow_needs_y() {
        let mut app = app();
        press(&mut app, KeyCode::Char('4'));
        let count = app.processes.len();

        press(&mut app, KeyCode::Char('x'));
        assert!(app.pending_terminate.is_some());
        // q answers no instead of quitting
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        assert!(app.pending_terminate.is_none());
        assert_eq!(app.processes.len(), count);

        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.processes.len(), count - 1);
    }

    #[test]
    fn sort_keys_only_apply_to_processes() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.sort_column, crate::data::ProcessSortColumn::Cpu);

        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.sort_column, crate::data::ProcessSortColumn::Memory);
        assert!(!app.sort_ascending);
        press(&mut app, KeyCode::Char('S'));
        assert!(app.sort_ascending);
    }

    #[test]
    fn help_closes_on_any_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(app.running);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }
}
