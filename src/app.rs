//! Application state and navigation logic.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::Settings;
use crate::data::process::{self, ProcessSortColumn};
use crate::data::RollingHistory;
use crate::error::ActionError;
use crate::export;
use crate::source::{
    MetricsSource, NetworkInterface, Partition, ProcessDetail, ProcessInfo, StaticInfo,
};
use crate::tracker::{MetricsView, Tracker, TrackerState};
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Process detail and the terminate confirmation are overlays, not views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Live charts of CPU, memory, network and disk.
    Overview,
    /// Utilisation of each logical core.
    Cores,
    /// Host facts, partitions and network interfaces.
    System,
    /// Sortable, filterable process table.
    Processes,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Overview => View::Cores,
            View::Cores => View::System,
            View::System => View::Processes,
            View::Processes => View::Overview,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Overview => View::Processes,
            View::Cores => View::Overview,
            View::System => View::Cores,
            View::Processes => View::System,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Cores => "Cores",
            View::System => "System",
            View::Processes => "Processes",
        }
    }
}

/// A terminate request waiting for the user to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTerminate {
    pub pid: u32,
    pub name: String,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Tracker output, pulled from the watch channel
    tracker: Tracker,
    views: watch::Receiver<Arc<MetricsView>>,
    pub metrics: Arc<MetricsView>,

    // One-shot queries
    source: Box<dyn MetricsSource>,
    pub static_info: Option<StaticInfo>,
    pub partitions: Vec<Partition>,
    pub interfaces: Vec<NetworkInterface>,
    /// One history per logical core, filled on every tick.
    pub cores: Vec<RollingHistory<f64>>,
    core_capacity: usize,
    pub processes: Vec<ProcessInfo>,
    pub detail: Option<ProcessDetail>,
    pub pending_terminate: Option<PendingTerminate>,
    pub load_error: Option<String>,
    pub process_limit: usize,

    // Navigation state
    pub selected_process_index: usize,

    // Sorting (Processes view)
    pub sort_column: ProcessSortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,
    pub export_path: PathBuf,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App around a tracker and a source for one-shot queries.
    ///
    /// The tracker is not started here; see [`App::resume`]. The theme
    /// defaults to dark; callers with a terminal can use
    /// [`Theme::auto_detect`].
    pub fn new(tracker: Tracker, source: Box<dyn MetricsSource>, settings: &Settings) -> Self {
        let views = tracker.subscribe();
        let metrics = tracker.latest();
        let sort_column = ProcessSortColumn::default();

        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            show_detail_overlay: false,
            tracker,
            views,
            metrics,
            source,
            static_info: None,
            partitions: Vec::new(),
            interfaces: Vec::new(),
            cores: Vec::new(),
            core_capacity: settings.history_capacity,
            processes: Vec::new(),
            detail: None,
            pending_terminate: None,
            load_error: None,
            process_limit: settings.process_limit,
            selected_process_index: 0,
            sort_column,
            sort_ascending: sort_column.default_ascending(),
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::dark(),
            export_path: PathBuf::from(export::DEFAULT_EXPORT_PATH),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Pull the latest published view, if a new one arrived.
    ///
    /// Returns true when the view changed.
    pub fn poll_metrics(&mut self) -> bool {
        match self.views.has_changed() {
            Ok(true) => {
                self.metrics = Arc::clone(&self.views.borrow_and_update());
                true
            }
            _ => false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.tracker.state() == TrackerState::Idle
    }

    /// Start (or restart) sampling.
    pub fn resume(&mut self) {
        self.tracker.start();
    }

    /// Pause or resume the sampling loop.
    pub fn toggle_pause(&mut self) {
        if self.is_paused() {
            self.tracker.start();
            self.set_status_message("Sampling resumed".to_string());
        } else {
            self.tracker.stop();
            self.set_status_message("Sampling paused".to_string());
        }
    }

    /// Stop sampling and wait, bounded, for the task to exit.
    pub async fn shutdown(&mut self, timeout: Duration) -> bool {
        self.tracker.shutdown(timeout).await
    }

    /// Re-query static info, partitions and interfaces.
    pub fn refresh_system(&mut self) {
        match self.source.static_info() {
            Ok(info) => {
                self.static_info = Some(info);
                self.load_error = None;
            }
            Err(e) => {
                warn!(error = %e, "Static info query failed");
                self.load_error = Some(e.to_string());
            }
        }

        // Partitions and interfaces are best-effort; keep the last good list.
        match self.source.partitions() {
            Ok(partitions) => self.partitions = partitions,
            Err(e) => warn!(error = %e, "Partition query failed"),
        }
        match self.source.interfaces() {
            Ok(interfaces) => self.interfaces = interfaces,
            Err(e) => warn!(error = %e, "Interface query failed"),
        }
    }

    /// Re-query the process table and clamp the selection.
    pub fn refresh_processes(&mut self) {
        match self.source.processes() {
            Ok(processes) => {
                self.processes = processes;
                let count = self.visible_processes().len();
                if self.selected_process_index >= count {
                    self.selected_process_index = count.saturating_sub(1);
                }
            }
            Err(e) => {
                warn!(error = %e, "Process query failed");
                self.set_status_message(format!("Process list unavailable: {}", e));
            }
        }
    }

    /// Append one per-core reading to the core histories.
    ///
    /// A change in core count (CPU hotplug) starts the histories over.
    pub fn refresh_cores(&mut self) {
        match self.source.cpu_cores() {
            Ok(readings) => {
                if readings.len() != self.cores.len() {
                    self.cores = (0..readings.len())
                        .map(|_| RollingHistory::new(self.core_capacity))
                        .collect();
                }
                for (history, value) in self.cores.iter_mut().zip(readings) {
                    history.push_clamped(value);
                }
            }
            Err(e) => warn!(error = %e, "Per-core query failed"),
        }
    }

    /// Refresh everything the presenter queries directly.
    pub fn refresh_all(&mut self) {
        self.refresh_system();
        self.refresh_cores();
        self.refresh_processes();
    }

    /// Periodic refresh: core histories always, plus whatever the current
    /// view shows.
    pub fn tick(&mut self) {
        self.refresh_cores();
        match self.current_view {
            View::Processes => self.refresh_processes(),
            View::System => self.refresh_system(),
            View::Overview | View::Cores => {}
        }
    }

    /// Filtered, sorted and truncated rows of the process table.
    pub fn visible_processes(&self) -> Vec<ProcessInfo> {
        process::visible_processes(
            &self.processes,
            &self.filter_text,
            self.sort_column,
            self.sort_ascending,
            self.process_limit,
        )
    }

    /// The process under the cursor.
    pub fn selected_process(&self) -> Option<ProcessInfo> {
        self.visible_processes().into_iter().nth(self.selected_process_index)
    }

    /// Switch to the next view (cycles through Overview → Cores → System → Processes).
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view, refreshing what it shows.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        match view {
            View::Processes => self.refresh_processes(),
            View::System => self.refresh_system(),
            View::Overview | View::Cores => {}
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        if self.current_view == View::Processes {
            let max = self.visible_processes().len().saturating_sub(1);
            self.selected_process_index = (self.selected_process_index + n).min(max);
        }
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        if self.current_view == View::Processes {
            self.selected_process_index = self.selected_process_index.saturating_sub(n);
        }
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_process_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        if self.current_view == View::Processes {
            self.selected_process_index = self.visible_processes().len().saturating_sub(1);
        }
    }

    /// Open the detail overlay for the selected process.
    pub fn enter_detail(&mut self) {
        if self.current_view != View::Processes {
            return;
        }
        let Some(selected) = self.selected_process() else {
            return;
        };

        match self.source.process_detail(selected.pid) {
            Ok(detail) => {
                self.detail = Some(detail);
                self.show_detail_overlay = true;
            }
            Err(e) => self.set_status_message(format!("No detail for {}: {}", selected.pid, e)),
        }
    }

    /// Navigate back: close overlays first, then return to Overview.
    pub fn go_back(&mut self) {
        if self.pending_terminate.is_some() {
            self.cancel_terminate();
            return;
        }
        if self.show_detail_overlay {
            self.close_overlay();
            return;
        }
        if self.current_view != View::Overview {
            self.current_view = View::Overview;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
        self.detail = None;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Ask for confirmation before terminating the selected process.
    pub fn request_terminate(&mut self) {
        if self.current_view != View::Processes {
            return;
        }
        match self.selected_process() {
            Some(p) => {
                self.pending_terminate = Some(PendingTerminate {
                    pid: p.pid,
                    name: p.name,
                })
            }
            None => self.set_status_message(ActionError::NothingSelected.to_string()),
        }
    }

    /// Terminate the process awaiting confirmation.
    pub fn confirm_terminate(&mut self) -> Result<(), ActionError> {
        let pending = self.pending_terminate.take().ok_or(ActionError::NothingSelected)?;
        self.show_detail_overlay = false;

        let result = self
            .source
            .terminate(pending.pid)
            .map_err(|source| ActionError::Terminate {
                pid: pending.pid,
                source,
            });

        match &result {
            Ok(()) => {
                info!(pid = pending.pid, name = %pending.name, "Terminated process");
                self.set_status_message(format!(
                    "Sent terminate to {} ({})",
                    pending.name, pending.pid
                ));
            }
            Err(e) => {
                warn!(error = %e, "Terminate failed");
                self.set_status_message(e.to_string());
            }
        }

        self.refresh_processes();
        result
    }

    pub fn cancel_terminate(&mut self) {
        self.pending_terminate = None;
    }

    /// Cycle to the next sort column, using that column's natural direction.
    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
        self.sort_ascending = self.sort_column.default_ascending();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_process_index = 0;
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.selected_process_index = 0;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current view and static info as JSON.
    pub fn export_state(&self) -> Result<(), ActionError> {
        export::write_export(
            &self.export_path,
            &self.metrics,
            self.static_info.as_ref(),
            self.source.description(),
        )
    }
}
