//! Data processing behind the tracker and the views.
//!
//! ## Submodules
//!
//! - [`history`]: Fixed-capacity rolling history ([`RollingHistory`])
//! - [`rate`]: Throughput derived from consecutive counter snapshots
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "1s", "500ms")
//! - [`format`]: Byte, percentage, uptime and timestamp formatting
//! - [`process`]: Sorting and filtering of the process table
//!
//! ## Data Flow
//!
//! ```text
//! CounterSnapshot (previous) ─┐
//!                             ├──▶ rate::derive() ──▶ Throughput (MB/s)
//! CounterSnapshot (current) ──┘                          │
//!                                                        ▼
//! Gauges (cpu %, memory %) ──────────────────▶ RollingHistory::push_clamped()
//! ```

pub mod duration;
pub mod format;
pub mod history;
pub mod process;
pub mod rate;

pub use history::RollingHistory;
pub use process::ProcessSortColumn;
pub use rate::{CounterDelta, Throughput};
