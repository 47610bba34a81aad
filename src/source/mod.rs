//! Metrics source abstraction.
//!
//! A [`MetricsSource`] answers point-in-time questions about the host:
//! gauges and cumulative counters for the tracker, and static facts,
//! partitions, interfaces and the process table for the presenter.
//!
//! - [`SysinfoSource`]: the live host, backed by the `sysinfo` crate
//! - [`ScriptedSource`]: replays queued readings (tests and `--demo`)

#[cfg(target_os = "linux")]
mod diskstats;
mod scripted;
mod snapshot;
mod system;

pub use scripted::ScriptedSource;
pub use snapshot::{
    CounterSnapshot, DiskCounters, Gauges, InterfaceAddress, NetworkInterface, Partition,
    ProcessDetail, ProcessInfo, ProcessStatus, StaticInfo,
};
pub use system::SysinfoSource;

use std::fmt::Debug;

use crate::error::SourceError;

/// Result alias for metrics queries.
pub type SourceResult<T> = Result<T, SourceError>;

/// Trait for querying host metrics.
///
/// Every call may fail with a [`SourceError`]; callers treat a failure as
/// "skip this reading", never as fatal.
///
/// # Example
///
/// ```
/// use sysdash::{CounterSnapshot, Gauges, MetricsSource, ScriptedSource};
///
/// let mut source = ScriptedSource::new();
/// source.push_reading(Gauges::new(12.5, 40.0), CounterSnapshot::network(100, 200));
///
/// let gauges = source.current_gauges().unwrap();
/// assert_eq!(gauges.cpu_percent, 12.5);
/// assert_eq!(source.counters().unwrap().bytes_recv, 200);
/// ```
pub trait MetricsSource: Send + Debug {
    /// Instantaneous CPU and memory load.
    fn current_gauges(&mut self) -> SourceResult<Gauges>;

    /// Cumulative network and disk counters.
    fn counters(&mut self) -> SourceResult<CounterSnapshot>;

    /// Utilisation of each logical core, 0-100, in core order.
    fn cpu_cores(&mut self) -> SourceResult<Vec<f64>>;

    /// Host facts: OS, CPU, memory totals, boot time.
    fn static_info(&mut self) -> SourceResult<StaticInfo>;

    /// Mounted file systems with their usage.
    fn partitions(&mut self) -> SourceResult<Vec<Partition>>;

    /// Network interfaces with cumulative traffic.
    fn interfaces(&mut self) -> SourceResult<Vec<NetworkInterface>>;

    /// The process table, unsorted.
    fn processes(&mut self) -> SourceResult<Vec<ProcessInfo>>;

    /// Extended information about one process.
    fn process_detail(&mut self, pid: u32) -> SourceResult<ProcessDetail>;

    /// Ask a process to terminate.
    fn terminate(&mut self, pid: u32) -> SourceResult<()>;

    /// Human-readable description, shown in the status bar.
    fn description(&self) -> &str;
}
