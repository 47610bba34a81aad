//! # sysdash
//!
//! A terminal dashboard and library for watching host CPU, memory, network
//! and disk activity.
//!
//! The core is the [`Tracker`]: it polls a [`MetricsSource`] once per
//! interval, turns cumulative network and disk counters into MB/s rates,
//! keeps a fixed-capacity [`RollingHistory`] per metric and publishes each
//! result as an immutable [`MetricsView`]. The terminal UI only reads those
//! views; static facts and the process table it queries directly.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌──────────┐  watch<Arc<MetricsView>>  ┌─────┐   ┌────────┐ │
//! │  │ tracker  │──────────────────────────▶│ app │──▶│   ui   │ │
//! │  │(sampling)│                           └──┬──┘   └────────┘ │
//! │  └────┬─────┘                              │ one-shot queries │
//! │       ▼                                    ▼                  │
//! │  ┌─────────┐                          ┌─────────┐             │
//! │  │ source  │  SysinfoSource |         │ source  │             │
//! │  │ (input) │  ScriptedSource          │ (input) │             │
//! │  └─────────┘                          └─────────┘             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`tracker`]**: The sampling loop, rate derivation, histories and health
//! - **[`source`]**: The [`MetricsSource`] trait with a live `sysinfo` backend
//!   and a scripted one for tests and demos
//! - **[`data`]**: Rolling histories, rate math, formatting and process sorting
//! - **[`app`]**, **[`events`]**, **[`ui`]**: The ratatui presenter
//! - **[`config`]**, **[`logging`]**, **[`export`]**: Settings, file logging, JSON export
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Live dashboard of this host
//! sysdash
//!
//! # Faster sampling, longer history, logs to a file
//! sysdash --interval 500ms --history 120 --log-file sysdash.log
//!
//! # Synthetic data, no host access needed
//! sysdash --demo
//!
//! # Sample for a few seconds and write JSON instead of drawing
//! sysdash --export snapshot.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::time::Duration;
//! use sysdash::{Metric, ScriptedSource, Tracker, TrackerConfig};
//!
//! # tokio_test::block_on(async {
//! let mut tracker = Tracker::new(Box::new(ScriptedSource::demo()), TrackerConfig::default());
//! tracker.start();
//!
//! let mut views = tracker.subscribe();
//! views.changed().await.unwrap();
//! println!("cpu: {:.1}%", tracker.current_values().cpu_percent);
//! println!("history: {:?}", tracker.history_of(Metric::Cpu));
//!
//! tracker.shutdown(Duration::from_secs(1)).await;
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod logging;
pub mod source;
pub mod tracker;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{CounterDelta, RollingHistory, Throughput};
pub use error::{ActionError, ConfigError, SourceError};
pub use source::{
    CounterSnapshot, DiskCounters, Gauges, InterfaceAddress, MetricsSource, NetworkInterface,
    Partition, ProcessDetail, ProcessInfo, ProcessStatus, ScriptedSource, StaticInfo,
    SysinfoSource,
};
pub use tracker::{
    CurrentValues, Metric, MetricsView, Tracker, TrackerConfig, TrackerHealth, TrackerState,
};
