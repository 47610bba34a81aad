//! Rates derived from consecutive cumulative counter readings.

use std::time::Duration;

use serde::Serialize;

use crate::source::CounterSnapshot;

/// Bytes per mebibyte, the unit rates are reported in.
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Change of one cumulative counter between two polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterDelta {
    /// The counter advanced (or stood still) by this many bytes.
    Advanced(u64),
    /// The counter went backwards: it wrapped or its subsystem restarted.
    /// The current value becomes the new baseline.
    Regressed { previous: u64, current: u64 },
}

impl CounterDelta {
    pub fn between(previous: u64, current: u64) -> Self {
        match current.checked_sub(previous) {
            Some(delta) => CounterDelta::Advanced(delta),
            None => CounterDelta::Regressed { previous, current },
        }
    }

    /// Bytes moved, zero for a regression.
    pub fn bytes(&self) -> u64 {
        match self {
            CounterDelta::Advanced(delta) => *delta,
            CounterDelta::Regressed { .. } => 0,
        }
    }

    pub fn is_regression(&self) -> bool {
        matches!(self, CounterDelta::Regressed { .. })
    }
}

/// Convert a byte delta over an elapsed time into MB/s.
///
/// A zero elapsed time yields zero rather than infinity.
pub fn mb_per_sec(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        bytes as f64 / BYTES_PER_MB / secs
    } else {
        0.0
    }
}

/// Per-field throughput between two counter snapshots, in MB/s.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Throughput {
    pub net_sent: f64,
    pub net_recv: f64,
    pub disk_read: f64,
    pub disk_write: f64,
    /// Whether the newer snapshot carried disk counters.
    pub disk_available: bool,
}

impl Throughput {
    /// Combined network rate (sent + received).
    pub fn network_total(&self) -> f64 {
        self.net_sent + self.net_recv
    }

    /// Combined disk rate (read + written).
    pub fn disk_total(&self) -> f64 {
        self.disk_read + self.disk_write
    }
}

/// Outcome of comparing two snapshots: the rates plus the names of any
/// counters that regressed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RateSample {
    pub throughput: Throughput,
    pub regressions: Vec<&'static str>,
}

/// Derive throughput from two snapshots taken `elapsed` apart.
///
/// Negative deltas (counter resets) yield zero for that field. When the
/// newer snapshot has no disk counters the disk rates are zero; when only
/// the older one lacks them there is no baseline yet, which is also zero.
pub fn derive(previous: &CounterSnapshot, current: &CounterSnapshot, elapsed: Duration) -> RateSample {
    let mut regressions = Vec::new();
    let mut rate = |name: &'static str, old: u64, new: u64| {
        let delta = CounterDelta::between(old, new);
        if delta.is_regression() {
            regressions.push(name);
        }
        mb_per_sec(delta.bytes(), elapsed)
    };

    let net_sent = rate("bytes_sent", previous.bytes_sent, current.bytes_sent);
    let net_recv = rate("bytes_recv", previous.bytes_recv, current.bytes_recv);

    let (disk_read, disk_write) = match (previous.disk, current.disk) {
        (Some(old), Some(new)) => (
            rate("disk_read_bytes", old.read_bytes, new.read_bytes),
            rate("disk_written_bytes", old.written_bytes, new.written_bytes),
        ),
        _ => (0.0, 0.0),
    };

    RateSample {
        throughput: Throughput {
            net_sent,
            net_recv,
            disk_read,
            disk_write,
            disk_available: current.disk.is_some(),
        },
        regressions,
    }
}

/// Format a MB/s rate for display.
pub fn format_rate(mb_per_sec: f64) -> String {
    if mb_per_sec >= 1.0 {
        format!("{:.2} MB/s", mb_per_sec)
    } else {
        format!("{:.1} KB/s", mb_per_sec * 1024.0)
    }
}
