//! Point-in-time readings produced by a metrics source.
//!
//! Cumulative counters, instantaneous gauges, and the one-shot facts the
//! presenter queries directly. All types serialize so they can be written
//! out by the JSON export.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// Instantaneous load readings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gauges {
    /// Global CPU utilisation, 0-100.
    pub cpu_percent: f64,
    /// Used memory as a share of total, 0-100.
    pub memory_percent: f64,
}

impl Gauges {
    pub fn new(cpu_percent: f64, memory_percent: f64) -> Self {
        Self {
            cpu_percent,
            memory_percent,
        }
    }
}

/// Cumulative disk I/O byte counters across all block devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiskCounters {
    pub read_bytes: u64,
    pub written_bytes: u64,
}

/// Cumulative counters at one instant.
///
/// Every field is expected to be monotonically non-decreasing between
/// polls. A decrease means the counter wrapped or the subsystem restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterSnapshot {
    /// Bytes transmitted, summed over all interfaces.
    pub bytes_sent: u64,
    /// Bytes received, summed over all interfaces.
    pub bytes_recv: u64,
    /// Disk counters, `None` when the platform does not expose them.
    pub disk: Option<DiskCounters>,
}

impl CounterSnapshot {
    /// Network-only snapshot with no disk data.
    pub fn network(bytes_sent: u64, bytes_recv: u64) -> Self {
        Self {
            bytes_sent,
            bytes_recv,
            disk: None,
        }
    }

    /// Attach disk counters.
    pub fn with_disk(mut self, read_bytes: u64, written_bytes: u64) -> Self {
        self.disk = Some(DiskCounters {
            read_bytes,
            written_bytes,
        });
        self
    }
}

/// Host facts that do not change between samples (or change slowly).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StaticInfo {
    pub os_name: String,
    pub os_version: String,
    pub kernel_version: String,
    pub hostname: String,
    pub cpu_brand: String,
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
    /// Current frequency of the first core, when the platform reports it.
    pub cpu_frequency_mhz: Option<u64>,
    pub total_memory: u64,
    pub available_memory: u64,
    pub used_memory: u64,
    pub total_swap: u64,
    pub used_swap: u64,
    /// Seconds since the Unix epoch.
    pub boot_time: u64,
    /// Seconds since boot.
    pub uptime: u64,
}

/// A mounted file system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub device: String,
    pub mount_path: String,
    pub file_system: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub removable: bool,
}

impl Partition {
    /// Share of the partition in use, 0-100. Empty partitions report 0.
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.used_bytes as f64 / self.total_bytes as f64 * 100.0
        }
    }
}

/// An address assigned to an interface, with its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceAddress {
    pub address: IpAddr,
    pub prefix: u8,
}

impl InterfaceAddress {
    pub fn new(address: IpAddr, prefix: u8) -> Self {
        Self { address, prefix }
    }

    /// Dotted netmask for IPv4 addresses.
    pub fn netmask(&self) -> Option<Ipv4Addr> {
        match self.address {
            IpAddr::V4(_) if self.prefix <= 32 => {
                let bits = u32::MAX
                    .checked_shl(32 - u32::from(self.prefix))
                    .unwrap_or(0);
                Some(Ipv4Addr::from(bits))
            }
            _ => None,
        }
    }
}

impl fmt::Display for InterfaceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix)
    }
}

/// A network interface and its cumulative traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    pub mac_address: String,
    pub addresses: Vec<InterfaceAddress>,
    pub bytes_recv: u64,
    pub bytes_sent: u64,
    pub packets_recv: u64,
    pub packets_sent: u64,
    pub errors_in: u64,
    pub errors_out: u64,
}

impl NetworkInterface {
    /// First IPv4 address, which is what the interface table shows.
    pub fn ipv4(&self) -> Option<&InterfaceAddress> {
        self.addresses.iter().find(|a| a.address.is_ipv4())
    }
}

/// Scheduler state of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProcessStatus {
    Running,
    Sleeping,
    Idle,
    Stopped,
    Zombie,
    Dead,
    Unknown,
}

impl ProcessStatus {
    /// Lowercase label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Sleeping => "sleeping",
            ProcessStatus::Idle => "idle",
            ProcessStatus::Stopped => "stopped",
            ProcessStatus::Zombie => "zombie",
            ProcessStatus::Dead => "dead",
            ProcessStatus::Unknown => "unknown",
        }
    }
}

/// One row of the process table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_bytes: u64,
    pub status: ProcessStatus,
}

/// Extended information about a single process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDetail {
    pub pid: u32,
    pub name: String,
    pub status: ProcessStatus,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
    /// Seconds since the Unix epoch.
    pub start_time: u64,
    /// Thread count, where the platform lists threads.
    pub threads: Option<usize>,
    pub exe: Option<String>,
    pub cwd: Option<String>,
    pub command_line: Vec<String>,
}
