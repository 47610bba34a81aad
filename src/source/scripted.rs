//! Scripted metrics source.
//!
//! Replays a queue of readings (or failures) one sample at a time. Used by
//! tests to drive the tracker deterministically, and by `--demo` mode,
//! which generates a synthetic waveform once the queue runs dry.

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use super::{
    CounterSnapshot, Gauges, InterfaceAddress, MetricsSource, NetworkInterface, Partition,
    ProcessDetail, ProcessInfo, ProcessStatus, SourceResult, StaticInfo,
};
use crate::error::SourceError;

/// One scripted sample: the gauges and counters returned together.
#[derive(Debug, Clone)]
enum Step {
    Reading(Gauges, CounterSnapshot),
    Failure(SourceError),
}

/// A metrics source that plays back queued readings.
///
/// Each sample consumes one step: [`current_gauges`](MetricsSource::current_gauges)
/// pops the step and [`counters`](MetricsSource::counters) returns the
/// counters that came with it.
///
/// # Example
///
/// ```
/// use sysdash::{CounterSnapshot, Gauges, MetricsSource, ScriptedSource, SourceError};
///
/// let mut source = ScriptedSource::new();
/// source.push_failure(SourceError::Unavailable("boom".into()));
/// assert!(source.current_gauges().is_err());
/// ```
#[derive(Debug)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
    pending_counters: Option<CounterSnapshot>,
    processes: Vec<ProcessInfo>,
    cores: Vec<f64>,
    terminated: Vec<u32>,
    synthetic: Option<Synthetic>,
    description: String,
}

/// Logical cores reported in demo mode.
const DEMO_CORES: usize = 8;

/// Deterministic generator for demo mode.
#[derive(Debug, Clone, Default)]
struct Synthetic {
    tick: u64,
    core_tick: u64,
    counters: CounterSnapshot,
}

impl Synthetic {
    fn next(&mut self) -> (Gauges, CounterSnapshot) {
        self.tick += 1;
        let t = self.tick as f64;

        let cpu = 35.0 + 25.0 * (t / 7.0).sin() + 10.0 * (t / 2.3).cos();
        let memory = 55.0 + 8.0 * (t / 30.0).sin();

        // Sawtooth traffic so the throughput charts have some shape.
        let sent = 256 * 1024 + (self.tick % 10) * 96 * 1024;
        let recv = 1024 * 1024 + (self.tick % 15) * 160 * 1024;
        let read = (self.tick % 20) * 64 * 1024;
        let written = 512 * 1024 + (self.tick % 6) * 128 * 1024;

        let disk = self.counters.disk.unwrap_or_default();
        self.counters = CounterSnapshot::network(
            self.counters.bytes_sent + sent,
            self.counters.bytes_recv + recv,
        )
        .with_disk(disk.read_bytes + read, disk.written_bytes + written);

        (Gauges::new(cpu.clamp(0.0, 100.0), memory), self.counters)
    }

    /// Eight cores drifting out of phase with each other.
    fn cores(&mut self) -> Vec<f64> {
        self.core_tick += 1;
        let t = self.core_tick as f64;

        (0..DEMO_CORES)
            .map(|core| {
                let phase = core as f64 * 0.8;
                (40.0 + 35.0 * ((t + phase) / 4.0).sin()).clamp(0.0, 100.0)
            })
            .collect()
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSource {
    /// Create an empty script. Sampling an exhausted script fails with
    /// [`SourceError::Unavailable`].
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            pending_counters: None,
            processes: Vec::new(),
            cores: Vec::new(),
            terminated: Vec::new(),
            synthetic: None,
            description: "scripted".to_string(),
        }
    }

    /// Create a source that generates synthetic readings forever.
    pub fn demo() -> Self {
        Self {
            synthetic: Some(Synthetic::default()),
            processes: demo_processes(),
            description: "demo".to_string(),
            ..Self::new()
        }
    }

    /// Queue a successful sample.
    pub fn push_reading(&mut self, gauges: Gauges, counters: CounterSnapshot) -> &mut Self {
        self.steps.push_back(Step::Reading(gauges, counters));
        self
    }

    /// Queue a failed sample.
    pub fn push_failure(&mut self, error: SourceError) -> &mut Self {
        self.steps.push_back(Step::Failure(error));
        self
    }

    /// Replace the process table returned by [`processes`](MetricsSource::processes).
    pub fn set_processes(&mut self, processes: Vec<ProcessInfo>) {
        self.processes = processes;
    }

    /// Replace the per-core readings returned by [`cpu_cores`](MetricsSource::cpu_cores).
    pub fn set_cores(&mut self, cores: Vec<f64>) {
        self.cores = cores;
    }

    /// Number of queued steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    /// Pids that were successfully terminated, in order.
    pub fn terminated(&self) -> &[u32] {
        &self.terminated
    }
}

impl MetricsSource for ScriptedSource {
    fn current_gauges(&mut self) -> SourceResult<Gauges> {
        self.pending_counters = None;

        match self.steps.pop_front() {
            Some(Step::Reading(gauges, counters)) => {
                self.pending_counters = Some(counters);
                Ok(gauges)
            }
            Some(Step::Failure(err)) => Err(err),
            None => match self.synthetic.as_mut() {
                Some(generator) => {
                    let (gauges, counters) = generator.next();
                    self.pending_counters = Some(counters);
                    Ok(gauges)
                }
                None => Err(SourceError::Unavailable("script exhausted".to_string())),
            },
        }
    }

    fn counters(&mut self) -> SourceResult<CounterSnapshot> {
        self.pending_counters
            .take()
            .ok_or_else(|| SourceError::Unavailable("no counters queued".to_string()))
    }

    fn cpu_cores(&mut self) -> SourceResult<Vec<f64>> {
        match self.synthetic.as_mut() {
            Some(generator) => Ok(generator.cores()),
            None => Ok(self.cores.clone()),
        }
    }

    fn static_info(&mut self) -> SourceResult<StaticInfo> {
        Ok(StaticInfo {
            os_name: "Scripted OS".to_string(),
            os_version: "1.0".to_string(),
            kernel_version: "1.0.0".to_string(),
            hostname: "demo-host".to_string(),
            cpu_brand: "Synthetic CPU".to_string(),
            physical_cores: Some(4),
            logical_cores: 8,
            cpu_frequency_mhz: Some(2400),
            total_memory: 16 * 1024 * 1024 * 1024,
            available_memory: 7 * 1024 * 1024 * 1024,
            used_memory: 9 * 1024 * 1024 * 1024,
            total_swap: 2 * 1024 * 1024 * 1024,
            used_swap: 256 * 1024 * 1024,
            boot_time: 1_700_000_000,
            uptime: 3 * 24 * 3600 + 4 * 3600 + 5 * 60,
        })
    }

    fn partitions(&mut self) -> SourceResult<Vec<Partition>> {
        Ok(vec![
            Partition {
                device: "demo0".to_string(),
                mount_path: "/".to_string(),
                file_system: "ext4".to_string(),
                total_bytes: 512 * 1024 * 1024 * 1024,
                used_bytes: 300 * 1024 * 1024 * 1024,
                removable: false,
            },
            Partition {
                device: "demo1".to_string(),
                mount_path: "/home".to_string(),
                file_system: "ext4".to_string(),
                total_bytes: 1024 * 1024 * 1024 * 1024,
                used_bytes: 128 * 1024 * 1024 * 1024,
                removable: false,
            },
        ])
    }

    fn interfaces(&mut self) -> SourceResult<Vec<NetworkInterface>> {
        let counters = self.synthetic.as_ref().map(|s| s.counters).unwrap_or_default();
        Ok(vec![NetworkInterface {
            name: "eth0".to_string(),
            mac_address: "02:00:00:00:00:01".to_string(),
            addresses: vec![
                InterfaceAddress::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 42)), 24),
                InterfaceAddress::new(
                    IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 42)),
                    64,
                ),
            ],
            bytes_recv: counters.bytes_recv,
            bytes_sent: counters.bytes_sent,
            packets_recv: counters.bytes_recv / 1500,
            packets_sent: counters.bytes_sent / 1500,
            errors_in: 0,
            errors_out: 0,
        }])
    }

    fn processes(&mut self) -> SourceResult<Vec<ProcessInfo>> {
        Ok(self.processes.clone())
    }

    fn process_detail(&mut self, pid: u32) -> SourceResult<ProcessDetail> {
        let info = self
            .processes
            .iter()
            .find(|p| p.pid == pid)
            .ok_or(SourceError::NoSuchProcess(pid))?;

        Ok(ProcessDetail {
            pid,
            name: info.name.clone(),
            status: info.status,
            cpu_percent: info.cpu_percent,
            memory_percent: info.memory_percent,
            resident_bytes: info.memory_bytes,
            virtual_bytes: info.memory_bytes * 4,
            start_time: 1_700_000_000,
            threads: Some(1 + (info.pid as usize % 7)),
            exe: Some(format!("/usr/bin/{}", info.name)),
            cwd: Some("/".to_string()),
            command_line: vec![info.name.clone()],
        })
    }

    fn terminate(&mut self, pid: u32) -> SourceResult<()> {
        let index = self
            .processes
            .iter()
            .position(|p| p.pid == pid)
            .ok_or(SourceError::NoSuchProcess(pid))?;
        self.processes.remove(index);
        self.terminated.push(pid);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

fn demo_processes() -> Vec<ProcessInfo> {
    let rows: [(u32, &str, f64, f64, ProcessStatus); 6] = [
        (1, "init", 0.1, 0.2, ProcessStatus::Sleeping),
        (412, "sshd", 0.0, 0.1, ProcessStatus::Sleeping),
        (1024, "postgres", 12.5, 8.4, ProcessStatus::Running),
        (2048, "cargo", 48.0, 3.1, ProcessStatus::Running),
        (3001, "editor", 2.2, 4.8, ProcessStatus::Sleeping),
        (3150, "backup", 0.0, 0.3, ProcessStatus::Stopped),
    ];

    rows.into_iter()
        .map(|(pid, name, cpu, mem, status)| ProcessInfo {
            pid,
            name: name.to_string(),
            cpu_percent: cpu,
            memory_percent: mem,
            memory_bytes: (mem * 16.0 * 1024.0 * 1024.0 * 1024.0 / 100.0) as u64,
            status,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_steps_in_order() {
        let mut source = ScriptedSource::new();
        source
            .push_reading(Gauges::new(10.0, 20.0), CounterSnapshot::network(1, 2))
            .push_failure(SourceError::Unavailable("gone".to_string()))
            .push_reading(Gauges::new(30.0, 40.0), CounterSnapshot::network(3, 4));

        assert_eq!(source.current_gauges().unwrap().cpu_percent, 10.0);
        assert_eq!(source.counters().unwrap().bytes_sent, 1);

        assert!(source.current_gauges().is_err());
        assert!(source.counters().is_err());

        assert_eq!(source.current_gauges().unwrap().memory_percent, 40.0);
        assert_eq!(source.counters().unwrap().bytes_recv, 4);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn exhausted_script_is_unavailable() {
        let mut source = ScriptedSource::new();
        assert_eq!(
            source.current_gauges(),
            Err(SourceError::Unavailable("script exhausted".to_string()))
        );
    }

    #[test]
    fn demo_counters_never_decrease() {
        let mut source = ScriptedSource::demo();
        let mut previous = CounterSnapshot::default();
        for _ in 0..50 {
            let gauges = source.current_gauges().unwrap();
            assert!((0.0..=100.0).contains(&gauges.cpu_percent));
            let counters = source.counters().unwrap();
            assert!(counters.bytes_sent >= previous.bytes_sent);
            assert!(counters.bytes_recv >= previous.bytes_recv);
            let disk = counters.disk.unwrap();
            assert!(disk.read_bytes >= previous.disk.map_or(0, |d| d.read_bytes));
            previous = counters;
        }
    }

    #[test]
    fn terminate_removes_process() {
        let mut source = ScriptedSource::demo();
        source.terminate(2048).unwrap();
        assert_eq!(source.terminated(), &[2048]);
        assert!(source.processes().unwrap().iter().all(|p| p.pid != 2048));
        assert_eq!(source.terminate(2048), Err(SourceError::NoSuchProcess(2048)));
    }

    #[test]
    fn demo_cores_move_and_stay_in_range() {
        let mut source = ScriptedSource::demo();
        let first = source.cpu_cores().unwrap();
        let second = source.cpu_cores().unwrap();

        assert_eq!(first.len(), 8);
        assert!(first.iter().chain(&second).all(|c| (0.0..=100.0).contains(c)));
        assert_ne!(first, second);
    }

    #[test]
    fn scripted_cores_are_returned_as_set() {
        let mut source = ScriptedSource::new();
        assert!(source.cpu_cores().unwrap().is_empty());
        source.set_cores(vec![12.0, 88.0]);
        assert_eq!(source.cpu_cores().unwrap(), vec![12.0, 88.0]);
    }
}
