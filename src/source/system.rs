//! Live host metrics backed by the `sysinfo` crate.

use sysinfo::{
    CpuRefreshKind, Disks, MemoryRefreshKind, Networks, Pid, Process, ProcessRefreshKind,
    ProcessesToUpdate, RefreshKind, Signal, System, MINIMUM_CPU_UPDATE_INTERVAL,
};

use super::{
    CounterSnapshot, DiskCounters, Gauges, InterfaceAddress, MetricsSource, NetworkInterface,
    Partition, ProcessDetail, ProcessInfo, ProcessStatus, SourceResult, StaticInfo,
};
use crate::error::SourceError;

/// A metrics source that reads the local host.
///
/// Holds reusable `sysinfo` collections so that CPU usage, which is
/// computed between two refreshes, has a stable baseline from one call to
/// the next.
pub struct SysinfoSource {
    system: System,
    networks: Networks,
    disks: Disks,
    /// Whether process CPU has a first refresh to measure against.
    processes_primed: bool,
    description: String,
}

impl std::fmt::Debug for SysinfoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysinfoSource")
            .field("description", &self.description)
            .finish()
    }
}

impl SysinfoSource {
    /// Create a source for the local host.
    ///
    /// Fails when `sysinfo` does not support this platform, in which case
    /// monitoring is meaningless and the caller should exit.
    pub fn new() -> Result<Self, SourceError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(SourceError::Unsupported(std::env::consts::OS.to_string()));
        }

        let mut system = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );
        // Prime the CPU baseline so the first gauge reading is meaningful.
        system.refresh_cpu_usage();

        let description = format!(
            "host: {}",
            System::host_name().unwrap_or_else(|| "localhost".to_string())
        );

        Ok(Self {
            system,
            networks: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
            processes_primed: false,
            description,
        })
    }

    fn cpu_count(&self) -> f64 {
        self.system.cpus().len().max(1) as f64
    }

    fn memory_share(&self, bytes: u64) -> f64 {
        let total = self.system.total_memory();
        if total == 0 {
            0.0
        } else {
            bytes as f64 / total as f64 * 100.0
        }
    }

    fn refresh_processes(&mut self, which: ProcessesToUpdate<'_>, kind: ProcessRefreshKind) {
        self.system.refresh_processes_specifics(which, true, kind);
    }

    fn process_info(&self, process: &Process) -> ProcessInfo {
        ProcessInfo {
            pid: process.pid().as_u32(),
            name: process.name().to_string_lossy().into_owned(),
            cpu_percent: process.cpu_usage() as f64 / self.cpu_count(),
            memory_percent: self.memory_share(process.memory()),
            memory_bytes: process.memory(),
            status: map_status(process.status()),
        }
    }

    #[cfg(target_os = "linux")]
    fn disk_counters(&self) -> Option<DiskCounters> {
        super::diskstats::read_disk_counters()
    }

    #[cfg(not(target_os = "linux"))]
    fn disk_counters(&self) -> Option<DiskCounters> {
        None
    }
}

impl MetricsSource for SysinfoSource {
    fn current_gauges(&mut self) -> SourceResult<Gauges> {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let total = self.system.total_memory();
        if total == 0 {
            return Err(SourceError::Unavailable(
                "memory totals not reported".to_string(),
            ));
        }

        Ok(Gauges {
            cpu_percent: self.system.global_cpu_usage() as f64,
            memory_percent: self.memory_share(self.system.used_memory()),
        })
    }

    fn counters(&mut self) -> SourceResult<CounterSnapshot> {
        self.networks.refresh();

        let (bytes_sent, bytes_recv) =
            self.networks.iter().fold((0u64, 0u64), |(sent, recv), (_, data)| {
                (
                    sent.saturating_add(data.total_transmitted()),
                    recv.saturating_add(data.total_received()),
                )
            });

        Ok(CounterSnapshot {
            bytes_sent,
            bytes_recv,
            disk: self.disk_counters(),
        })
    }

    fn cpu_cores(&mut self) -> SourceResult<Vec<f64>> {
        self.system.refresh_cpu_usage();

        let cores: Vec<f64> = self
            .system
            .cpus()
            .iter()
            .map(|cpu| cpu.cpu_usage() as f64)
            .collect();
        if cores.is_empty() {
            return Err(SourceError::Unavailable("no CPUs reported".to_string()));
        }
        Ok(cores)
    }

    fn static_info(&mut self) -> SourceResult<StaticInfo> {
        self.system.refresh_memory();
        self.system.refresh_cpu_frequency();

        let cpus = self.system.cpus();
        let cpu_brand = cpus.first().map(|c| c.brand().trim().to_string()).unwrap_or_default();
        let cpu_frequency_mhz = cpus.first().map(|c| c.frequency()).filter(|f| *f > 0);

        Ok(StaticInfo {
            os_name: System::name().unwrap_or_else(|| "unknown".to_string()),
            os_version: System::long_os_version()
                .or_else(System::os_version)
                .unwrap_or_default(),
            kernel_version: System::kernel_version().unwrap_or_default(),
            hostname: System::host_name().unwrap_or_default(),
            cpu_brand,
            physical_cores: self.system.physical_core_count(),
            logical_cores: cpus.len(),
            cpu_frequency_mhz,
            total_memory: self.system.total_memory(),
            available_memory: self.system.available_memory(),
            used_memory: self.system.used_memory(),
            total_swap: self.system.total_swap(),
            used_swap: self.system.used_swap(),
            boot_time: System::boot_time(),
            uptime: System::uptime(),
        })
    }

    fn partitions(&mut self) -> SourceResult<Vec<Partition>> {
        self.disks.refresh_list();

        Ok(self
            .disks
            .iter()
            .map(|disk| {
                let total = disk.total_space();
                Partition {
                    device: disk.name().to_string_lossy().into_owned(),
                    mount_path: disk.mount_point().to_string_lossy().into_owned(),
                    file_system: disk.file_system().to_string_lossy().into_owned(),
                    total_bytes: total,
                    used_bytes: total.saturating_sub(disk.available_space()),
                    removable: disk.is_removable(),
                }
            })
            .collect())
    }

    fn interfaces(&mut self) -> SourceResult<Vec<NetworkInterface>> {
        self.networks.refresh_list();

        let mut interfaces: Vec<NetworkInterface> = self
            .networks
            .iter()
            .map(|(name, data)| NetworkInterface {
                name: name.clone(),
                mac_address: data.mac_address().to_string(),
                addresses: data
                    .ip_networks()
                    .iter()
                    .map(|net| InterfaceAddress::new(net.addr, net.prefix))
                    .collect(),
                bytes_recv: data.total_received(),
                bytes_sent: data.total_transmitted(),
                packets_recv: data.total_packets_received(),
                packets_sent: data.total_packets_transmitted(),
                errors_in: data.total_errors_on_received(),
                errors_out: data.total_errors_on_transmitted(),
            })
            .collect();
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(interfaces)
    }

    fn processes(&mut self) -> SourceResult<Vec<ProcessInfo>> {
        if !self.processes_primed {
            // Process CPU is measured between two refreshes; without a
            // first one every process would report 0%.
            self.refresh_processes(ProcessesToUpdate::All, ProcessRefreshKind::new().with_cpu());
            std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
            self.processes_primed = true;
        }

        self.system.refresh_memory();
        self.refresh_processes(
            ProcessesToUpdate::All,
            ProcessRefreshKind::new().with_cpu().with_memory(),
        );

        Ok(self
            .system
            .processes()
            .values()
            // Linux lists threads as processes; keep only the thread-group leaders.
            .filter(|p| p.thread_kind().is_none())
            .map(|p| self.process_info(p))
            .collect())
    }

    fn process_detail(&mut self, pid: u32) -> SourceResult<ProcessDetail> {
        let sys_pid = Pid::from_u32(pid);
        self.refresh_processes(
            ProcessesToUpdate::Some(&[sys_pid]),
            ProcessRefreshKind::everything(),
        );

        let process = self.system.process(sys_pid).ok_or(SourceError::NoSuchProcess(pid))?;
        let info = self.process_info(process);

        Ok(ProcessDetail {
            pid,
            name: info.name,
            status: info.status,
            cpu_percent: info.cpu_percent,
            memory_percent: info.memory_percent,
            resident_bytes: process.memory(),
            virtual_bytes: process.virtual_memory(),
            start_time: process.start_time(),
            threads: process.tasks().map(|tasks| tasks.len()),
            exe: process.exe().map(|p| p.display().to_string()),
            cwd: process.cwd().map(|p| p.display().to_string()),
            command_line: process
                .cmd()
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect(),
        })
    }

    fn terminate(&mut self, pid: u32) -> SourceResult<()> {
        let sys_pid = Pid::from_u32(pid);
        self.refresh_processes(ProcessesToUpdate::Some(&[sys_pid]), ProcessRefreshKind::new());

        let process = self.system.process(sys_pid).ok_or(SourceError::NoSuchProcess(pid))?;

        // Prefer a polite SIGTERM; platforms without it get the default kill.
        let delivered = process.kill_with(Signal::Term).unwrap_or_else(|| process.kill());
        if delivered {
            Ok(())
        } else {
            Err(SourceError::PermissionDenied(format!(
                "signal not delivered to {}",
                pid
            )))
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

fn map_status(status: sysinfo::ProcessStatus) -> ProcessStatus {
    use sysinfo::ProcessStatus as Sys;

    match status {
        Sys::Run => ProcessStatus::Running,
        Sys::Sleep | Sys::UninterruptibleDiskSleep | Sys::LockBlocked => ProcessStatus::Sleeping,
        Sys::Idle | Sys::Parked => ProcessStatus::Idle,
        Sys::Stop | Sys::Tracing => ProcessStatus::Stopped,
        Sys::Zombie => ProcessStatus::Zombie,
        Sys::Dead => ProcessStatus::Dead,
        _ => ProcessStatus::Unknown,
    }
}
