//! Disk I/O counters from the kernel's block-device table.
//!
//! `sysinfo` 0.32 does not expose host-wide disk throughput, so on Linux
//! the byte counters are summed from `procfs::diskstats()`.

use std::path::Path;

use super::DiskCounters;

/// The kernel always reports sectors as 512 bytes, whatever the device.
const SECTOR_SIZE: u64 = 512;

/// Device-name prefixes that are virtual or stacked on other devices.
const SKIPPED_PREFIXES: &[&str] = &["loop", "ram", "dm-", "md", "zram", "fd"];

/// Sector counters of one block device.
#[derive(Debug, Clone, Copy)]
pub struct DeviceSectors<'a> {
    pub name: &'a str,
    pub sectors_read: u64,
    pub sectors_written: u64,
}

/// Read cumulative disk counters for all whole block devices.
///
/// Returns `None` when the table cannot be read or lists no devices.
pub fn read_disk_counters() -> Option<DiskCounters> {
    let stats = procfs::diskstats().ok()?;

    sum_whole_devices(
        stats.iter().map(|stat| DeviceSectors {
            name: &stat.name,
            sectors_read: stat.sectors_read as u64,
            sectors_written: stat.sectors_written as u64,
        }),
        |name| Path::new("/sys/block").join(name).exists(),
    )
}

/// Sum bytes read and written over whole devices.
///
/// Partitions are excluded through `is_whole_device` so that I/O is not
/// counted twice.
pub fn sum_whole_devices<'a, I, F>(devices: I, is_whole_device: F) -> Option<DiskCounters>
where
    I: IntoIterator<Item = DeviceSectors<'a>>,
    F: Fn(&str) -> bool,
{
    let mut counters = DiskCounters::default();
    let mut seen = false;

    for device in devices {
        if SKIPPED_PREFIXES.iter().any(|p| device.name.starts_with(p))
            || !is_whole_device(device.name)
        {
            continue;
        }

        counters.read_bytes = counters
            .read_bytes
            .saturating_add(device.sectors_read.saturating_mul(SECTOR_SIZE));
        counters.written_bytes = counters
            .written_bytes
            .saturating_add(device.sectors_written.saturating_mul(SECTOR_SIZE));
        seen = true;
    }

    seen.then_some(counters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, sectors_read: u64, sectors_written: u64) -> DeviceSectors<'_> {
        DeviceSectors {
            name,
            sectors_read,
            sectors_written,
        }
    }

    fn whole(name: &str) -> bool {
        matches!(name, "sda" | "nvme0n1" | "loop0")
    }

    #[test]
    fn sums_whole_devices_only() {
        let devices = [
            device("loop0", 4000, 0),
            device("sda", 20000, 10000),
            device("sda1", 19000, 9000),
            device("nvme0n1", 8, 4),
        ];
        let counters = sum_whole_devices(devices, whole).unwrap();
        assert_eq!(counters.read_bytes, (20000 + 8) * 512);
        assert_eq!(counters.written_bytes, (10000 + 4) * 512);
    }

    #[test]
    fn no_devices_is_unavailable() {
        assert!(sum_whole_devices([], whole).is_none());
        assert!(sum_whole_devices([device("sda1", 1, 1)], whole).is_none());
    }

    #[test]
    fn huge_sector_counts_saturate() {
        let devices = [device("sda", u64::MAX / 2, 1), device("nvme0n1", 1, 1)];
        let counters = sum_whole_devices(devices, whole).unwrap();
        assert_eq!(counters.read_bytes, u64::MAX);
        assert_eq!(counters.written_bytes, 1024);
    }

    #[test]
    fn live_table_reads_if_present() {
        // Containers may hide every block device; only check consistency.
        if let Some(counters) = read_disk_counters() {
            assert!(counters.read_bytes % SECTOR_SIZE == 0);
            assert!(counters.written_bytes % SECTOR_SIZE == 0);
        }
    }
}
