//! Sorting and filtering of the process table.

use std::cmp::Ordering;

use crate::source::ProcessInfo;

/// Column to sort the process table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessSortColumn {
    /// Sort by CPU usage.
    #[default]
    Cpu,
    /// Sort by resident memory.
    Memory,
    /// Sort by process name alphabetically.
    Name,
    /// Sort by process id.
    Pid,
}

impl ProcessSortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            ProcessSortColumn::Cpu => ProcessSortColumn::Memory,
            ProcessSortColumn::Memory => ProcessSortColumn::Name,
            ProcessSortColumn::Name => ProcessSortColumn::Pid,
            ProcessSortColumn::Pid => ProcessSortColumn::Cpu,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProcessSortColumn::Cpu => "cpu",
            ProcessSortColumn::Memory => "mem",
            ProcessSortColumn::Name => "name",
            ProcessSortColumn::Pid => "pid",
        }
    }

    /// Numeric columns read best largest-first, text columns A-Z.
    pub fn default_ascending(&self) -> bool {
        matches!(self, ProcessSortColumn::Name | ProcessSortColumn::Pid)
    }
}

/// Case-insensitive substring match on the process name.
pub fn matches_filter(process: &ProcessInfo, filter: &str) -> bool {
    filter.is_empty() || process.name.to_lowercase().contains(&filter.to_lowercase())
}

/// Sort processes by the given column and direction.
pub fn sort_processes(processes: &mut [ProcessInfo], column: ProcessSortColumn, ascending: bool) {
    processes.sort_by(|a, b| {
        let primary = match column {
            ProcessSortColumn::Cpu => a.cpu_percent.total_cmp(&b.cpu_percent),
            ProcessSortColumn::Memory => a.memory_bytes.cmp(&b.memory_bytes),
            ProcessSortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            ProcessSortColumn::Pid => a.pid.cmp(&b.pid),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Secondary sort by pid for stability when primary values are equal
        if primary == Ordering::Equal {
            a.pid.cmp(&b.pid)
        } else {
            primary
        }
    });
}

/// Filter, sort and truncate the process table to the rows shown.
pub fn visible_processes(
    processes: &[ProcessInfo],
    filter: &str,
    column: ProcessSortColumn,
    ascending: bool,
    limit: usize,
) -> Vec<ProcessInfo> {
    let mut rows: Vec<ProcessInfo> =
        processes.iter().filter(|p| matches_filter(p, filter)).cloned().collect();
    sort_processes(&mut rows, column, ascending);
    rows.truncate(limit);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ProcessStatus;

    fn process(pid: u32, name: &str, cpu: f64, memory_bytes: u64) -> ProcessInfo {
        ProcessInfo {
            pid,
            name: name.to_string(),
            cpu_percent: cpu,
            memory_percent: 0.0,
            memory_bytes,
            status: ProcessStatus::Running,
        }
    }

    fn table() -> Vec<ProcessInfo> {
        vec![
            process(10, "postgres", 12.0, 900),
            process(20, "cargo", 48.0, 300),
            process(30, "bash", 0.0, 100),
            process(40, "Postgres-worker", 12.0, 50),
        ]
    }

    #[test]
    fn cpu_descending_by_default() {
        let column = ProcessSortColumn::default();
        let rows = visible_processes(&table(), "", column, column.default_ascending(), 10);
        let pids: Vec<u32> = rows.iter().map(|p| p.pid).collect();
        // ties on cpu fall back to pid
        assert_eq!(pids, vec![20, 10, 40, 30]);
    }

    #[test]
    fn filter_is_case_insensitive() {
        let rows = visible_processes(&table(), "POST", ProcessSortColumn::Name, true, 10);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|p| p.name.to_lowercase().starts_with("postgres")));
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let rows = visible_processes(&table(), "", ProcessSortColumn::Memory, false, 2);
        let pids: Vec<u32> = rows.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![10, 20]);
    }

    #[test]
    fn sort_column_cycles() {
        let mut column = ProcessSortColumn::Cpu;
        for _ in 0..4 {
            column = column.next();
        }
        assert_eq!(column, ProcessSortColumn::Cpu);
    }
}
