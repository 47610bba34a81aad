//! The synchronous core of the sampling loop.
//!
//! A [`Sampler`] owns the metrics source, the previous counter snapshot and
//! every rolling history. Each call to [`Sampler::sample_at`] takes one
//! reading, derives rates against the previous snapshot and returns the
//! immutable [`MetricsView`] to publish.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::data::rate::{self, Throughput};
use crate::data::RollingHistory;
use crate::source::{CounterSnapshot, Gauges, MetricsSource, SourceResult};

/// A metric with a rolling history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Global CPU load, percent.
    Cpu,
    /// Used memory, percent.
    Memory,
    /// Network throughput (sent + received), MB/s.
    Network,
    /// Disk throughput (read + written), MB/s.
    Disk,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Cpu, Metric::Memory, Metric::Network, Metric::Disk];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Cpu => "CPU",
            Metric::Memory => "Memory",
            Metric::Network => "Network",
            Metric::Disk => "Disk",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Cpu | Metric::Memory => "%",
            Metric::Network | Metric::Disk => "MB/s",
        }
    }
}

/// The latest computed value of every tracked metric.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CurrentValues {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    /// Per-field rates against the previous snapshot.
    pub throughput: Throughput,
}

impl CurrentValues {
    /// Value of a charted metric, as stored in its history.
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cpu => self.cpu_percent,
            Metric::Memory => self.memory_percent,
            Metric::Network => self.throughput.network_total(),
            Metric::Disk => self.throughput.disk_total(),
        }
    }
}

/// Health of the sampling loop.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TrackerHealth {
    /// Failed samples since the last successful one.
    pub consecutive_failures: u32,
    /// Set once `consecutive_failures` reaches the configured threshold.
    pub degraded: bool,
    /// Message of the most recent failure, cleared on success.
    pub last_error: Option<String>,
}

/// The four rolling histories, oldest sample first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySet {
    pub cpu: RollingHistory<f64>,
    pub memory: RollingHistory<f64>,
    pub network: RollingHistory<f64>,
    pub disk: RollingHistory<f64>,
}

impl HistorySet {
    pub fn new(capacity: usize) -> Self {
        Self {
            cpu: RollingHistory::new(capacity),
            memory: RollingHistory::new(capacity),
            network: RollingHistory::new(capacity),
            disk: RollingHistory::new(capacity),
        }
    }

    pub fn get(&self, metric: Metric) -> &RollingHistory<f64> {
        match metric {
            Metric::Cpu => &self.cpu,
            Metric::Memory => &self.memory,
            Metric::Network => &self.network,
            Metric::Disk => &self.disk,
        }
    }

    fn append(&mut self, values: &CurrentValues) {
        for metric in Metric::ALL {
            let history = match metric {
                Metric::Cpu => &mut self.cpu,
                Metric::Memory => &mut self.memory,
                Metric::Network => &mut self.network,
                Metric::Disk => &mut self.disk,
            };
            history.push_clamped(values.get(metric));
        }
    }
}

/// An immutable published view of the tracker state.
///
/// Views are numbered: a later view always carries a larger `seq`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsView {
    pub seq: u64,
    pub current: CurrentValues,
    pub history: HistorySet,
    pub health: TrackerHealth,
    /// When the last successful sample was taken.
    #[serde(skip)]
    pub last_success: Option<Instant>,
}

impl MetricsView {
    /// The view published before any sample has been taken.
    pub fn empty(capacity: usize) -> Self {
        Self {
            seq: 0,
            current: CurrentValues::default(),
            history: HistorySet::new(capacity),
            health: TrackerHealth::default(),
            last_success: None,
        }
    }
}

/// Tuning for the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub history_capacity: usize,
    /// Consecutive failures before health is reported as degraded.
    pub degraded_after: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            history_capacity: crate::data::history::DEFAULT_HISTORY_CAPACITY,
            degraded_after: 3,
        }
    }
}

/// Takes readings and maintains rates, histories and health.
#[derive(Debug)]
pub struct Sampler {
    source: Box<dyn MetricsSource>,
    config: SamplerConfig,
    previous: Option<(CounterSnapshot, Instant)>,
    current: CurrentValues,
    history: HistorySet,
    health: TrackerHealth,
    seq: u64,
    last_success: Option<Instant>,
}

impl Sampler {
    pub fn new(source: Box<dyn MetricsSource>, config: SamplerConfig) -> Self {
        Self {
            source,
            config,
            previous: None,
            current: CurrentValues::default(),
            history: HistorySet::new(config.history_capacity),
            health: TrackerHealth::default(),
            seq: 0,
            last_success: None,
        }
    }

    /// Forget the previous snapshot so the next sample reports zero rates.
    ///
    /// Histories are kept.
    pub fn reset_baseline(&mut self) {
        self.previous = None;
    }

    /// Take one sample at `now` and return the view to publish.
    ///
    /// A source failure skips the history appends and only updates health.
    pub fn sample_at(&mut self, now: Instant) -> MetricsView {
        match self.read() {
            Ok((gauges, counters)) => self.record_success(gauges, counters, now),
            Err(err) => self.record_failure(err.to_string()),
        }

        self.seq += 1;
        self.view()
    }

    /// Take one sample now.
    pub fn sample(&mut self) -> MetricsView {
        self.sample_at(Instant::now())
    }

    /// The current state as a view, without sampling.
    pub fn view(&self) -> MetricsView {
        MetricsView {
            seq: self.seq,
            current: self.current,
            history: self.history.clone(),
            health: self.health.clone(),
            last_success: self.last_success,
        }
    }

    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    fn read(&mut self) -> SourceResult<(Gauges, CounterSnapshot)> {
        let gauges = self.source.current_gauges()?;
        let counters = self.source.counters()?;
        Ok((gauges, counters))
    }

    fn record_success(&mut self, gauges: Gauges, counters: CounterSnapshot, now: Instant) {
        let (throughput, baseline) = match self.previous {
            Some((previous, taken_at)) => {
                let elapsed = now.saturating_duration_since(taken_at);
                let sample = rate::derive(&previous, &counters, elapsed);
                for counter in &sample.regressions {
                    warn!(counter = *counter, "Counter went backwards, rebasing");
                }
                // Missing disk counters repeat the previous disk baseline.
                let baseline = CounterSnapshot {
                    disk: counters.disk.or(previous.disk),
                    ..counters
                };
                (sample.throughput, baseline)
            }
            None => (
                Throughput {
                    disk_available: counters.disk.is_some(),
                    ..Throughput::default()
                },
                counters,
            ),
        };

        self.current = CurrentValues {
            cpu_percent: gauges.cpu_percent,
            memory_percent: gauges.memory_percent,
            throughput,
        };
        self.history.append(&self.current);
        self.previous = Some((baseline, now));
        self.last_success = Some(now);

        if self.health.degraded {
            info!(
                failures = self.health.consecutive_failures,
                "Metrics source recovered"
            );
        }
        self.health = TrackerHealth::default();

        debug!(
            cpu = self.current.cpu_percent,
            memory = self.current.memory_percent,
            net_mb_s = throughput.network_total(),
            disk_mb_s = throughput.disk_total(),
            "Sampled"
        );
    }

    fn record_failure(&mut self, message: String) {
        self.health.consecutive_failures = self.health.consecutive_failures.saturating_add(1);
        warn!(
            error = %message,
            failures = self.health.consecutive_failures,
            "Metrics source failed, skipping sample"
        );

        if !self.health.degraded && self.health.consecutive_failures >= self.config.degraded_after
        {
            warn!(
                threshold = self.config.degraded_after,
                "Tracker health degraded"
            );
            self.health.degraded = true;
        }
        self.health.last_error = Some(message);
    }
}

/// Time elapsed since the last successful sample, if any.
pub fn since_last_success(view: &MetricsView) -> Option<Duration> {
    view.last_success.map(|at| at.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::source::ScriptedSource;

    const ONE_SEC: Duration = Duration::from_secs(1);

    fn sampler(source: ScriptedSource) -> Sampler {
        Sampler::new(Box::new(source), SamplerConfig::default())
    }

    fn unavailable() -> SourceError {
        SourceError::Unavailable("read failed".to_string())
    }

    #[test]
    fn first_sample_has_zero_rates() {
        let mut source = ScriptedSource::new();
        source.push_reading(
            Gauges::new(25.0, 50.0),
            CounterSnapshot::network(5_000_000, 7_000_000).with_disk(1, 2),
        );
        let mut sampler = sampler(source);

        let view = sampler.sample_at(Instant::now());
        assert_eq!(view.seq, 1);
        assert_eq!(view.current.cpu_percent, 25.0);
        assert_eq!(view.current.throughput.network_total(), 0.0);
        assert_eq!(view.current.throughput.disk_total(), 0.0);
        assert!(view.current.throughput.disk_available);
        assert_eq!(view.history.network.to_vec(), vec![0.0]);
    }

    #[test]
    fn sent_rate_of_one_mebibyte() {
        let mut source = ScriptedSource::new();
        source
            .push_reading(Gauges::new(0.0, 0.0), CounterSnapshot::network(1_000_000, 0))
            .push_reading(Gauges::new(0.0, 0.0), CounterSnapshot::network(2_048_576, 0));
        let mut sampler = sampler(source);

        let start = Instant::now();
        sampler.sample_at(start);
        let view = sampler.sample_at(start + ONE_SEC);
        assert!((view.current.throughput.net_sent - 1.0).abs() < 1e-9);
        assert_eq!(view.history.network.len(), 2);
    }

    #[test]
    fn regression_rebases_on_lower_value() {
        let mut source = ScriptedSource::new();
        source
            .push_reading(Gauges::new(0.0, 0.0), CounterSnapshot::network(0, 500))
            .push_reading(Gauges::new(0.0, 0.0), CounterSnapshot::network(0, 100))
            .push_reading(
                Gauges::new(0.0, 0.0),
                CounterSnapshot::network(0, 100 + 1_048_576),
            );
        let mut sampler = sampler(source);

        let start = Instant::now();
        sampler.sample_at(start);
        let view = sampler.sample_at(start + ONE_SEC);
        assert_eq!(view.current.throughput.net_recv, 0.0);

        let view = sampler.sample_at(start + 2 * ONE_SEC);
        assert!((view.current.throughput.net_recv - 1.0).abs() < 1e-9);
    }

    #[test]
    fn missing_disk_counters_keep_previous_baseline() {
        let mut source = ScriptedSource::new();
        source
            .push_reading(Gauges::new(0.0, 0.0), CounterSnapshot::network(0, 0).with_disk(0, 0))
            .push_reading(Gauges::new(0.0, 0.0), CounterSnapshot::network(0, 0))
            .push_reading(
                Gauges::new(0.0, 0.0),
                CounterSnapshot::network(0, 0).with_disk(2 * 1_048_576, 0),
            );
        let mut sampler = sampler(source);

        let start = Instant::now();
        sampler.sample_at(start);
        let view = sampler.sample_at(start + ONE_SEC);
        assert_eq!(view.current.throughput.disk_total(), 0.0);
        assert!(!view.current.throughput.disk_available);
        assert_eq!(view.history.disk.len(), 2);

        // Delta against the retained baseline of 0, over one second.
        let view = sampler.sample_at(start + 2 * ONE_SEC);
        assert!((view.current.throughput.disk_read - 2.0).abs() < 1e-9);
    }

    #[test]
    fn failures_skip_appends_and_degrade() {
        let mut source = ScriptedSource::new();
        source
            .push_reading(Gauges::new(10.0, 20.0), CounterSnapshot::network(0, 0))
            .push_failure(unavailable())
            .push_failure(unavailable())
            .push_failure(unavailable())
            .push_reading(Gauges::new(30.0, 40.0), CounterSnapshot::network(0, 0));
        let mut sampler = sampler(source);

        let start = Instant::now();
        sampler.sample_at(start);

        for i in 1..=2 {
            let view = sampler.sample_at(start + i * ONE_SEC);
            assert!(!view.health.degraded);
            assert_eq!(view.health.consecutive_failures, i);
        }

        let view = sampler.sample_at(start + 3 * ONE_SEC);
        assert!(view.health.degraded);
        assert_eq!(view.history.cpu.to_vec(), vec![10.0]);
        assert!(view.health.last_error.as_deref().unwrap_or("").contains("read failed"));

        let view = sampler.sample_at(start + 4 * ONE_SEC);
        assert!(!view.health.degraded);
        assert_eq!(view.health.consecutive_failures, 0);
        assert_eq!(view.history.cpu.to_vec(), vec![10.0, 30.0]);
    }

    #[test]
    fn counter_failure_after_gauges_skips_sample() {
        #[derive(Debug)]
        struct CountersDown;

        impl MetricsSource for CountersDown {
            fn current_gauges(&mut self) -> SourceResult<Gauges> {
                Ok(Gauges::new(50.0, 50.0))
            }
            fn counters(&mut self) -> SourceResult<CounterSnapshot> {
                Err(SourceError::PermissionDenied("net".to_string()))
            }
            fn cpu_cores(&mut self) -> SourceResult<Vec<f64>> {
                Err(SourceError::Unsupported("test".to_string()))
            }
            fn static_info(&mut self) -> SourceResult<crate::source::StaticInfo> {
                Err(SourceError::Unsupported("test".to_string()))
            }
            fn partitions(&mut self) -> SourceResult<Vec<crate::source::Partition>> {
                Ok(Vec::new())
            }
            fn interfaces(&mut self) -> SourceResult<Vec<crate::source::NetworkInterface>> {
                Ok(Vec::new())
            }
            fn processes(&mut self) -> SourceResult<Vec<crate::source::ProcessInfo>> {
                Ok(Vec::new())
            }
            fn process_detail(&mut self, pid: u32) -> SourceResult<crate::source::ProcessDetail> {
                Err(SourceError::NoSuchProcess(pid))
            }
            fn terminate(&mut self, pid: u32) -> SourceResult<()> {
                Err(SourceError::NoSuchProcess(pid))
            }
            fn description(&self) -> &str {
                "counters down"
            }
        }

        let mut sampler = Sampler::new(Box::new(CountersDown), SamplerConfig::default());
        let view = sampler.sample_at(Instant::now());
        assert!(view.history.cpu.is_empty());
        assert_eq!(view.health.consecutive_failures, 1);
    }

    #[test]
    fn reset_baseline_zeroes_next_rates_but_keeps_history() {
        let mut source = ScriptedSource::new();
        source
            .push_reading(Gauges::new(1.0, 1.0), CounterSnapshot::network(0, 0))
            .push_reading(Gauges::new(2.0, 2.0), CounterSnapshot::network(1_048_576, 0));
        let mut sampler = sampler(source);

        let start = Instant::now();
        sampler.sample_at(start);
        sampler.reset_baseline();
        let view = sampler.sample_at(start + ONE_SEC);
        assert_eq!(view.current.throughput.net_sent, 0.0);
        assert_eq!(view.history.cpu.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn history_is_bounded_by_capacity() {
        let mut sampler = Sampler::new(
            Box::new(ScriptedSource::demo()),
            SamplerConfig {
                history_capacity: 5,
                degraded_after: 3,
            },
        );
        let start = Instant::now();
        for i in 0..12 {
            sampler.sample_at(start + i * ONE_SEC);
        }
        let view = sampler.view();
        for metric in Metric::ALL {
            assert_eq!(view.history.get(metric).len(), 5);
        }
        assert_eq!(view.seq, 12);
    }
}
