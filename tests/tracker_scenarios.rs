//! End-to-end tracker behaviour through the public API.

use std::time::{Duration, Instant};

use sysdash::tracker::{Sampler, SamplerConfig};
use sysdash::{
    CounterSnapshot, Gauges, Metric, RollingHistory, ScriptedSource, SourceError, Tracker,
    TrackerConfig, TrackerState,
};

const TICK: Duration = Duration::from_secs(1);

fn tracker(source: ScriptedSource) -> Tracker {
    Tracker::new(Box::new(source), TrackerConfig::default())
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn history_keeps_the_newest_samples() {
    let mut history = RollingHistory::<f64>::new(3);
    for value in [10.0, 20.0, 30.0, 40.0] {
        history.push_clamped(value);
    }
    assert_eq!(history.to_vec(), vec![20.0, 30.0, 40.0]);
}

#[tokio::test(start_paused = true)]
async fn one_mebibyte_per_second_of_sends() {
    let mut source = ScriptedSource::new();
    source
        .push_reading(Gauges::new(5.0, 50.0), CounterSnapshot::network(1_000_000, 0))
        .push_reading(Gauges::new(5.0, 50.0), CounterSnapshot::network(2_048_576, 0));
    let mut tracker = tracker(source);

    tracker.start();
    tokio::time::sleep(TICK + TICK / 2).await;

    let values = tracker.current_values();
    assert_close(values.throughput.net_sent, 1.0);
    assert_close(values.throughput.net_recv, 0.0);
    assert_eq!(tracker.history_of(Metric::Network).len(), 2);

    assert!(tracker.shutdown(TICK).await);
}

#[tokio::test(start_paused = true)]
async fn counter_reset_rebases_on_the_lower_value() {
    let mut source = ScriptedSource::new();
    source
        .push_reading(Gauges::default(), CounterSnapshot::network(0, 500))
        .push_reading(Gauges::default(), CounterSnapshot::network(0, 100))
        .push_reading(Gauges::default(), CounterSnapshot::network(0, 100 + 1_048_576));
    let mut tracker = tracker(source);

    tracker.start();
    tokio::time::sleep(TICK + TICK / 2).await;
    assert_close(tracker.current_values().throughput.net_recv, 0.0);

    tokio::time::sleep(TICK).await;
    assert_close(tracker.current_values().throughput.net_recv, 1.0);

    let network = tracker.history_of(Metric::Network);
    assert_eq!(network.len(), 3);
    assert_close(network[0], 0.0);
    assert_close(network[1], 0.0);
    assert_close(network[2], 1.0);

    tracker.shutdown(TICK).await;
}

#[tokio::test(start_paused = true)]
async fn three_failures_degrade_without_stopping() {
    let mut source = ScriptedSource::new();
    source.push_reading(Gauges::new(10.0, 20.0), CounterSnapshot::network(0, 0));
    for _ in 0..3 {
        source.push_failure(SourceError::PermissionDenied("counters".to_string()));
    }
    source.push_reading(Gauges::new(30.0, 40.0), CounterSnapshot::network(0, 0));
    let mut tracker = tracker(source);

    tracker.start();
    tokio::time::sleep(TICK * 3 + TICK / 2).await;

    let view = tracker.latest();
    assert_eq!(tracker.state(), TrackerState::Running);
    assert_eq!(view.seq, 4);
    assert!(view.health.degraded);
    assert_eq!(view.health.consecutive_failures, 3);
    assert!(view.health.last_error.is_some());
    assert_eq!(tracker.history_of(Metric::Cpu), vec![10.0]);
    assert_eq!(tracker.history_of(Metric::Memory), vec![20.0]);

    tokio::time::sleep(TICK).await;

    let view = tracker.latest();
    assert!(!view.health.degraded);
    assert_eq!(view.health.consecutive_failures, 0);
    assert_eq!(tracker.history_of(Metric::Cpu), vec![10.0, 30.0]);
    assert_eq!(tracker.history_of(Metric::Memory), vec![20.0, 40.0]);

    tracker.shutdown(TICK).await;
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_in_every_state() {
    let mut tracker = tracker(ScriptedSource::demo());
    tracker.stop();
    assert_eq!(tracker.state(), TrackerState::Idle);

    tracker.start();
    tokio::time::sleep(TICK / 2).await;
    tracker.stop();
    tracker.stop();
    assert_eq!(tracker.state(), TrackerState::Idle);

    assert!(tracker.shutdown(TICK).await);
    assert!(tracker.shutdown(TICK).await);
}

#[tokio::test(start_paused = true)]
async fn published_sequence_never_goes_backwards() {
    let mut tracker = tracker(ScriptedSource::demo());
    let mut views = tracker.subscribe();
    tracker.start();

    let mut last_seq = 0;
    for _ in 0..5 {
        views.changed().await.unwrap();
        let view = views.borrow_and_update().clone();
        assert!(view.seq > last_seq);
        assert_eq!(view.history.cpu.len(), view.history.disk.len());
        last_seq = view.seq;
    }

    tracker.shutdown(TICK).await;
}

#[test]
fn rates_are_never_negative() {
    let mut source = ScriptedSource::new();
    let (mut sent, mut recv, mut read, mut written) = (0u64, 0u64, 0u64, 0u64);
    for step in 0..40u64 {
        // Deterministic growth with an occasional reset of every counter.
        if step % 13 == 12 {
            (sent, recv, read, written) = (step, 0, 7, 0);
        } else {
            sent += (step * 7919) % 3_000_000;
            recv += (step * 104_729) % 5_000_000;
            read += (step * 1_299_709) % 800_000;
            written += step % 4 * 65_536;
        }
        source.push_reading(
            Gauges::new(50.0, 50.0),
            CounterSnapshot::network(sent, recv).with_disk(read, written),
        );
    }

    let mut sampler = Sampler::new(Box::new(source), SamplerConfig::default());
    let start = Instant::now();
    for step in 0..40u32 {
        // Jittered intervals around one second.
        let at = start + Duration::from_millis(u64::from(step) * 1000 + u64::from(step % 3) * 40);
        let view = sampler.sample_at(at);
        let throughput = view.current.throughput;
        assert!(throughput.net_sent >= 0.0);
        assert!(throughput.net_recv >= 0.0);
        assert!(throughput.disk_read >= 0.0);
        assert!(throughput.disk_write >= 0.0);
    }

    let view = sampler.view();
    for metric in Metric::ALL {
        assert_eq!(view.history.get(metric).len(), 40);
        assert!(view.history.get(metric).iter().all(|v| *v >= 0.0));
    }
}
