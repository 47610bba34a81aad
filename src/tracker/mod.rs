//! Periodic sampling of host metrics.
//!
//! The [`Tracker`] runs a [`Sampler`] on a background Tokio task, once per
//! interval, and publishes each resulting [`MetricsView`] through a
//! `watch` channel. Readers never see a partially updated view: every
//! view is an immutable `Arc` replaced as a whole.
//!
//! ```text
//!  interval tick ──▶ Sampler::sample() ──▶ watch<Arc<MetricsView>> ──▶ UI
//!                        ▲
//!  stop() ── watch<bool> ┘ (checked between ticks)
//! ```

pub mod sampler;

pub use sampler::{
    CurrentValues, HistorySet, Metric, MetricsView, Sampler, SamplerConfig, TrackerHealth,
};

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::source::MetricsSource;

/// Lifecycle state of a [`Tracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Running,
}

/// Tracker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Nominal time between samples.
    pub interval: Duration,
    pub sampler: SamplerConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            sampler: SamplerConfig::default(),
        }
    }
}

/// The running sampling task.
#[derive(Debug)]
struct Worker {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Samples a [`MetricsSource`] in the background and publishes views.
///
/// Starts `Idle`. [`start`](Tracker::start) and [`stop`](Tracker::stop)
/// may be cycled any number of times; histories survive a stop.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use sysdash::{ScriptedSource, Tracker, TrackerConfig, TrackerState};
///
/// # tokio_test::block_on(async {
/// let mut tracker = Tracker::new(Box::new(ScriptedSource::demo()), TrackerConfig::default());
/// tracker.start();
/// assert_eq!(tracker.state(), TrackerState::Running);
///
/// let mut views = tracker.subscribe();
/// views.changed().await.unwrap();
/// assert!(views.borrow().seq >= 1);
///
/// tracker.shutdown(Duration::from_secs(1)).await;
/// assert_eq!(tracker.state(), TrackerState::Idle);
/// # });
/// ```
#[derive(Debug)]
pub struct Tracker {
    config: TrackerConfig,
    sampler: Arc<Mutex<Sampler>>,
    view_tx: Arc<watch::Sender<Arc<MetricsView>>>,
    view_rx: watch::Receiver<Arc<MetricsView>>,
    worker: Option<Worker>,
    /// Task of a previous run that was told to stop but not yet joined.
    stopping: Option<JoinHandle<()>>,
}

impl Tracker {
    pub fn new(source: Box<dyn MetricsSource>, config: TrackerConfig) -> Self {
        let sampler = Sampler::new(source, config.sampler);
        let (view_tx, view_rx) = watch::channel(Arc::new(sampler.view()));

        Self {
            config,
            sampler: Arc::new(Mutex::new(sampler)),
            view_tx: Arc::new(view_tx),
            view_rx,
            worker: None,
            stopping: None,
        }
    }

    pub fn state(&self) -> TrackerState {
        if self.worker.is_some() {
            TrackerState::Running
        } else {
            TrackerState::Idle
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Start sampling. Does nothing if already running.
    ///
    /// Must be called from within a Tokio runtime. The first sample is
    /// taken immediately and reports zero rates.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }

        self.sampler.lock().reset_baseline();

        let (stop_tx, stop_rx) = watch::channel(false);
        let sampler = Arc::clone(&self.sampler);
        let view_tx = Arc::clone(&self.view_tx);
        let interval = self.config.interval;

        let handle = tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut stop_rx = stop_rx;

            loop {
                tokio::select! {
                    // A stop that is ready at the same time as a tick wins.
                    biased;

                    changed = stop_rx.changed() => {
                        // A dropped sender also means stop.
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = interval_timer.tick() => {
                        let mut sampler = sampler.lock();
                        // Checked under the lock: a restart resets the
                        // baseline under the same lock, after signalling.
                        if *stop_rx.borrow() {
                            break;
                        }
                        // Tokio's clock follows paused time in tests.
                        let now = tokio::time::Instant::now().into_std();
                        let view = sampler.sample_at(now);
                        // Published before unlocking so views leave in seq order.
                        view_tx.send_replace(Arc::new(view));
                    }
                }
            }

            debug!("Sampling task exited");
        });

        info!(interval = ?interval, "Tracker started");
        self.worker = Some(Worker { stop_tx, handle });
    }

    /// Ask the sampling task to exit after its current iteration.
    ///
    /// Returns immediately. Calling `stop` on an idle tracker is a no-op.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        let _ = worker.stop_tx.send(true);
        info!("Tracker stopped");

        // Only the most recent stopped task can still be sampling; older
        // ones have already been asked to stop and are just winding down.
        self.stopping = Some(worker.handle);
    }

    /// Stop and wait, at most `timeout`, for the sampling task to exit.
    ///
    /// Returns `true` if the task exited in time. On timeout the stop has
    /// still been requested and the task finishes on its own.
    pub async fn shutdown(&mut self, timeout: Duration) -> bool {
        self.stop();

        let Some(handle) = self.stopping.take() else {
            return true;
        };

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(error = %err, "Sampling task ended abnormally");
                true
            }
            Err(_) => {
                warn!(?timeout, "Sampling task did not exit in time, cleanup is best-effort");
                false
            }
        }
    }

    /// Receiver of published views.
    pub fn subscribe(&self) -> watch::Receiver<Arc<MetricsView>> {
        self.view_rx.clone()
    }

    /// The most recently published view.
    pub fn latest(&self) -> Arc<MetricsView> {
        Arc::clone(&self.view_rx.borrow())
    }

    /// Current values from the most recently published view.
    pub fn current_values(&self) -> CurrentValues {
        self.view_rx.borrow().current
    }

    /// History of one metric, oldest first, from the most recently
    /// published view.
    pub fn history_of(&self, metric: Metric) -> Vec<f64> {
        self.view_rx.borrow().history.get(metric).to_vec()
    }

    /// Description of the underlying source.
    pub fn source_description(&self) -> String {
        self.sampler.lock().source_description().to_string()
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.stop();
    }
}
