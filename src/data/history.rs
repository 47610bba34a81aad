//! Fixed-capacity rolling history for charts and sparklines.

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

/// Number of samples kept per metric unless configured otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

/// The most recent `capacity` samples of a metric, oldest first.
///
/// Pushing onto a full history evicts the oldest sample. The length never
/// exceeds the capacity.
///
/// # Example
///
/// ```
/// use sysdash::RollingHistory;
///
/// let mut history = RollingHistory::new(3);
/// for value in [10.0, 20.0, 30.0, 40.0] {
///     history.push(value);
/// }
/// assert_eq!(history.to_vec(), vec![20.0, 30.0, 40.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RollingHistory<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingHistory<T> {
    /// Create an empty history. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one if full.
    pub fn push(&mut self, value: T) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recent sample.
    pub fn latest(&self) -> Option<&T> {
        self.values.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.values.iter()
    }
}

impl<T: Clone> RollingHistory<T> {
    /// Copy the samples out, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.values.iter().cloned().collect()
    }
}

impl RollingHistory<f64> {
    /// Append a rate or percentage, flooring negative and NaN values to zero.
    pub fn push_clamped(&mut self, value: f64) {
        self.push(if value.is_nan() { 0.0 } else { value.max(0.0) });
    }

    /// Largest sample, or zero when empty.
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

/// Serializes as a plain sequence, oldest first.
impl<T: Serialize> Serialize for RollingHistory<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.values.iter())
    }
}

impl Default for RollingHistory<f64> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
