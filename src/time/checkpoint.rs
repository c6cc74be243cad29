//! Fixed-interval checkpoint trigger.

use serde::{Deserialize, Serialize};

use super::time_tolerance;
use crate::error::ConfigError;

/// Fires once per interval boundary crossed, in increasing sequence order.
///
/// A pure counter: boundary `k` lies at `k * interval`, and the scheduler
/// only remembers how many boundaries have fired. What gets persisted is
/// up to the caller.
///
/// ```
/// use surface_linkage::time::CheckpointScheduler;
///
/// let mut scheduler = CheckpointScheduler::new(10.0).unwrap();
/// assert_eq!(scheduler.pop_due(9.0), None);
/// // one step spanning two boundaries fires twice
/// assert_eq!(scheduler.pop_due(25.0), Some(1));
/// assert_eq!(scheduler.pop_due(25.0), Some(2));
/// assert_eq!(scheduler.pop_due(25.0), None);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckpointScheduler {
    interval: f64,
    /// Sequence number of the last checkpoint fired (0 = none yet)
    sequence: u64,
}

impl CheckpointScheduler {
    pub fn new(interval: f64) -> Result<Self, ConfigError> {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(ConfigError::NonPositiveInterval {
                name: "checkpoint_interval",
                value: interval,
            });
        }
        Ok(Self {
            interval,
            sequence: 0,
        })
    }

    #[inline]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Sequence number of the last checkpoint fired.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Simulated time of the next boundary.
    #[inline]
    pub fn next_due(&self) -> f64 {
        (self.sequence + 1) as f64 * self.interval
    }

    /// Whether the next boundary has been reached at `elapsed`.
    #[inline]
    pub fn is_due(&self, elapsed: f64) -> bool {
        let due = self.next_due();
        elapsed >= due - time_tolerance(due)
    }

    /// Consume the next boundary reached by `elapsed`, returning its sequence number.
    ///
    /// Call repeatedly until `None` to fire every boundary a long step crossed.
    pub fn pop_due(&mut self, elapsed: f64) -> Option<u64> {
        if self.is_due(elapsed) {
            self.sequence += 1;
            Some(self.sequence)
        } else {
            None
        }
    }
}
