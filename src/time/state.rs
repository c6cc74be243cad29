//! Run-wide counters carried through the coupling loop.

use serde::{Deserialize, Serialize};

use super::checkpoint::CheckpointScheduler;
use crate::error::ConfigError;

/// Explicit state of one coupling run.
///
/// Passed through the run loop by value rather than kept globally, so
/// several runs can coexist. Serializable so a checkpoint callback can
/// persist it and a later run can resume from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CouplingState {
    /// Simulated time
    pub time: f64,
    /// Coupling steps taken
    pub steps: u64,
    /// Surface exchanges performed
    pub exchanges: u64,
    /// Simulated time of the last exchange
    pub last_exchange: f64,
    /// Checkpoint counter
    pub checkpoints: CheckpointScheduler,
}

impl CouplingState {
    /// Fresh state at t = 0.
    pub fn new(checkpoint_interval: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            time: 0.0,
            steps: 0,
            exchanges: 0,
            last_exchange: 0.0,
            checkpoints: CheckpointScheduler::new(checkpoint_interval)?,
        })
    }

    /// Simulated time accumulated since the last exchange.
    #[inline]
    pub fn since_exchange(&self) -> f64 {
        self.time - self.last_exchange
    }

    /// Record an exchange at the current time.
    pub fn mark_exchange(&mut self) {
        self.exchanges += 1;
        self.last_exchange = self.time;
    }
}
