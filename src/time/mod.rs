//! Simulated-time bookkeeping for the coupling loop.
//!
//! - [`TimeSynchronizer`]: picks each mechanics step and the exchange cadence
//! - [`CheckpointScheduler`]: fires on fixed-interval boundaries
//! - [`CouplingState`]: explicit run state, serializable for resume

mod checkpoint;
mod state;
mod synchronizer;

pub use checkpoint::CheckpointScheduler;
pub use state::CouplingState;
pub use synchronizer::{StepBound, StepPlan, SyncConfig, TimeSynchronizer};

/// Relative tolerance for comparing simulated times.
pub const TIME_RTOL: f64 = 1e-10;

/// Absolute tolerance used when comparing a time against `reference`.
#[inline]
pub(crate) fn time_tolerance(reference: f64) -> f64 {
    TIME_RTOL * reference.abs().max(1.0)
}
