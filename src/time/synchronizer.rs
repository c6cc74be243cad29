//! Step-size selection between the two solvers.

use serde::{Deserialize, Serialize};

use super::state::CouplingState;
use super::time_tolerance;
use crate::error::{ConfigError, SolverStepError};

/// Which constraint set the step size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepBound {
    /// Caller-requested cap (surface-process cadence)
    Caller,
    /// Mechanics stability limit
    Mechanics,
    /// Next checkpoint, exchange or run end
    SyncPoint,
}

/// Planned mechanics step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepPlan {
    /// Largest advance the update callback may take
    pub dt: f64,
    /// Sync point the step is limited by
    pub sync_point: f64,
    /// Tightest of the three constraints
    pub bound: StepBound,
}

/// Cadence settings for the synchronizer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Caller cap on a single mechanics step (`None` = uncapped)
    pub max_step: Option<f64>,
    /// Interval between surface exchanges (`None` = after every step)
    pub surface_interval: Option<f64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_step: None,
            surface_interval: None,
        }
    }
}

/// Chooses each mechanics step and decides when the surface catches up.
///
/// Each step is the minimum of the caller cap, the mechanics stability
/// limit and the time left to the next sync point, so checkpoints and
/// exchanges always land on a step boundary.
#[derive(Clone, Debug)]
pub struct TimeSynchronizer {
    config: SyncConfig,
}

impl TimeSynchronizer {
    pub fn new(config: SyncConfig) -> Result<Self, ConfigError> {
        if let Some(max_step) = config.max_step
            && !(max_step > 0.0)
        {
            return Err(ConfigError::NonPositiveInterval {
                name: "max_step",
                value: max_step,
            });
        }
        if let Some(interval) = config.surface_interval
            && !(interval.is_finite() && interval > 0.0)
        {
            return Err(ConfigError::NonPositiveInterval {
                name: "surface_interval",
                value: interval,
            });
        }
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Next time the run must stop at: checkpoint, exchange or `end`.
    pub fn next_sync_point(&self, state: &CouplingState, end: f64) -> f64 {
        let mut sync = end.min(state.checkpoints.next_due());
        if let Some(interval) = self.config.surface_interval {
            sync = sync.min(state.last_exchange + interval);
        }
        sync
    }

    /// Plan the next step from `now` given the mechanics stability limit.
    pub fn plan(
        &self,
        now: f64,
        mechanics_max: f64,
        sync_point: f64,
    ) -> Result<StepPlan, SolverStepError> {
        if !(mechanics_max > 0.0) {
            return Err(SolverStepError::NonPositiveStableStep(mechanics_max));
        }

        let remaining = sync_point - now;
        let caller = self.config.max_step.unwrap_or(f64::INFINITY);

        let (mut dt, mut bound) = (remaining, StepBound::SyncPoint);
        if mechanics_max < dt {
            dt = mechanics_max;
            bound = StepBound::Mechanics;
        }
        if caller < dt {
            dt = caller;
            bound = StepBound::Caller;
        }

        Ok(StepPlan {
            dt,
            sync_point,
            bound,
        })
    }

    /// Validate what the mechanics update actually advanced and move the clock.
    ///
    /// Advances within rounding of the planned step are recorded as the
    /// planned step, so the clock never moves further than the stability
    /// bound. Lands exactly on the sync point when the advance reaches it
    /// within rounding, so later sync checks see the boundary as reached.
    /// Returns the step length that was recorded.
    pub fn commit(
        &self,
        state: &mut CouplingState,
        plan: &StepPlan,
        advanced: f64,
    ) -> Result<f64, SolverStepError> {
        if !(advanced > 0.0) {
            return Err(SolverStepError::NonPositiveAdvance(advanced));
        }
        if advanced > plan.dt + time_tolerance(plan.dt) {
            return Err(SolverStepError::Overshoot {
                advanced,
                allowed: plan.dt,
            });
        }
        let advanced = advanced.min(plan.dt);

        let t = state.time + advanced;
        state.time = if (t - plan.sync_point).abs() <= time_tolerance(plan.sync_point) {
            plan.sync_point
        } else {
            t
        };
        state.steps += 1;
        Ok(advanced)
    }

    /// Whether the surface should catch up after the step just committed.
    pub fn exchange_due(&self, state: &CouplingState) -> bool {
        match self.config.surface_interval {
            None => true,
            Some(interval) => {
                let due = state.last_exchange + interval;
                state.time >= due - time_tolerance(due)
            }
        }
    }

    /// Whether `now` has reached `end`.
    #[inline]
    pub fn finished(&self, now: f64, end: f64) -> bool {
        now >= end - time_tolerance(end)
    }
}

impl Default for TimeSynchronizer {
    fn default() -> Self {
        Self {
            config: SyncConfig::default(),
        }
    }
}
