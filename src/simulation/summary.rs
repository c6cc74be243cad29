//! Statistics of a finished coupling run.

use std::fmt;

use crate::exchange::ExchangeReport;
use crate::time::CouplingState;

/// Result of [`LinkageModel::run_for`](super::LinkageModel::run_for).
#[derive(Clone, Debug)]
pub struct RunSummary {
    /// Simulated time reached
    pub final_time: f64,
    /// Coupling steps taken in this run
    pub n_steps: u64,
    /// Surface exchanges performed in this run
    pub n_exchanges: u64,
    /// Checkpoints fired in this run
    pub n_checkpoints: u64,
    /// Smallest mechanics step
    pub dt_min: f64,
    /// Largest mechanics step
    pub dt_max: f64,
    /// Particles retagged by deposition
    pub n_deposited: usize,
    /// Particles retagged by erosion
    pub n_eroded: usize,
    /// Cells and particles skipped across all exchanges
    pub n_warnings: usize,
    /// Report of the most recent exchange
    pub last_exchange: Option<ExchangeReport>,
    /// Wall-clock seconds
    pub wall_time: f64,
    /// State to hand to [`LinkageModel::resume`](super::LinkageModel::resume)
    pub state: CouplingState,
}

impl RunSummary {
    pub(crate) fn start(state: CouplingState) -> Self {
        Self {
            final_time: state.time,
            n_steps: 0,
            n_exchanges: 0,
            n_checkpoints: 0,
            dt_min: f64::INFINITY,
            dt_max: 0.0,
            n_deposited: 0,
            n_eroded: 0,
            n_warnings: 0,
            last_exchange: None,
            wall_time: 0.0,
            state,
        }
    }

    pub(crate) fn record_step(&mut self, dt: f64) {
        self.n_steps += 1;
        self.dt_min = self.dt_min.min(dt);
        self.dt_max = self.dt_max.max(dt);
    }

    pub(crate) fn record_exchange(&mut self, report: ExchangeReport) {
        self.n_exchanges += 1;
        self.n_deposited += report.n_deposited;
        self.n_eroded += report.n_eroded;
        self.n_warnings += report.warnings.len();
        self.last_exchange = Some(report);
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run complete:")?;
        writeln!(f, "  t = {:.4e}", self.final_time)?;
        writeln!(
            f,
            "  Steps: {}, exchanges: {}, checkpoints: {}",
            self.n_steps, self.n_exchanges, self.n_checkpoints
        )?;
        if self.n_steps > 0 {
            writeln!(f, "  dt range: [{:.2e}, {:.2e}]", self.dt_min, self.dt_max)?;
        }
        writeln!(
            f,
            "  Reclassified: {} deposited, {} eroded ({} skipped)",
            self.n_deposited, self.n_eroded, self.n_warnings
        )?;
        write!(f, "  Wall time: {:.2}s", self.wall_time)
    }
}
