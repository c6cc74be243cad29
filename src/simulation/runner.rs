//! Coupling runner.
//!
//! Drives the mechanics solver forward step by step, lets the surface
//! solver catch up at the configured cadence, and fires checkpoints on a
//! fixed simulated-time interval.

use std::path::Path;

use super::config::LinkageConfig;
use super::summary::RunSummary;
use crate::error::{
    BoxedSolverError, ConfigError, ExchangeError, LinkageError, LinkageResult, OutOfDomain,
    SolverStepError,
};
use crate::exchange::SurfaceExchange;
use crate::grid::{ElevationGrid, GeoTiffDem};
use crate::mapping::DomainMapper;
use crate::solver::{MechanicsSolver, SurfaceProcessSolver};
use crate::time::{CouplingState, TimeSynchronizer};

/// Relative slack when comparing a DEM's extent with the configured one.
const SHAPE_TOLERANCE: f64 = 1e-9;

// =============================================================================
// Checkpoint context
// =============================================================================

/// What a checkpoint callback gets to see.
pub struct Checkpoint<'a, M: ?Sized, S: ?Sized> {
    /// 1 for the first checkpoint of the run history, then 2, 3, ...
    pub sequence: u64,
    /// Simulated time at which the checkpoint fired
    pub elapsed: f64,
    pub mechanics: &'a M,
    pub surface: &'a S,
    /// Full run state, suitable for persisting and later [`LinkageModel::resume`]
    pub state: &'a CouplingState,
}

// =============================================================================
// Linkage model
// =============================================================================

/// Couples a mechanics solver and a surface-process solver.
///
/// # Type Parameters
///
/// * `M` - Mechanics solver carrying the particle swarm
/// * `S` - Surface-process solver owning the DEM
///
/// # Example
///
/// ```ignore
/// let config = LinkageConfig::from_toml_file("linkage.toml")?;
/// let mut model = LinkageModel::new(config, stokes, landscape)?;
/// let summary = model.run_for_with(
///     1.0e6,
///     |mechanics, dt| mechanics.advance(dt),
///     |cp| println!("checkpoint {} at t = {}", cp.sequence, cp.elapsed),
/// )?;
/// ```
pub struct LinkageModel<M, S>
where
    M: MechanicsSolver,
    S: SurfaceProcessSolver,
{
    mechanics: M,
    surface: S,
    exchange: SurfaceExchange,
    synchronizer: TimeSynchronizer,
    config: LinkageConfig,
    state: CouplingState,
}

impl<M, S> LinkageModel<M, S>
where
    M: MechanicsSolver,
    S: SurfaceProcessSolver,
{
    /// Validate `config` and wire the two solvers together.
    ///
    /// Seeds the surface solver with a flat DEM when `initial_elevation` is set.
    pub fn new(config: LinkageConfig, mechanics: M, mut surface: S) -> Result<Self, ConfigError> {
        config.validate()?;

        let exchange = config.build_exchange()?;
        let synchronizer = TimeSynchronizer::new(config.sync_config())?;
        let state = CouplingState::new(config.checkpoint_interval)?;

        if let Some(elevation) = config.initial_elevation {
            surface.load(exchange.mapper().flat_dem(elevation));
        }

        Ok(Self {
            mechanics,
            surface,
            exchange,
            synchronizer,
            config,
            state,
        })
    }

    pub fn mechanics(&self) -> &M {
        &self.mechanics
    }

    pub fn mechanics_mut(&mut self) -> &mut M {
        &mut self.mechanics
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &LinkageConfig {
        &self.config
    }

    pub fn mapper(&self) -> &DomainMapper {
        self.exchange.mapper()
    }

    pub fn state(&self) -> &CouplingState {
        &self.state
    }

    /// Simulated time reached so far.
    pub fn elapsed(&self) -> f64 {
        self.state.time
    }

    /// Give the solvers back.
    pub fn into_parts(self) -> (M, S) {
        (self.mechanics, self.surface)
    }

    /// Surface height under a mechanics position, mechanics frame.
    pub fn elevation_at(&self, x: f64, y: f64) -> Result<f64, OutOfDomain> {
        self.exchange
            .mapper()
            .elevation_at(self.surface.elevation(), x, y)
    }

    /// Seed the surface solver with a flat DEM on the configured lattice.
    pub fn seed_flat_dem(&mut self, elevation: f64) {
        let dem = self.exchange.mapper().flat_dem(elevation);
        self.surface.load(dem);
    }

    /// Seed the surface solver with an existing DEM.
    pub fn seed_dem(&mut self, dem: ElevationGrid) -> Result<(), ConfigError> {
        self.check_dem_shape(&dem)?;
        self.surface.load(dem);
        Ok(())
    }

    /// Seed the surface solver from a single-band GeoTIFF.
    ///
    /// Rasters without georeferencing are placed on the configured DEM extent.
    pub fn seed_geotiff<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let dem = GeoTiffDem::new()
            .with_bounds(*self.exchange.mapper().dem_bounds())
            .load(path)?;
        self.seed_dem(dem)
    }

    /// Continue from a state persisted at a checkpoint.
    ///
    /// The solvers must already hold the matching particle swarm and DEM.
    pub fn resume(&mut self, state: CouplingState) -> Result<(), ConfigError> {
        let interval = state.checkpoints.interval();
        if !(interval.is_finite() && interval > 0.0) {
            return Err(ConfigError::NonPositiveInterval {
                name: "checkpoint_interval",
                value: interval,
            });
        }
        if !(state.time.is_finite() && state.time >= 0.0) {
            return Err(ConfigError::NonPositiveDuration(state.time));
        }
        tracing::info!(
            t = state.time,
            steps = state.steps,
            checkpoint = state.checkpoints.sequence(),
            "resuming coupling run"
        );
        self.state = state;
        Ok(())
    }

    /// Run for `duration` of simulated time using [`MechanicsSolver::advance`].
    pub fn run_for(&mut self, duration: f64) -> LinkageResult<RunSummary> {
        self.run_for_with(duration, |mechanics, dt| mechanics.advance(dt), |_| {})
    }

    /// Run for `duration` of simulated time with custom callbacks.
    ///
    /// # Arguments
    /// * `duration` - Simulated time to add to the current state
    /// * `update` - Advances the mechanics by at most the given step, returns the step taken
    /// * `checkpoint` - Called once per checkpoint boundary crossed, in order
    ///
    /// Each coupling step runs the mechanics update, then the surface
    /// exchange when due, then any checkpoints that fell due.
    pub fn run_for_with<U, C>(
        &mut self,
        duration: f64,
        mut update: U,
        mut checkpoint: C,
    ) -> LinkageResult<RunSummary>
    where
        U: FnMut(&mut M, f64) -> Result<f64, BoxedSolverError>,
        C: FnMut(Checkpoint<'_, M, S>),
    {
        self.validate_run(duration)?;

        let start_wall = std::time::Instant::now();
        let end = self.state.time + duration;
        let mut summary = RunSummary::start(self.state.clone());

        tracing::info!(
            mechanics = self.mechanics.name(),
            surface = self.surface.name(),
            t_start = self.state.time,
            t_end = end,
            particles = self.mechanics.particles().len(),
            "starting coupling run"
        );

        while !self.synchronizer.finished(self.state.time, end) {
            // Step size
            let sync_point = self.synchronizer.next_sync_point(&self.state, end);
            let plan = self
                .synchronizer
                .plan(self.state.time, self.mechanics.max_stable_step(), sync_point)
                .map_err(|e| self.step_error(e))?;

            // Mechanics
            let advanced = update(&mut self.mechanics, plan.dt)
                .map_err(|e| self.step_error(SolverStepError::Mechanics(e)))?;
            let dt = self
                .synchronizer
                .commit(&mut self.state, &plan, advanced)
                .map_err(|e| self.step_error(e))?;
            summary.record_step(dt);

            tracing::debug!(
                step = self.state.steps,
                t = self.state.time,
                dt,
                bound = ?plan.bound,
                "mechanics step"
            );

            // Surface exchange
            if self.synchronizer.exchange_due(&self.state) {
                let interval = self.state.since_exchange();
                let report = self
                    .exchange
                    .exchange(&mut self.mechanics, &mut self.surface, interval)
                    .map_err(|e| match e {
                        ExchangeError::Config(e) => LinkageError::Configuration(e),
                        ExchangeError::Solver(e) => self.step_error(e),
                    })?;
                self.state.mark_exchange();
                summary.record_exchange(report);
            }

            // Checkpoints
            while let Some(sequence) = self.state.checkpoints.pop_due(self.state.time) {
                tracing::debug!(sequence, t = self.state.time, "checkpoint");
                checkpoint(Checkpoint {
                    sequence,
                    elapsed: self.state.time,
                    mechanics: &self.mechanics,
                    surface: &self.surface,
                    state: &self.state,
                });
                summary.n_checkpoints += 1;
            }
        }

        summary.final_time = self.state.time;
        summary.state = self.state.clone();
        summary.wall_time = start_wall.elapsed().as_secs_f64();

        tracing::info!(
            t = summary.final_time,
            steps = summary.n_steps,
            exchanges = summary.n_exchanges,
            checkpoints = summary.n_checkpoints,
            deposited = summary.n_deposited,
            eroded = summary.n_eroded,
            wall_time = summary.wall_time,
            "coupling run complete"
        );

        Ok(summary)
    }

    /// Checks that can only be made once the solvers are in place.
    fn validate_run(&self, duration: f64) -> Result<(), ConfigError> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(ConfigError::NonPositiveDuration(duration));
        }
        let max_step = self.mechanics.max_stable_step();
        if !(max_step > 0.0) {
            return Err(ConfigError::SolverNotInitialized(max_step));
        }
        self.check_dem_shape(self.surface.elevation())
    }

    fn check_dem_shape(&self, dem: &ElevationGrid) -> Result<(), ConfigError> {
        let mapper = self.exchange.mapper();
        let expected = mapper.dem_bounds();
        let tol = SHAPE_TOLERANCE * expected.width().max(expected.height());
        let same_extent = expected.covers(dem.bounds(), tol) && dem.bounds().covers(expected, tol);

        if dem.resolution() != mapper.resolution() || !same_extent {
            return Err(ConfigError::DemShapeMismatch {
                expected: format!("{} over {}", mapper.resolution(), expected),
                got: format!("{} over {}", dem.resolution(), dem.bounds()),
            });
        }
        Ok(())
    }

    fn step_error(&self, source: SolverStepError) -> LinkageError {
        tracing::warn!(t = self.state.time, steps = self.state.steps, error = %source, "coupling step failed");
        LinkageError::SolverStep {
            source,
            elapsed: self.state.time,
            steps: self.state.steps,
        }
    }
}
