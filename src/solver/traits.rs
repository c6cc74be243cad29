//! Boundary contracts of the two external solvers.

use super::particle::Particle;
use crate::error::BoxedSolverError;
use crate::exchange::ColumnChange;
use crate::grid::ElevationGrid;

// =============================================================================
// Mechanics solver
// =============================================================================

/// Continuum-mechanics solver carrying the particle swarm.
///
/// The engine never calls into the momentum solve itself; it asks for the
/// stable step, requests advances no longer than that, and reads or retags
/// particles between steps.
///
/// # Example Implementation
///
/// ```ignore
/// impl MechanicsSolver for StokesModel {
///     fn max_stable_step(&self) -> f64 {
///         self.courant_step()
///     }
///
///     fn advance(&mut self, requested: f64) -> Result<f64, BoxedSolverError> {
///         let dt = requested.min(self.courant_step());
///         self.solve_and_advect(dt)?;
///         Ok(dt)
///     }
///
///     fn particles(&self) -> &[Particle] { &self.swarm }
///     fn particles_mut(&mut self) -> &mut [Particle] { &mut self.swarm }
/// }
/// ```
pub trait MechanicsSolver {
    /// Largest step the solver can take without losing stability.
    ///
    /// Zero or negative means the solver is not initialized.
    fn max_stable_step(&self) -> f64;

    /// Advance by at most `requested` and return the time actually advanced.
    fn advance(&mut self, requested: f64) -> Result<f64, BoxedSolverError>;

    /// Read access to the swarm.
    fn particles(&self) -> &[Particle];

    /// Write access to particle tags. A slice keeps the count fixed.
    fn particles_mut(&mut self) -> &mut [Particle];

    /// Add or remove mass for the columns changed by the last exchange.
    ///
    /// The insertion/removal policy belongs to the solver. Default does nothing.
    fn apply_mass_accounting(&mut self, _changes: &[ColumnChange]) {}

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "mechanics"
    }
}

// =============================================================================
// Surface-process solver
// =============================================================================

/// Surface-process (erosion/deposition) solver owning the DEM.
pub trait SurfaceProcessSolver {
    /// Current authoritative elevation grid.
    fn elevation(&self) -> &ElevationGrid;

    /// Replace the DEM, used to seed the solver before coupling begins.
    fn load(&mut self, dem: ElevationGrid);

    /// Run surface processes on `current` for `duration` and return the result.
    ///
    /// The solver keeps the returned grid as its new state.
    fn step(&mut self, current: &ElevationGrid, duration: f64)
    -> Result<ElevationGrid, BoxedSolverError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "surface"
    }
}
