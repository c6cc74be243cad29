//! # surface-linkage
//!
//! Couples a Lagrangian particle-swarm mechanics solver with a regular-grid
//! surface-process (erosion/deposition) solver.
//!
//! This crate provides the glue between the two:
//! - Geometry and index types for both domains
//! - A material-tag registry and a data-driven reclassification rule
//! - Field mapping between the swarm and the DEM lattice
//! - The surface exchange (swarm → DEM → surface step → retagging)
//! - Step synchronization and fixed-interval checkpoints
//! - A façade that owns both solvers and runs the coupled loop
//!
//! The solvers themselves are external and plug in through
//! [`MechanicsSolver`] and [`SurfaceProcessSolver`].
//!
//! Logging goes through `tracing`; install a subscriber in the binary to
//! see it.

pub mod error;
pub mod exchange;
pub mod grid;
pub mod mapping;
pub mod material;
pub mod simulation;
pub mod solver;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use error::{
    BoxedSolverError, ConfigError, ExchangeError, LinkageError, LinkageResult, OutOfDomain,
    SolverStepError,
};
pub use types::{Bounds2D, Bounds3D, CellIndex, GridResolution, ParticleIndex};

// Materials
pub use material::{
    DeltaSign, MaterialClass, MaterialClassifier, MaterialEntry, MaterialRegistry, MaterialTag,
};

// Grid and mapping
pub use grid::{ElevationGrid, ElevationStatistics, GeoTiffDem};
pub use mapping::{AxisMap, DomainMapper, DomainTransform, SurfaceRebuild, generate_flat_dem};

// Solvers and exchange
pub use exchange::{ColumnChange, ExchangeConfig, ExchangeReport, ExchangeWarning, SurfaceExchange};
pub use solver::{MechanicsSolver, Particle, SurfaceProcessSolver};

// Time and orchestration
pub use simulation::{Checkpoint, LinkageConfig, LinkageModel, RunSummary};
pub use time::{CheckpointScheduler, CouplingState, StepBound, StepPlan, SyncConfig, TimeSynchronizer};
