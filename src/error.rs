//! Error types for the linkage engine.
//!
//! Failures fall into three groups:
//! - [`ConfigError`]: invalid setup, always reported before any simulation work.
//! - [`OutOfDomain`]: a point outside the complementary domain. Inside a
//!   coupling step this is downgraded to a recorded warning.
//! - [`SolverStepError`]: a solver callback failed or reported an unusable step.
//!   Wrapped in [`LinkageError::SolverStep`] together with the simulated time
//!   reached so far.

use std::error::Error as StdError;

use thiserror::Error;

use crate::material::MaterialTag;
use crate::types::CellIndex;

/// Boxed error returned by external solver callbacks.
pub type BoxedSolverError = Box<dyn StdError + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type LinkageResult<T> = Result<T, LinkageError>;

/// Invalid or inconsistent configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No material tags were registered.
    #[error("material registry is empty")]
    EmptyRegistry,

    /// A tag id was registered twice.
    #[error("material tag {0} registered more than once")]
    DuplicateTag(MaterialTag),

    /// A tag was used that is not part of the registry.
    #[error("material tag {0} is not registered")]
    UnregisteredTag(MaterialTag),

    /// The deposition target is itself air-like.
    #[error("deposited target tag {0} is classified as air-like")]
    AirLikeDepositTarget(MaterialTag),

    /// Bounds with zero or negative extent along an axis.
    #[error("degenerate bounds along {axis}: min {min} must be less than max {max}")]
    DegenerateBounds {
        axis: &'static str,
        min: f64,
        max: f64,
    },

    /// Grid resolution too small for bilinear interpolation.
    #[error("grid resolution {rows}x{cols} needs at least 2 nodes per axis")]
    ZeroResolution { rows: usize, cols: usize },

    /// Checkpoint or exchange interval is not a positive finite number.
    #[error("{name} must be positive and finite, got {value}")]
    NonPositiveInterval { name: &'static str, value: f64 },

    /// Requested run duration is not a positive finite number.
    #[error("run duration must be positive and finite, got {0}")]
    NonPositiveDuration(f64),

    /// Coordinate transform with a zero or non-finite scale.
    #[error("invalid transform on axis {axis}: scale {scale}, offset {offset}")]
    InvalidTransform {
        axis: &'static str,
        scale: f64,
        offset: f64,
    },

    /// The DEM does not cover the horizontal extent of the mechanics domain.
    #[error("DEM bounds {dem} do not cover the mechanics footprint {mechanics}")]
    DemDoesNotCover { dem: String, mechanics: String },

    /// The surface solver's DEM does not sit on the configured lattice.
    #[error("surface DEM is {got}, expected {expected}")]
    DemShapeMismatch { expected: String, got: String },

    /// The mechanics solver reports no usable stable step before the run.
    #[error("mechanics solver not initialized: max stable step is {0}")]
    SolverNotInitialized(f64),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration could not be written out.
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Lattice data length does not match its resolution.
    #[error("grid data has {got} values, expected {expected}")]
    DataSizeMismatch { expected: usize, got: usize },

    /// A lattice index outside the grid.
    #[error("cell {cell} lies outside the {rows}x{cols} lattice")]
    CellOutsideGrid {
        cell: CellIndex,
        rows: usize,
        cols: usize,
    },

    /// Raster data could not be decoded.
    #[error("raster error: {0}")]
    Raster(String),
}

/// A horizontal position outside the grid or the mechanics footprint.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("position ({x}, {y}) lies outside the {domain} domain")]
pub struct OutOfDomain {
    pub x: f64,
    pub y: f64,
    pub domain: &'static str,
}

impl OutOfDomain {
    pub(crate) fn grid(x: f64, y: f64) -> Self {
        Self { x, y, domain: "grid" }
    }

    pub(crate) fn mechanics(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            domain: "mechanics",
        }
    }
}

/// Failure of one of the external solvers during a coupling step.
#[derive(Debug, Error)]
pub enum SolverStepError {
    /// The mechanics solver reported a zero or negative stable step mid-run.
    #[error("mechanics solver reported non-positive stable step {0}")]
    NonPositiveStableStep(f64),

    /// The update callback advanced by zero or a negative amount.
    #[error("mechanics update advanced by non-positive duration {0}")]
    NonPositiveAdvance(f64),

    /// The update callback advanced further than it was allowed to.
    #[error("mechanics update advanced {advanced} but at most {allowed} was allowed")]
    Overshoot { advanced: f64, allowed: f64 },

    /// The surface solver returned a DEM of a different shape.
    #[error("surface solver returned a {got_rows}x{got_cols} grid, expected {rows}x{cols}")]
    GridShapeChanged {
        rows: usize,
        cols: usize,
        got_rows: usize,
        got_cols: usize,
    },

    /// The surface solver returned a NaN or infinite elevation.
    #[error("surface solver returned non-finite elevation {value} at cell {cell}")]
    NonFiniteElevation { cell: CellIndex, value: f64 },

    /// The mechanics update callback failed.
    #[error("mechanics solver failed: {0}")]
    Mechanics(#[source] BoxedSolverError),

    /// The surface-process step failed.
    #[error("surface-process solver failed: {0}")]
    Surface(#[source] BoxedSolverError),
}

/// Failure inside one surface exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Solver(#[from] SolverStepError),
}

/// Top-level error of the linkage engine.
#[derive(Debug, Error)]
pub enum LinkageError {
    /// Fatal, raised before the simulation starts.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Recoverable when raised inside a coupling step.
    #[error(transparent)]
    OutOfDomain(#[from] OutOfDomain),

    /// Fatal, carries the simulated time reached before the failure.
    #[error("solver step failed at t = {elapsed} after {steps} coupling steps: {source}")]
    SolverStep {
        #[source]
        source: SolverStepError,
        elapsed: f64,
        steps: u64,
    },
}

impl LinkageError {
    /// Simulated time reached before a solver failure, if this is one.
    pub fn elapsed(&self) -> Option<f64> {
        match self {
            LinkageError::SolverStep { elapsed, .. } => Some(*elapsed),
            _ => None,
        }
    }

    /// Whether the engine would skip the affected unit and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LinkageError::OutOfDomain(_))
    }
}
