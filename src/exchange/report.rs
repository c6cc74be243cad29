//! Outcome of one surface exchange.

use std::fmt;

use crate::types::{CellIndex, ParticleIndex};

/// A unit skipped during an exchange because it lies outside the other domain.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeWarning {
    /// DEM column whose node is outside the mechanics footprint.
    CellOutsideMechanics { cell: CellIndex },
    /// Particle whose horizontal position maps outside the DEM.
    ParticleOutsideGrid {
        particle: ParticleIndex,
        x: f64,
        y: f64,
    },
}

impl fmt::Display for ExchangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeWarning::CellOutsideMechanics { cell } => {
                write!(f, "column {} lies outside the mechanics domain", cell)
            }
            ExchangeWarning::ParticleOutsideGrid { particle, x, y } => {
                write!(f, "particle {} at ({:.3}, {:.3}) lies outside the DEM", particle, x, y)
            }
        }
    }
}

/// One DEM column whose elevation changed, with the particles that were retagged.
///
/// Handed to the mechanics solver for mass accounting: the solver decides
/// whether to insert, reuse or remove particles.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChange {
    pub cell: CellIndex,
    /// Elevation change in DEM units, positive for deposition
    pub delta: f64,
    /// Elevation before the surface-process step (DEM frame)
    pub old_height: f64,
    /// Elevation after the surface-process step (DEM frame)
    pub new_height: f64,
    /// Particles retagged to the deposited tag
    pub deposited: Vec<ParticleIndex>,
    /// Particles retagged to the eroded tag
    pub eroded: Vec<ParticleIndex>,
}

impl ColumnChange {
    #[inline]
    pub fn is_deposition(&self) -> bool {
        self.delta > 0.0
    }

    #[inline]
    pub fn is_erosion(&self) -> bool {
        self.delta < 0.0
    }
}

/// Summary of one exchange.
#[derive(Debug, Clone, Default)]
pub struct ExchangeReport {
    /// Coupling interval handed to the surface solver
    pub duration: f64,
    /// Changed columns inside the mechanics footprint
    pub changes: Vec<ColumnChange>,
    /// Number of particles retagged by deposition
    pub n_deposited: usize,
    /// Number of particles retagged by erosion
    pub n_eroded: usize,
    /// Largest absolute elevation change (DEM units)
    pub max_abs_delta: f64,
    /// Skipped cells and particles
    pub warnings: Vec<ExchangeWarning>,
}

impl ExchangeReport {
    /// Total particles retagged.
    #[inline]
    pub fn n_reclassified(&self) -> usize {
        self.n_deposited + self.n_eroded
    }

    /// One-line summary for logs.
    pub fn summary_line(&self) -> String {
        format!(
            "dt={:.3e} changed_columns={} deposited={} eroded={} max|dz|={:.3e} warnings={}",
            self.duration,
            self.changes.len(),
            self.n_deposited,
            self.n_eroded,
            self.max_abs_delta,
            self.warnings.len()
        )
    }
}
