//! Two-way field exchange between the swarm and the DEM.

use serde::{Deserialize, Serialize};

use super::report::{ColumnChange, ExchangeReport, ExchangeWarning};
use crate::error::{ExchangeError, SolverStepError};
use crate::grid::ElevationGrid;
use crate::mapping::DomainMapper;
use crate::material::{DeltaSign, MaterialClassifier};
use crate::solver::{MechanicsSolver, SurfaceProcessSolver};
use crate::types::{CellIndex, ParticleIndex};

/// Exchange settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Elevation changes with magnitude at or below this are ignored (DEM units).
    pub elevation_tolerance: f64,
    /// Rebuild the DEM from the swarm before each surface step. When off, the
    /// surface solver's own DEM is stepped as is.
    pub rebuild_from_swarm: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            elevation_tolerance: 0.0,
            rebuild_from_swarm: true,
        }
    }
}

/// One coupling half-step.
///
/// 1. Rebuild the DEM from the swarm (top of solid material per column).
/// 2. Step the surface-process solver on it.
/// 3. Reclassify the particles of every changed column.
/// 4. Hand the changed columns to the mechanics solver for mass accounting.
///
/// The engine never adds or removes particles itself.
#[derive(Clone, Debug)]
pub struct SurfaceExchange {
    mapper: DomainMapper,
    classifier: MaterialClassifier,
    config: ExchangeConfig,
}

impl SurfaceExchange {
    pub fn new(mapper: DomainMapper, classifier: MaterialClassifier) -> Self {
        Self {
            mapper,
            classifier,
            config: ExchangeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExchangeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn mapper(&self) -> &DomainMapper {
        &self.mapper
    }

    pub fn classifier(&self) -> &MaterialClassifier {
        &self.classifier
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Run one exchange covering `duration` of simulated time.
    pub fn exchange<M, S>(
        &self,
        mechanics: &mut M,
        surface: &mut S,
        duration: f64,
    ) -> Result<ExchangeReport, ExchangeError>
    where
        M: MechanicsSolver + ?Sized,
        S: SurfaceProcessSolver + ?Sized,
    {
        let registry = self.classifier.registry();
        let transform = self.mapper.transform();

        // Step 1: transient DEM for this exchange only.
        let (before, columns, mut warnings) = {
            let particles = mechanics.particles();
            if self.config.rebuild_from_swarm {
                let rebuild = self
                    .mapper
                    .rebuild_surface(surface.elevation(), particles, registry)?;
                (rebuild.grid, rebuild.columns, rebuild.warnings)
            } else {
                let before = surface.elevation().clone();
                let columns = self.mapper.locate_particles(&before, particles);
                let mut warnings = Vec::new();
                for (i, (p, column)) in particles.iter().zip(&columns).enumerate() {
                    if column.is_none() {
                        warnings.push(ExchangeWarning::ParticleOutsideGrid {
                            particle: ParticleIndex::new(i),
                            x: p.x(),
                            y: p.y(),
                        });
                    }
                }
                (before, columns, warnings)
            }
        };

        // Step 2
        let after = surface
            .step(&before, duration)
            .map_err(SolverStepError::Surface)?;
        check_shape(&before, &after)?;
        check_finite(&after)?;

        // Step 3: changed columns over the mechanics footprint.
        let cols = before.cols();
        let mut change_of = vec![None; before.resolution().total_nodes()];
        let mut changes = Vec::new();
        let mut max_abs_delta: f64 = 0.0;
        for (offset, (&old, &new)) in before.data().iter().zip(after.data()).enumerate() {
            let delta = new - old;
            if delta.abs() <= self.config.elevation_tolerance {
                continue;
            }
            let cell = CellIndex::from_linear(offset, cols);
            if self.mapper.column_in_mechanics(&before, cell).is_err() {
                tracing::trace!(%cell, "changed column outside mechanics footprint");
                warnings.push(ExchangeWarning::CellOutsideMechanics { cell });
                continue;
            }
            max_abs_delta = max_abs_delta.max(delta.abs());
            change_of[offset] = Some(changes.len());
            changes.push(ColumnChange {
                cell,
                delta,
                old_height: old,
                new_height: new,
                deposited: Vec::new(),
                eroded: Vec::new(),
            });
        }

        let footprint = self.mapper.mechanics_bounds().horizontal();
        let mut n_deposited = 0;
        let mut n_eroded = 0;
        for (i, (particle, column)) in mechanics
            .particles_mut()
            .iter_mut()
            .zip(&columns)
            .enumerate()
        {
            let within = column.is_some() && footprint.contains(particle.x(), particle.y());
            let change = match column.and_then(|cell| change_of[cell.linear(cols)]) {
                Some(k) => Some(&mut changes[k]),
                None => None,
            };

            // Delta seen by this particle. Compared in the DEM frame, where
            // elevation grows upward whatever the mechanics z convention.
            let delta = match &change {
                Some(change) => {
                    let z = transform.height_to_dem(particle.z());
                    match DeltaSign::of(change.delta) {
                        DeltaSign::Deposition if z <= change.new_height => change.delta,
                        DeltaSign::Erosion if z > change.new_height => change.delta,
                        _ => 0.0,
                    }
                }
                None => 0.0,
            };

            let old_tag = particle.tag;
            let new_tag = self.classifier.classify(old_tag, delta, within)?;
            if new_tag == old_tag {
                continue;
            }
            particle.tag = new_tag;
            if let Some(change) = change {
                if delta > 0.0 {
                    change.deposited.push(ParticleIndex::new(i));
                    n_deposited += 1;
                } else {
                    change.eroded.push(ParticleIndex::new(i));
                    n_eroded += 1;
                }
            }
        }

        // Step 4
        if !changes.is_empty() {
            mechanics.apply_mass_accounting(&changes);
        }

        let report = ExchangeReport {
            duration,
            changes,
            n_deposited,
            n_eroded,
            max_abs_delta,
            warnings,
        };

        if !report.warnings.is_empty() {
            tracing::warn!(
                skipped = report.warnings.len(),
                "surface exchange skipped units outside the complementary domain"
            );
        }
        tracing::debug!("surface exchange: {}", report.summary_line());

        Ok(report)
    }
}

fn check_shape(before: &ElevationGrid, after: &ElevationGrid) -> Result<(), SolverStepError> {
    if before.same_shape(after) {
        Ok(())
    } else {
        Err(SolverStepError::GridShapeChanged {
            rows: before.rows(),
            cols: before.cols(),
            got_rows: after.rows(),
            got_cols: after.cols(),
        })
    }
}

fn check_finite(grid: &ElevationGrid) -> Result<(), SolverStepError> {
    match grid.data().iter().position(|z| !z.is_finite()) {
        None => Ok(()),
        Some(offset) => Err(SolverStepError::NonFiniteElevation {
            cell: CellIndex::from_linear(offset, grid.cols()),
            value: grid.data()[offset],
        }),
    }
}
