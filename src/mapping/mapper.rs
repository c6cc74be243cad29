//! Translation between the scattered swarm and the regular DEM lattice.

use super::transform::DomainTransform;
use crate::error::{ConfigError, OutOfDomain};
use crate::exchange::ExchangeWarning;
use crate::grid::ElevationGrid;
use crate::material::MaterialRegistry;
use crate::solver::Particle;
use crate::types::{Bounds2D, Bounds3D, CellIndex, GridResolution, ParticleIndex};

/// Relative slack used when comparing bounds across the two frames.
const COVER_TOLERANCE: f64 = 1e-9;

/// Generate a DEM with every node at `elevation`.
///
/// ```
/// use surface_linkage::mapping::generate_flat_dem;
/// use surface_linkage::types::{Bounds2D, GridResolution};
///
/// let dem = generate_flat_dem(Bounds2D::new(0.0, 1e5, 0.0, 1e5), GridResolution::square(180), 0.0);
/// assert_eq!(dem.sample_bilinear(5e4, 5e4), Some(0.0));
/// ```
pub fn generate_flat_dem(
    bounds: Bounds2D,
    resolution: GridResolution,
    elevation: f64,
) -> ElevationGrid {
    ElevationGrid::filled(bounds, resolution, elevation)
}

/// Result of aggregating the swarm onto the lattice.
#[derive(Clone, Debug)]
pub struct SurfaceRebuild {
    /// DEM whose columns hold the top of solid material
    pub grid: ElevationGrid,
    /// Column of each particle, `None` for particles off the grid
    pub columns: Vec<Option<CellIndex>>,
    /// Skipped cells and particles
    pub warnings: Vec<ExchangeWarning>,
}

/// Maps positions and fields between the mechanics domain and the DEM.
///
/// Query direction (grid → particle): [`DomainMapper::elevation_at`].
/// Aggregation direction (particle → grid): [`DomainMapper::surface_height_from_swarm`]
/// and [`DomainMapper::rebuild_surface`].
#[derive(Clone, Debug)]
pub struct DomainMapper {
    mechanics: Bounds3D,
    dem_bounds: Bounds2D,
    resolution: GridResolution,
    transform: DomainTransform,
}

impl DomainMapper {
    /// Create a mapper, checking that the DEM covers the mechanics footprint.
    pub fn new(
        mechanics: Bounds3D,
        dem_bounds: Bounds2D,
        resolution: GridResolution,
        transform: DomainTransform,
    ) -> Result<Self, ConfigError> {
        mechanics.validate()?;
        dem_bounds.validate()?;
        resolution.validate()?;
        transform.validate()?;

        let footprint = transform.bounds_to_dem(&mechanics.horizontal());
        let tol = COVER_TOLERANCE * dem_bounds.width().max(dem_bounds.height());
        if !dem_bounds.covers(&footprint, tol) {
            return Err(ConfigError::DemDoesNotCover {
                dem: dem_bounds.to_string(),
                mechanics: footprint.to_string(),
            });
        }

        Ok(Self {
            mechanics,
            dem_bounds,
            resolution,
            transform,
        })
    }

    /// Mapper for identical frames where the DEM spans exactly the mechanics footprint.
    pub fn aligned(mechanics: Bounds3D, resolution: GridResolution) -> Result<Self, ConfigError> {
        Self::new(
            mechanics,
            mechanics.horizontal(),
            resolution,
            DomainTransform::identity(),
        )
    }

    pub fn mechanics_bounds(&self) -> &Bounds3D {
        &self.mechanics
    }

    pub fn dem_bounds(&self) -> &Bounds2D {
        &self.dem_bounds
    }

    pub fn resolution(&self) -> GridResolution {
        self.resolution
    }

    pub fn transform(&self) -> &DomainTransform {
        &self.transform
    }

    /// Flat DEM on this mapper's lattice, used to seed the surface solver.
    pub fn flat_dem(&self, elevation: f64) -> ElevationGrid {
        generate_flat_dem(self.dem_bounds, self.resolution, elevation)
    }

    /// Surface height under a mechanics position, in the mechanics vertical frame.
    ///
    /// Bilinear over the four enclosing DEM nodes. Positions that map outside
    /// the grid fail with [`OutOfDomain`].
    pub fn elevation_at(&self, grid: &ElevationGrid, x: f64, y: f64) -> Result<f64, OutOfDomain> {
        let (gx, gy) = self.transform.to_dem(x, y);
        grid.sample_bilinear(gx, gy)
            .map(|z| self.transform.height_to_mechanics(z))
            .ok_or(OutOfDomain::grid(x, y))
    }

    /// Column whose footprint holds a mechanics position.
    pub fn column_of(&self, grid: &ElevationGrid, x: f64, y: f64) -> Result<CellIndex, OutOfDomain> {
        let (gx, gy) = self.transform.to_dem(x, y);
        grid.nearest_node(gx, gy).ok_or(OutOfDomain::grid(x, y))
    }

    /// Whether a DEM node lies over the mechanics footprint.
    pub fn column_in_mechanics(&self, grid: &ElevationGrid, cell: CellIndex) -> Result<(), OutOfDomain> {
        let (gx, gy) = grid.node_position(cell);
        let (x, y) = self.transform.to_mechanics(gx, gy);
        let footprint = self.mechanics.horizontal();
        let tol = COVER_TOLERANCE * footprint.width().max(footprint.height());
        if x >= footprint.x_min - tol
            && x <= footprint.x_max + tol
            && y >= footprint.y_min - tol
            && y <= footprint.y_max + tol
        {
            Ok(())
        } else {
            Err(OutOfDomain::mechanics(x, y))
        }
    }

    /// Column of every particle, in swarm order.
    pub fn locate_particles(&self, grid: &ElevationGrid, particles: &[Particle]) -> Vec<Option<CellIndex>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            particles
                .par_iter()
                .map(|p| self.column_of(grid, p.x(), p.y()).ok())
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            particles
                .iter()
                .map(|p| self.column_of(grid, p.x(), p.y()).ok())
                .collect()
        }
    }

    /// Top of solid material in one column, as a DEM elevation.
    ///
    /// Scans every particle whose horizontal position falls in the column's
    /// footprint and takes the highest one that is not air-like, measured
    /// in the DEM frame. A column with no solid particle keeps the grid's
    /// current elevation.
    pub fn surface_height_from_swarm(
        &self,
        grid: &ElevationGrid,
        particles: &[Particle],
        registry: &MaterialRegistry,
        cell: CellIndex,
    ) -> Result<f64, ConfigError> {
        let previous = grid.get(cell).ok_or(ConfigError::CellOutsideGrid {
            cell,
            rows: grid.rows(),
            cols: grid.cols(),
        })?;
        let mut top = f64::NEG_INFINITY;
        for p in particles {
            let class = registry.class_of(p.tag)?;
            if class.is_solid() && self.column_of(grid, p.x(), p.y()).ok() == Some(cell) {
                top = top.max(self.transform.height_to_dem(p.z()));
            }
        }
        Ok(if top.is_finite() { top } else { previous })
    }

    /// Rebuild every column of `previous` from the swarm in one pass.
    ///
    /// Columns outside the mechanics footprint and columns without solid
    /// particles keep their previous elevation. Off-grid particles are
    /// reported as warnings; off-footprint columns only when the surface
    /// step later changes them.
    pub fn rebuild_surface(
        &self,
        previous: &ElevationGrid,
        particles: &[Particle],
        registry: &MaterialRegistry,
    ) -> Result<SurfaceRebuild, ConfigError> {
        let columns = self.locate_particles(previous, particles);
        let cols = previous.cols();
        let mut top = vec![f64::NEG_INFINITY; previous.resolution().total_nodes()];
        let mut warnings = Vec::new();

        for (i, (p, column)) in particles.iter().zip(&columns).enumerate() {
            let class = registry.class_of(p.tag)?;
            match column {
                Some(cell) if class.is_solid() => {
                    let slot = &mut top[cell.linear(cols)];
                    *slot = slot.max(self.transform.height_to_dem(p.z()));
                }
                Some(_) => {}
                None => {
                    tracing::trace!(particle = i, x = p.x(), y = p.y(), "particle off the DEM");
                    warnings.push(ExchangeWarning::ParticleOutsideGrid {
                        particle: ParticleIndex::new(i),
                        x: p.x(),
                        y: p.y(),
                    });
                }
            }
        }

        let mut grid = previous.clone();
        for cell in previous.cells() {
            if self.column_in_mechanics(previous, cell).is_err() {
                continue;
            }
            let z = top[cell.linear(cols)];
            if z.is_finite() {
                grid.set(cell, z);
            }
        }

        Ok(SurfaceRebuild {
            grid,
            columns,
            warnings,
        })
    }
}
