//! Integration tests for seeding the surface solver from raster files.

use std::fs::File;
use std::path::Path;

use tiff::encoder::{TiffEncoder, colortype};

use surface_linkage::error::ConfigError;
use surface_linkage::grid::{ElevationGrid, GeoTiffDem};
use surface_linkage::simulation::{LinkageConfig, LinkageModel};
use surface_linkage::solver::{MechanicsSolver, Particle, SurfaceProcessSolver};
use surface_linkage::types::{Bounds3D, CellIndex, GridResolution};
use surface_linkage::BoxedSolverError;

const N: usize = 11;

struct Idle(Vec<Particle>);

impl MechanicsSolver for Idle {
    fn max_stable_step(&self) -> f64 {
        1.0
    }

    fn advance(&mut self, requested: f64) -> Result<f64, BoxedSolverError> {
        Ok(requested)
    }

    fn particles(&self) -> &[Particle] {
        &self.0
    }

    fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.0
    }
}

struct Frozen(ElevationGrid);

impl SurfaceProcessSolver for Frozen {
    fn elevation(&self) -> &ElevationGrid {
        &self.0
    }

    fn load(&mut self, dem: ElevationGrid) {
        self.0 = dem;
    }

    fn step(&mut self, current: &ElevationGrid, _: f64) -> Result<ElevationGrid, BoxedSolverError> {
        Ok(current.clone())
    }
}

fn bounds() -> Bounds3D {
    Bounds3D::new([0.0, 0.0, -80e3], [100e3, 100e3, 20e3])
}

fn model() -> LinkageModel<Idle, Frozen> {
    let config = LinkageConfig::new(bounds())
        .with_resolution(GridResolution::square(N))
        .with_checkpoint_interval(10.0);
    let surface = Frozen(ElevationGrid::filled(
        bounds().horizontal(),
        GridResolution::square(N),
        0.0,
    ));
    LinkageModel::new(config, Idle(Vec::new()), surface).unwrap()
}

fn write_raster(path: &Path, width: usize, height: usize, value: impl Fn(usize, usize) -> f32) {
    // north row first, as rasters are stored
    let mut data = Vec::with_capacity(width * height);
    for r in 0..height {
        for c in 0..width {
            data.push(value(r, c));
        }
    }
    let file = File::create(path).unwrap();
    let mut encoder = TiffEncoder::new(file).unwrap();
    encoder
        .write_image::<colortype::Gray32Float>(width as u32, height as u32, &data)
        .unwrap();
}

#[test]
fn test_seed_from_geotiff() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("topo.tif");
    // elevation rises eastward, 10 m per column; the north row is a ridge
    write_raster(&path, N, N, |r, c| if r == 0 { 500.0 } else { 10.0 * c as f32 });

    let mut model = model();
    model.seed_geotiff(&path).unwrap();

    assert_eq!(model.elevation_at(30e3, 50e3).unwrap(), 30.0);
    assert_eq!(model.elevation_at(35e3, 50e3).unwrap(), 35.0);
    // raster row 0 is the northern edge, y = y_max
    assert_eq!(model.elevation_at(0.0, 100e3).unwrap(), 500.0);
    assert_eq!(
        model.surface().elevation().get(CellIndex::new(N - 1, 4)),
        Some(500.0)
    );
    assert_eq!(model.surface().elevation().get(CellIndex::new(0, 4)), Some(40.0));
}

#[test]
fn test_seed_rejects_wrong_raster_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.tif");
    write_raster(&path, 5, 5, |_, _| 0.0);

    let mut model = model();
    assert!(matches!(
        model.seed_geotiff(&path),
        Err(ConfigError::DemShapeMismatch { .. })
    ));
}

#[test]
fn test_nodata_is_filled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("holes.tif");
    write_raster(&path, 3, 3, |r, c| if r == c { -9999.0 } else { 1.0 });

    let grid = GeoTiffDem::new()
        .with_bounds(bounds().horizontal())
        .with_fill(-20.0)
        .load(&path)
        .unwrap();
    let stats = grid.statistics();
    assert_eq!(stats.min, -20.0);
    assert_eq!(stats.max, 1.0);
}
