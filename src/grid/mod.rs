//! Elevation grids exchanged with the surface-process solver.

mod elevation;
mod geotiff;

pub use elevation::{ElevationGrid, ElevationStatistics};
pub use geotiff::GeoTiffDem;
