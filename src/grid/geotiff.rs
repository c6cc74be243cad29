//! GeoTIFF elevation reader.
//!
//! Reads a single-band GeoTIFF into an [`ElevationGrid`] that can seed the
//! surface-process solver. Uses the pure Rust `tiff` crate.
//!
//! # Example
//!
//! ```ignore
//! use surface_linkage::grid::GeoTiffDem;
//!
//! let dem = GeoTiffDem::new().with_fill(0.0).load("data/topography.tif")?;
//! surface.load(dem);
//! ```

use std::fs::File;
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use super::elevation::ElevationGrid;
use crate::error::ConfigError;
use crate::types::{Bounds2D, GridResolution};

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;

impl From<tiff::TiffError> for ConfigError {
    fn from(e: tiff::TiffError) -> Self {
        ConfigError::Raster(e.to_string())
    }
}

/// GeoTIFF loader settings.
#[derive(Clone, Debug)]
pub struct GeoTiffDem {
    /// Explicit bounds, overriding any geotransform in the file
    bounds: Option<Bounds2D>,
    /// No-data marker in the raster
    nodata: f64,
    /// Elevation written where the raster has no data
    fill: f64,
}

impl Default for GeoTiffDem {
    fn default() -> Self {
        Self {
            bounds: None,
            nodata: -9999.0,
            fill: 0.0,
        }
    }
}

impl GeoTiffDem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use these bounds instead of the file's geotransform.
    pub fn with_bounds(mut self, bounds: Bounds2D) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = nodata;
        self
    }

    pub fn with_fill(mut self, fill: f64) -> Self {
        self.fill = fill;
        self
    }

    /// Load the raster.
    ///
    /// Raster row 0 is the northern edge; the returned grid has row 0 at
    /// `y_min`, so rows are flipped on the way in.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ElevationGrid, ConfigError> {
        let file = File::open(path)?;
        let mut decoder = Decoder::new(file)?;
        let (width, height) = decoder.dimensions()?;
        let (width, height) = (width as usize, height as usize);
        let resolution = GridResolution::try_new(height, width)?;

        let bounds = match self.bounds {
            Some(bounds) => bounds,
            None => {
                let scale = decoder.get_tag_f64_vec(Tag::Unknown(MODEL_PIXEL_SCALE)).ok();
                let tiepoint = decoder.get_tag_f64_vec(Tag::Unknown(MODEL_TIEPOINT)).ok();
                match (scale, tiepoint) {
                    // ModelTiepoint: [I, J, K, X, Y, Z]; ModelPixelScale: [sx, sy, sz]
                    (Some(scale), Some(tie)) if scale.len() >= 2 && tie.len() >= 6 => {
                        let x_min = tie[3];
                        let y_max = tie[4];
                        Bounds2D::try_new(
                            x_min,
                            x_min + (width - 1) as f64 * scale[0],
                            y_max - (height - 1) as f64 * scale[1],
                            y_max,
                        )?
                    }
                    _ => {
                        return Err(ConfigError::Raster(
                            "no geotransform in file and no bounds given".to_string(),
                        ));
                    }
                }
            }
        };

        let raw: Vec<f64> = match decoder.read_image()? {
            DecodingResult::U8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U64(data) => data.into_iter().map(|v| v as f64).collect(),
            DecodingResult::F32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::F64(data) => data,
            DecodingResult::I8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I64(data) => data.into_iter().map(|v| v as f64).collect(),
        };
        if raw.len() != width * height {
            return Err(ConfigError::DataSizeMismatch {
                expected: width * height,
                got: raw.len(),
            });
        }

        let mut data = Vec::with_capacity(raw.len());
        for row in (0..height).rev() {
            for &z in &raw[row * width..(row + 1) * width] {
                data.push(if self.is_valid(z) { z } else { self.fill });
            }
        }

        ElevationGrid::from_data(bounds, resolution, data)
    }

    fn is_valid(&self, z: f64) -> bool {
        z.is_finite() && (z - self.nodata).abs() > 0.01
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellIndex;
    use tiff::encoder::{TiffEncoder, colortype};

    fn write_raster(path: &Path, width: u32, height: u32, data: &[f32]) {
        let file = File::create(path).unwrap();
        let mut encoder = TiffEncoder::new(file).unwrap();
        encoder
            .write_image::<colortype::Gray32Float>(width, height, data)
            .unwrap();
    }

    #[test]
    fn test_load_flips_rows_and_fills_nodata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dem.tif");
        // north row first
        write_raster(&path, 3, 2, &[10.0, 11.0, -9999.0, 0.0, 1.0, 2.0]);

        let grid = GeoTiffDem::new()
            .with_bounds(Bounds2D::new(0.0, 2.0, 0.0, 1.0))
            .with_fill(-1.0)
            .load(&path)
            .unwrap();

        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.get(CellIndex::new(0, 2)), Some(2.0));
        assert_eq!(grid.get(CellIndex::new(1, 0)), Some(10.0));
        assert_eq!(grid.get(CellIndex::new(1, 2)), Some(-1.0));
    }

    #[test]
    fn test_double_precision_raster_keeps_precision() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dem64.tif");
        let fine = 1234.000_000_1;
        let file = File::create(&path).unwrap();
        let mut encoder = TiffEncoder::new(file).unwrap();
        encoder
            .write_image::<colortype::Gray64Float>(2, 2, &[fine, 0.0, 0.0, 0.0])
            .unwrap();

        let grid = GeoTiffDem::new()
            .with_bounds(Bounds2D::new(0.0, 1.0, 0.0, 1.0))
            .load(&path)
            .unwrap();
        // raster row 0 is the northern row
        assert_eq!(grid.get(CellIndex::new(1, 0)), Some(fine));
    }

    #[test]
    fn test_missing_geotransform_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.tif");
        write_raster(&path, 2, 2, &[0.0; 4]);
        assert!(matches!(
            GeoTiffDem::new().load(&path),
            Err(ConfigError::Raster(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            GeoTiffDem::new().load("/nonexistent/dem.tif"),
            Err(ConfigError::Io(_))
        ));
    }
}
