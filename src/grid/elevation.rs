//! Regular elevation lattice (DEM).

use std::fmt;

use crate::error::ConfigError;
use crate::types::{Bounds2D, CellIndex, GridResolution};

/// Digital elevation model on a node-registered regular lattice.
///
/// Node `(row, col)` sits at `(x_min + col * dx, y_min + row * dy)` with
/// `dx = width / (cols - 1)`, so the outermost nodes lie exactly on the
/// bounds. Values are stored row-major.
///
/// The surface-process solver owns the authoritative instance. Copies held
/// by the linkage engine live for one coupling step at most.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationGrid {
    bounds: Bounds2D,
    resolution: GridResolution,
    data: Vec<f64>,
}

impl ElevationGrid {
    /// Create a grid with every node set to `elevation`.
    pub fn filled(bounds: Bounds2D, resolution: GridResolution, elevation: f64) -> Self {
        Self {
            bounds,
            resolution,
            data: vec![elevation; resolution.total_nodes()],
        }
    }

    /// Create a grid from row-major data.
    pub fn from_data(
        bounds: Bounds2D,
        resolution: GridResolution,
        data: Vec<f64>,
    ) -> Result<Self, ConfigError> {
        if data.len() != resolution.total_nodes() {
            return Err(ConfigError::DataSizeMismatch {
                expected: resolution.total_nodes(),
                got: data.len(),
            });
        }
        Ok(Self {
            bounds,
            resolution,
            data,
        })
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds2D {
        &self.bounds
    }

    #[inline]
    pub fn resolution(&self) -> GridResolution {
        self.resolution
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.resolution.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.resolution.cols()
    }

    /// Node spacing along x.
    #[inline]
    pub fn dx(&self) -> f64 {
        self.bounds.width() / (self.cols() - 1) as f64
    }

    /// Node spacing along y.
    #[inline]
    pub fn dy(&self) -> f64 {
        self.bounds.height() / (self.rows() - 1) as f64
    }

    /// Raw row-major values.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Elevation at a node, `None` if the index is off the lattice.
    #[inline]
    pub fn get(&self, cell: CellIndex) -> Option<f64> {
        if cell.row < self.rows() && cell.col < self.cols() {
            Some(self.data[cell.linear(self.cols())])
        } else {
            None
        }
    }

    /// Set the elevation at a node. Off-lattice indices are ignored.
    #[inline]
    pub fn set(&mut self, cell: CellIndex, value: f64) {
        if cell.row < self.rows() && cell.col < self.cols() {
            let cols = self.cols();
            self.data[cell.linear(cols)] = value;
        }
    }

    /// Horizontal position of a node.
    #[inline]
    pub fn node_position(&self, cell: CellIndex) -> (f64, f64) {
        (
            self.bounds.x_min + cell.col as f64 * self.dx(),
            self.bounds.y_min + cell.row as f64 * self.dy(),
        )
    }

    /// Iterate over all nodes in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        let cols = self.cols();
        (0..self.data.len()).map(move |i| CellIndex::from_linear(i, cols))
    }

    /// Fractional lattice coordinates (col, row) of a point, `None` outside.
    fn lattice_coords(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        Some((
            (x - self.bounds.x_min) / self.dx(),
            (y - self.bounds.y_min) / self.dy(),
        ))
    }

    /// Node whose column footprint contains the point.
    ///
    /// Footprints are the dx × dy rectangles centred on the nodes, clipped to
    /// the bounds. Points exactly half-way between two nodes go to the upper one.
    pub fn nearest_node(&self, x: f64, y: f64) -> Option<CellIndex> {
        let (fc, fr) = self.lattice_coords(x, y)?;
        let col = ((fc + 0.5).floor() as usize).min(self.cols() - 1);
        let row = ((fr + 0.5).floor() as usize).min(self.rows() - 1);
        Some(CellIndex::new(row, col))
    }

    /// Bilinear interpolation over the four enclosing nodes.
    ///
    /// Exact at nodes and on flat regions. Returns `None` outside the bounds.
    pub fn sample_bilinear(&self, x: f64, y: f64) -> Option<f64> {
        let (fc, fr) = self.lattice_coords(x, y)?;

        let col0 = (fc.floor() as usize).min(self.cols() - 2);
        let row0 = (fr.floor() as usize).min(self.rows() - 2);
        let s = fc - col0 as f64;
        let t = fr - row0 as f64;

        let cols = self.cols();
        let z00 = self.data[row0 * cols + col0];
        let z01 = self.data[row0 * cols + col0 + 1];
        let z10 = self.data[(row0 + 1) * cols + col0];
        let z11 = self.data[(row0 + 1) * cols + col0 + 1];

        // Lerp form keeps equal corners exact.
        let lower = z00 + (z01 - z00) * s;
        let upper = z10 + (z11 - z10) * s;
        Some(lower + (upper - lower) * t)
    }

    /// Whether `other` has the same bounds and resolution.
    pub fn same_shape(&self, other: &ElevationGrid) -> bool {
        self.resolution == other.resolution && self.bounds == other.bounds
    }

    /// Per-node difference `other - self`, `None` if shapes differ.
    pub fn delta_to(&self, other: &ElevationGrid) -> Option<Vec<f64>> {
        if !self.same_shape(other) {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(&other.data)
                .map(|(old, new)| new - old)
                .collect(),
        )
    }

    /// Summary statistics over all nodes.
    pub fn statistics(&self) -> ElevationStatistics {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &z in &self.data {
            min = min.min(z);
            max = max.max(z);
            sum += z;
        }
        ElevationStatistics {
            rows: self.rows(),
            cols: self.cols(),
            min,
            max,
            mean: sum / self.data.len() as f64,
            bounds: self.bounds,
        }
    }
}

/// Statistics about an elevation grid.
#[derive(Debug, Clone)]
pub struct ElevationStatistics {
    pub rows: usize,
    pub cols: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub bounds: Bounds2D,
}

impl fmt::Display for ElevationStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Elevation Statistics:")?;
        writeln!(f, "  Lattice: {}x{} nodes", self.rows, self.cols)?;
        writeln!(f, "  Range: {:.3} to {:.3}", self.min, self.max)?;
        writeln!(f, "  Mean: {:.3}", self.mean)?;
        write!(f, "  Bounds: {}", self.bounds)
    }
}
