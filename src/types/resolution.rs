//! DEM lattice resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Node counts of a regular elevation lattice.
///
/// Rows run along y and columns along x. Bilinear interpolation needs at
/// least two nodes on each axis.
///
/// # Example
///
/// ```
/// use surface_linkage::types::GridResolution;
///
/// let res = GridResolution::new(180, 180);
/// assert_eq!(res.rows(), 180);
/// assert_eq!(res.total_nodes(), 32_400);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridResolution {
    rows: usize,
    cols: usize,
}

impl GridResolution {
    /// Create a new resolution.
    ///
    /// # Panics
    ///
    /// Panics if either count is below 2.
    pub fn new(rows: usize, cols: usize) -> Self {
        match Self::try_new(rows, cols) {
            Ok(res) => res,
            Err(e) => panic!("{}", e),
        }
    }

    /// Create a new resolution, rejecting lattices too small to interpolate on.
    pub fn try_new(rows: usize, cols: usize) -> Result<Self, ConfigError> {
        let res = Self { rows, cols };
        res.validate()?;
        Ok(res)
    }

    /// Re-check a deserialized resolution.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < 2 || self.cols < 2 {
            return Err(ConfigError::ZeroResolution {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Square resolution.
    pub fn square(n: usize) -> Self {
        Self::new(n, n)
    }

    /// Number of rows (y direction).
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (x direction).
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of lattice nodes.
    #[inline]
    pub fn total_nodes(&self) -> usize {
        self.rows * self.cols
    }

    /// Return as tuple (rows, cols).
    #[inline]
    pub fn as_tuple(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

impl fmt::Display for GridResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.rows, self.cols)
    }
}

impl From<GridResolution> for (usize, usize) {
    fn from(res: GridResolution) -> Self {
        (res.rows, res.cols)
    }
}
