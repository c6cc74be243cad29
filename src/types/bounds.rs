//! Domain bounds for the grid (2D) and the mechanics box (3D).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn check_axis(axis: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && max > min {
        Ok(())
    } else {
        Err(ConfigError::DegenerateBounds { axis, min, max })
    }
}

/// 2D rectangular bounds in the horizontal plane.
///
/// # Example
///
/// ```
/// use surface_linkage::types::Bounds2D;
///
/// let bounds = Bounds2D::new(0.0, 100e3, 0.0, 50e3);
/// assert_eq!(bounds.width(), 100e3);
/// assert_eq!(bounds.height(), 50e3);
/// assert_eq!(bounds.center(), (50e3, 25e3));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds2D {
    /// Minimum x-coordinate
    pub x_min: f64,
    /// Maximum x-coordinate
    pub x_max: f64,
    /// Minimum y-coordinate
    pub y_min: f64,
    /// Maximum y-coordinate
    pub y_max: f64,
}

impl Bounds2D {
    /// Create new bounds.
    ///
    /// # Panics
    ///
    /// Panics if `x_max <= x_min` or `y_max <= y_min`. Use [`Bounds2D::try_new`]
    /// for input that comes from configuration.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        match Self::try_new(x_min, x_max, y_min, y_max) {
            Ok(bounds) => bounds,
            Err(e) => panic!("{}", e),
        }
    }

    /// Create new bounds, rejecting degenerate extents.
    pub fn try_new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self, ConfigError> {
        check_axis("x", x_min, x_max)?;
        check_axis("y", y_min, y_max)?;
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    /// Re-check bounds built field by field (e.g. deserialized).
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_axis("x", self.x_min, self.x_max)?;
        check_axis("y", self.y_min, self.y_max)
    }

    /// Create a unit square [0, 1] × [0, 1].
    pub fn unit_square() -> Self {
        Self::new(0.0, 1.0, 0.0, 1.0)
    }

    /// Width (x_max - x_min).
    #[inline]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height (y_max - y_min).
    #[inline]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Check if a point is inside the bounds (inclusive).
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// Check if `other` lies entirely inside these bounds, up to `tol`.
    pub fn covers(&self, other: &Bounds2D, tol: f64) -> bool {
        other.x_min >= self.x_min - tol
            && other.x_max <= self.x_max + tol
            && other.y_min >= self.y_min - tol
            && other.y_max <= self.y_max + tol
    }

    /// Return bounds as tuple (x_min, x_max, y_min, y_max).
    #[inline]
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.x_min, self.x_max, self.y_min, self.y_max)
    }
}

impl fmt::Display for Bounds2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.2}, {:.2}] × [{:.2}, {:.2}]",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}

impl Default for Bounds2D {
    fn default() -> Self {
        Self::unit_square()
    }
}

/// 3D box bounds of the mechanics domain.
///
/// ```
/// use surface_linkage::types::Bounds3D;
///
/// let bounds = Bounds3D::new([0.0, 0.0, -80e3], [100e3, 100e3, 20e3]);
/// assert_eq!(bounds.depth(), 100e3);
/// assert!(bounds.contains([50e3, 50e3, 0.0]));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds3D {
    /// Minimum corner (x, y, z)
    pub min: [f64; 3],
    /// Maximum corner (x, y, z)
    pub max: [f64; 3],
}

impl Bounds3D {
    /// Create new bounds.
    ///
    /// # Panics
    ///
    /// Panics if any axis has `max <= min`.
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        match Self::try_new(min, max) {
            Ok(bounds) => bounds,
            Err(e) => panic!("{}", e),
        }
    }

    /// Create new bounds, rejecting degenerate extents.
    pub fn try_new(min: [f64; 3], max: [f64; 3]) -> Result<Self, ConfigError> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Re-check bounds built field by field (e.g. deserialized).
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_axis("x", self.min[0], self.max[0])?;
        check_axis("y", self.min[1], self.max[1])?;
        check_axis("z", self.min[2], self.max[2])
    }

    /// Horizontal footprint.
    pub fn horizontal(&self) -> Bounds2D {
        Bounds2D {
            x_min: self.min[0],
            x_max: self.max[0],
            y_min: self.min[1],
            y_max: self.max[1],
        }
    }

    /// Extent along z.
    #[inline]
    pub fn depth(&self) -> f64 {
        self.max[2] - self.min[2]
    }

    /// Check if a point is inside the box (inclusive).
    #[inline]
    pub fn contains(&self, p: [f64; 3]) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }
}

impl fmt::Display for Bounds3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.2}, {:.2}] × [{:.2}, {:.2}] × [{:.2}, {:.2}]",
            self.min[0], self.max[0], self.min[1], self.max[1], self.min[2], self.max[2]
        )
    }
}
