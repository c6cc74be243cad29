//! Affine coordinate maps between the mechanics and DEM frames.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Bounds2D;

/// One-axis affine map `dem = scale * mechanics + offset`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisMap {
    pub scale: f64,
    pub offset: f64,
}

impl AxisMap {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: 0.0,
    };

    pub fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    /// Mechanics → DEM.
    #[inline]
    pub fn forward(&self, v: f64) -> f64 {
        self.scale * v + self.offset
    }

    /// DEM → mechanics.
    #[inline]
    pub fn inverse(&self, v: f64) -> f64 {
        (v - self.offset) / self.scale
    }

    fn validate(&self, axis: &'static str) -> Result<(), ConfigError> {
        if self.scale.is_finite() && self.scale != 0.0 && self.offset.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::InvalidTransform {
                axis,
                scale: self.scale,
                offset: self.offset,
            })
        }
    }
}

impl Default for AxisMap {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned affine transform from mechanics coordinates to DEM coordinates.
///
/// Covers independent origins (offsets) and units (scales) per axis. The z
/// axis maps particle heights to DEM elevations; a negative z scale describes
/// a depth-positive mechanics frame. Surface comparisons are made on DEM
/// elevations, which always grow upward.
///
/// ```
/// use surface_linkage::mapping::{AxisMap, DomainTransform};
///
/// // mechanics in km, DEM in m with a shifted origin
/// let t = DomainTransform::new(
///     AxisMap::new(1000.0, 500.0),
///     AxisMap::new(1000.0, 0.0),
///     AxisMap::new(1000.0, 0.0),
/// );
/// assert_eq!(t.to_dem(2.0, 3.0), (2500.0, 3000.0));
/// assert_eq!(t.to_mechanics(2500.0, 3000.0), (2.0, 3.0));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainTransform {
    #[serde(default)]
    pub x: AxisMap,
    #[serde(default)]
    pub y: AxisMap,
    #[serde(default)]
    pub z: AxisMap,
}

impl DomainTransform {
    pub fn new(x: AxisMap, y: AxisMap, z: AxisMap) -> Self {
        Self { x, y, z }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.x.validate("x")?;
        self.y.validate("y")?;
        self.z.validate("z")
    }

    /// Horizontal mechanics position → DEM position.
    #[inline]
    pub fn to_dem(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x.forward(x), self.y.forward(y))
    }

    /// Horizontal DEM position → mechanics position.
    #[inline]
    pub fn to_mechanics(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x.inverse(x), self.y.inverse(y))
    }

    /// Particle height → DEM elevation.
    #[inline]
    pub fn height_to_dem(&self, z: f64) -> f64 {
        self.z.forward(z)
    }

    /// DEM elevation → particle height.
    #[inline]
    pub fn height_to_mechanics(&self, z: f64) -> f64 {
        self.z.inverse(z)
    }

    /// Image of mechanics bounds in the DEM frame. Negative scales flip axes.
    pub fn bounds_to_dem(&self, bounds: &Bounds2D) -> Bounds2D {
        let (x0, y0) = self.to_dem(bounds.x_min, bounds.y_min);
        let (x1, y1) = self.to_dem(bounds.x_max, bounds.y_max);
        Bounds2D {
            x_min: x0.min(x1),
            x_max: x0.max(x1),
            y_min: y0.min(y1),
            y_max: y0.max(y1),
        }
    }
}
