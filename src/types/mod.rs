//! Strongly-typed geometry and index types shared by both domains.
//!
//! # Example
//!
//! ```
//! use surface_linkage::types::{Bounds2D, Bounds3D, GridResolution};
//!
//! let mechanics = Bounds3D::new([0.0, 0.0, -80e3], [100e3, 100e3, 20e3]);
//! let dem = Bounds2D::new(0.0, 100e3, 0.0, 100e3);
//! assert!(dem.covers(&mechanics.horizontal(), 0.0));
//!
//! let res = GridResolution::new(180, 180);
//! assert_eq!(res.cols(), 180);
//! ```

mod bounds;
mod indices;
mod resolution;

pub use bounds::{Bounds2D, Bounds3D};
pub use indices::{CellIndex, ParticleIndex};
pub use resolution::GridResolution;
