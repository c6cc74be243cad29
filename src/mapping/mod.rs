//! Spatial mapping between the particle domain and the DEM lattice.
//!
//! Two inverse-ish operations connect the domains:
//! - grid → particle: sample the surface under a particle
//!   ([`DomainMapper::elevation_at`])
//! - particle → grid: aggregate the top of solid material per column
//!   ([`DomainMapper::rebuild_surface`])
//!
//! Frames may differ by an axis-aligned affine [`DomainTransform`].

mod mapper;
mod transform;

pub use mapper::{DomainMapper, SurfaceRebuild, generate_flat_dem};
pub use transform::{AxisMap, DomainTransform};
