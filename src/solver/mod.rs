//! External solver interfaces.
//!
//! The mechanics solve and the surface-process solve are collaborators the
//! engine drives through these traits; their numerics are not part of this
//! crate.

mod particle;
mod traits;

pub use particle::Particle;
pub use traits::{MechanicsSolver, SurfaceProcessSolver};
