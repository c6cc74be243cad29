//! Lagrangian swarm particle as seen by the linkage engine.

use crate::material::MaterialTag;

/// One swarm particle: a position and a material tag.
///
/// The mechanics solver owns the swarm. The engine only ever rewrites
/// `tag`; positions and the particle count are left to the solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position (x, y, z) in mechanics coordinates
    pub position: [f64; 3],
    /// Material identity
    pub tag: MaterialTag,
}

impl Particle {
    #[inline]
    pub fn new(position: [f64; 3], tag: MaterialTag) -> Self {
        Self { position, tag }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.position[0]
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.position[1]
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.position[2]
    }
}
