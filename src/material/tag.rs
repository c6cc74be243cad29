//! Material identity carried by swarm particles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Material identity of a particle.
///
/// A thin id newtype so hosts can register their own materials. The five
/// associated constants form the default geological set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MaterialTag(u16);

impl MaterialTag {
    pub const AIR: Self = Self(0);
    pub const HEAVY_ROCK: Self = Self(1);
    pub const LIGHT_ROCK: Self = Self(2);
    pub const SEDIMENT: Self = Self(3);
    pub const ERODED: Self = Self(4);

    /// Create a tag from a raw id.
    #[inline]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Raw id.
    #[inline]
    pub const fn id(self) -> u16 {
        self.0
    }
}

impl fmt::Display for MaterialTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Semantic class used for erosion/deposition bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialClass {
    /// Empty space above the surface; becomes solid on deposition.
    AirLike,
    /// Erodible solid; becomes air-like on erosion.
    SedimentLike,
    /// Not touched by surface processes.
    Other,
}

impl MaterialClass {
    /// Whether the class counts as solid when locating the surface.
    #[inline]
    pub fn is_solid(self) -> bool {
        !matches!(self, MaterialClass::AirLike)
    }
}
