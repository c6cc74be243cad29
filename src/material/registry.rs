//! Caller-supplied material table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::tag::{MaterialClass, MaterialTag};
use crate::error::ConfigError;

/// One registered material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    /// Tag carried by particles
    pub id: MaterialTag,
    /// Human-readable name, used in logs only
    pub name: String,
    /// Bookkeeping class
    pub class: MaterialClass,
}

impl MaterialEntry {
    pub fn new(id: MaterialTag, name: impl Into<String>, class: MaterialClass) -> Self {
        Self {
            id,
            name: name.into(),
            class,
        }
    }
}

/// Serialized form of a [`MaterialRegistry`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialTable {
    pub materials: Vec<MaterialEntry>,
    pub deposited: MaterialTag,
    pub eroded: MaterialTag,
}

/// Validated table of material tags, their classes and the two write targets.
///
/// Every tag the engine ever writes is either `deposited` or `eroded`, both
/// of which must be registered.
///
/// ```
/// use surface_linkage::material::{MaterialClass, MaterialRegistry, MaterialTag};
///
/// let registry = MaterialRegistry::default_geology();
/// assert_eq!(registry.class_of(MaterialTag::AIR).unwrap(), MaterialClass::AirLike);
/// assert_eq!(registry.deposited(), MaterialTag::SEDIMENT);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "MaterialTable", into = "MaterialTable")]
pub struct MaterialRegistry {
    entries: Vec<MaterialEntry>,
    lookup: HashMap<MaterialTag, usize>,
    deposited: MaterialTag,
    eroded: MaterialTag,
}

impl MaterialRegistry {
    /// Build a registry, checking that it is non-empty, free of duplicates,
    /// and that both targets are registered.
    pub fn new(
        entries: Vec<MaterialEntry>,
        deposited: MaterialTag,
        eroded: MaterialTag,
    ) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }

        let mut lookup = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if lookup.insert(entry.id, i).is_some() {
                return Err(ConfigError::DuplicateTag(entry.id));
            }
        }

        let registry = Self {
            entries,
            lookup,
            deposited,
            eroded,
        };

        registry.class_of(eroded)?;
        if registry.class_of(deposited)? == MaterialClass::AirLike {
            return Err(ConfigError::AirLikeDepositTarget(deposited));
        }

        Ok(registry)
    }

    /// Air, heavy rock, light rock, sediment and eroded material.
    ///
    /// Both rock types are erodible; eroded material behaves like air so that
    /// later deposition can fill it again.
    pub fn default_geology() -> Self {
        let entries = vec![
            MaterialEntry::new(MaterialTag::AIR, "air", MaterialClass::AirLike),
            MaterialEntry::new(MaterialTag::HEAVY_ROCK, "heavy_rock", MaterialClass::SedimentLike),
            MaterialEntry::new(MaterialTag::LIGHT_ROCK, "light_rock", MaterialClass::SedimentLike),
            MaterialEntry::new(MaterialTag::SEDIMENT, "sediment", MaterialClass::SedimentLike),
            MaterialEntry::new(MaterialTag::ERODED, "eroded", MaterialClass::AirLike),
        ];
        match Self::new(entries, MaterialTag::SEDIMENT, MaterialTag::ERODED) {
            Ok(registry) => registry,
            Err(e) => unreachable!("default material table is valid: {}", e),
        }
    }

    /// Class of a registered tag.
    pub fn class_of(&self, tag: MaterialTag) -> Result<MaterialClass, ConfigError> {
        self.lookup
            .get(&tag)
            .map(|&i| self.entries[i].class)
            .ok_or(ConfigError::UnregisteredTag(tag))
    }

    /// Name of a registered tag.
    pub fn name_of(&self, tag: MaterialTag) -> Option<&str> {
        self.lookup.get(&tag).map(|&i| self.entries[i].name.as_str())
    }

    #[inline]
    pub fn is_registered(&self, tag: MaterialTag) -> bool {
        self.lookup.contains_key(&tag)
    }

    /// Tag written when deposition fills an air-like particle.
    #[inline]
    pub fn deposited(&self) -> MaterialTag {
        self.deposited
    }

    /// Tag written when erosion removes a sediment-like particle.
    #[inline]
    pub fn eroded(&self) -> MaterialTag {
        self.eroded
    }

    /// Registered tags in registration order.
    pub fn tags(&self) -> impl ExactSizeIterator<Item = MaterialTag> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// Registered tags of one class.
    pub fn tags_in(&self, class: MaterialClass) -> impl Iterator<Item = MaterialTag> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.class == class)
            .map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<MaterialTable> for MaterialRegistry {
    type Error = ConfigError;

    fn try_from(table: MaterialTable) -> Result<Self, Self::Error> {
        Self::new(table.materials, table.deposited, table.eroded)
    }
}

impl From<MaterialRegistry> for MaterialTable {
    fn from(registry: MaterialRegistry) -> Self {
        Self {
            materials: registry.entries,
            deposited: registry.deposited,
            eroded: registry.eroded,
        }
    }
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::default_geology()
    }
}
