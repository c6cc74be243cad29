//! Material reclassification driven by surface elevation change.

use super::registry::MaterialRegistry;
use super::tag::{MaterialClass, MaterialTag};
use crate::error::ConfigError;

/// Sign of the elevation change seen by a particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeltaSign {
    /// Material was added above the particle's column.
    Deposition,
    /// No change.
    Neutral,
    /// Material was removed.
    Erosion,
}

impl DeltaSign {
    #[inline]
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            DeltaSign::Deposition
        } else if delta < 0.0 {
            DeltaSign::Erosion
        } else {
            DeltaSign::Neutral
        }
    }

    #[inline]
    fn slot(self) -> usize {
        match self {
            DeltaSign::Deposition => 0,
            DeltaSign::Neutral => 1,
            DeltaSign::Erosion => 2,
        }
    }
}

#[inline]
fn class_slot(class: MaterialClass) -> usize {
    match class {
        MaterialClass::AirLike => 0,
        MaterialClass::SedimentLike => 1,
        MaterialClass::Other => 2,
    }
}

/// Stateless rule engine mapping `(tag, elevation delta, in-domain)` to a new tag.
///
/// The rules live in a `class × sign` transition table built from the
/// registry: air-like material under deposition becomes the deposited tag,
/// sediment-like material under erosion becomes the eroded tag, and every
/// other cell of the table keeps the old tag.
///
/// ```
/// use surface_linkage::material::{MaterialClassifier, MaterialRegistry, MaterialTag};
///
/// let classifier = MaterialClassifier::new(MaterialRegistry::default_geology());
/// let tag = classifier.classify(MaterialTag::AIR, 5.0, true).unwrap();
/// assert_eq!(tag, MaterialTag::SEDIMENT);
/// let tag = classifier.classify(MaterialTag::HEAVY_ROCK, -2.0, true).unwrap();
/// assert_eq!(tag, MaterialTag::ERODED);
/// ```
#[derive(Clone, Debug)]
pub struct MaterialClassifier {
    registry: MaterialRegistry,
    transitions: [[Option<MaterialTag>; 3]; 3],
}

impl MaterialClassifier {
    pub fn new(registry: MaterialRegistry) -> Self {
        let mut transitions = [[None; 3]; 3];
        transitions[class_slot(MaterialClass::AirLike)][DeltaSign::Deposition.slot()] =
            Some(registry.deposited());
        transitions[class_slot(MaterialClass::SedimentLike)][DeltaSign::Erosion.slot()] =
            Some(registry.eroded());
        Self {
            registry,
            transitions,
        }
    }

    pub fn registry(&self) -> &MaterialRegistry {
        &self.registry
    }

    /// Reclassify one particle.
    ///
    /// Positions outside the mechanics domain are never reclassified. An
    /// unregistered `old_tag` is a configuration error.
    pub fn classify(
        &self,
        old_tag: MaterialTag,
        elevation_delta: f64,
        is_within_domain: bool,
    ) -> Result<MaterialTag, ConfigError> {
        let class = self.registry.class_of(old_tag)?;
        if !is_within_domain {
            return Ok(old_tag);
        }
        let sign = DeltaSign::of(elevation_delta);
        Ok(self.transitions[class_slot(class)][sign.slot()].unwrap_or(old_tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialEntry;

    fn classifier() -> MaterialClassifier {
        MaterialClassifier::new(MaterialRegistry::default_geology())
    }

    #[test]
    fn test_deposition_fills_air() {
        let c = classifier();
        assert_eq!(c.classify(MaterialTag::AIR, 5.0, true).unwrap(), MaterialTag::SEDIMENT);
        assert_eq!(c.classify(MaterialTag::ERODED, 0.1, true).unwrap(), MaterialTag::SEDIMENT);
    }

    #[test]
    fn test_deposition_leaves_rock() {
        let c = classifier();
        assert_eq!(c.classify(MaterialTag::HEAVY_ROCK, 5.0, true).unwrap(), MaterialTag::HEAVY_ROCK);
        assert_eq!(c.classify(MaterialTag::SEDIMENT, 5.0, true).unwrap(), MaterialTag::SEDIMENT);
    }

    #[test]
    fn test_erosion_only_touches_sediment_like() {
        let c = classifier();
        assert_eq!(c.classify(MaterialTag::LIGHT_ROCK, -1.0, true).unwrap(), MaterialTag::ERODED);
        assert_eq!(c.classify(MaterialTag::SEDIMENT, -1.0, true).unwrap(), MaterialTag::ERODED);
        assert_eq!(c.classify(MaterialTag::AIR, -1.0, true).unwrap(), MaterialTag::AIR);
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let c = classifier();
        for tag in c.registry().tags().collect::<Vec<_>>() {
            assert_eq!(c.classify(tag, 0.0, true).unwrap(), tag);
        }
    }

    #[test]
    fn test_outside_domain_is_noop() {
        let c = classifier();
        assert_eq!(c.classify(MaterialTag::AIR, 5.0, false).unwrap(), MaterialTag::AIR);
    }

    #[test]
    fn test_unregistered_tag_is_error() {
        let c = classifier();
        assert!(matches!(
            c.classify(MaterialTag::new(42), 1.0, true),
            Err(ConfigError::UnregisteredTag(_))
        ));
        // Even outside the domain the table must be total.
        assert!(c.classify(MaterialTag::new(42), 1.0, false).is_err());
    }

    #[test]
    fn test_other_class_is_untouched() {
        let basement = MaterialTag::new(10);
        let registry = MaterialRegistry::new(
            vec![
                MaterialEntry::new(MaterialTag::AIR, "air", MaterialClass::AirLike),
                MaterialEntry::new(MaterialTag::SEDIMENT, "sediment", MaterialClass::SedimentLike),
                MaterialEntry::new(basement, "basement", MaterialClass::Other),
            ],
            MaterialTag::SEDIMENT,
            MaterialTag::AIR,
        )
        .unwrap();
        let c = MaterialClassifier::new(registry);
        assert_eq!(c.classify(basement, 3.0, true).unwrap(), basement);
        assert_eq!(c.classify(basement, -3.0, true).unwrap(), basement);
        assert_eq!(c.classify(MaterialTag::SEDIMENT, -3.0, true).unwrap(), MaterialTag::AIR);
    }
}
