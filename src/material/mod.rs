//! Material tags, their bookkeeping classes, and reclassification rules.

mod classifier;
mod registry;
mod tag;

pub use classifier::{DeltaSign, MaterialClassifier};
pub use registry::{MaterialEntry, MaterialRegistry, MaterialTable};
pub use tag::{MaterialClass, MaterialTag};
