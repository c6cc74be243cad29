//! Run configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::exchange::{ExchangeConfig, SurfaceExchange};
use crate::mapping::{DomainMapper, DomainTransform};
use crate::material::{MaterialClassifier, MaterialRegistry};
use crate::time::{CheckpointScheduler, SyncConfig, TimeSynchronizer};
use crate::types::{Bounds2D, Bounds3D, GridResolution};

/// Everything a [`LinkageModel`](super::LinkageModel) needs besides the two solvers.
///
/// ```
/// use surface_linkage::simulation::LinkageConfig;
/// use surface_linkage::types::{Bounds3D, GridResolution};
///
/// let config = LinkageConfig::new(Bounds3D::new([0.0, 0.0, -80e3], [100e3, 100e3, 20e3]))
///     .with_resolution(GridResolution::square(180))
///     .with_checkpoint_interval(10_000.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkageConfig {
    /// Mechanics domain box
    pub mechanics_bounds: Bounds3D,
    /// DEM extent in its own frame; defaults to the mechanics footprint
    pub dem_bounds: Option<Bounds2D>,
    /// DEM lattice size
    pub resolution: GridResolution,
    /// Mechanics → DEM coordinate transform
    pub transform: DomainTransform,
    /// Material tags and the deposition/erosion targets
    pub materials: MaterialRegistry,
    /// Simulated time between checkpoints
    pub checkpoint_interval: f64,
    /// Caller cap on a single mechanics step
    pub max_step: Option<f64>,
    /// Simulated time between surface exchanges (`None` = every step)
    pub surface_interval: Option<f64>,
    /// Flat elevation the surface solver is seeded with (`None` = keep its DEM)
    pub initial_elevation: Option<f64>,
    /// Exchange settings
    pub exchange: ExchangeConfig,
}

impl Default for LinkageConfig {
    fn default() -> Self {
        Self {
            mechanics_bounds: Bounds3D::new([0.0, 0.0, -1.0], [1.0, 1.0, 0.0]),
            dem_bounds: None,
            resolution: GridResolution::square(2),
            transform: DomainTransform::identity(),
            materials: MaterialRegistry::default_geology(),
            checkpoint_interval: 1.0,
            max_step: None,
            surface_interval: None,
            initial_elevation: None,
            exchange: ExchangeConfig::default(),
        }
    }
}

impl LinkageConfig {
    pub fn new(mechanics_bounds: Bounds3D) -> Self {
        Self {
            mechanics_bounds,
            ..Default::default()
        }
    }

    pub fn with_dem_bounds(mut self, bounds: Bounds2D) -> Self {
        self.dem_bounds = Some(bounds);
        self
    }

    pub fn with_resolution(mut self, resolution: GridResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_transform(mut self, transform: DomainTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_materials(mut self, materials: MaterialRegistry) -> Self {
        self.materials = materials;
        self
    }

    pub fn with_checkpoint_interval(mut self, interval: f64) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = Some(max_step);
        self
    }

    pub fn with_surface_interval(mut self, interval: f64) -> Self {
        self.surface_interval = Some(interval);
        self
    }

    pub fn with_initial_elevation(mut self, elevation: f64) -> Self {
        self.initial_elevation = Some(elevation);
        self
    }

    pub fn with_exchange(mut self, exchange: ExchangeConfig) -> Self {
        self.exchange = exchange;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// DEM extent, falling back to the mechanics footprint.
    pub fn effective_dem_bounds(&self) -> Bounds2D {
        self.dem_bounds
            .unwrap_or_else(|| self.transform.bounds_to_dem(&self.mechanics_bounds.horizontal()))
    }

    /// Check every field without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build_mapper()?;
        TimeSynchronizer::new(self.sync_config())?;
        CheckpointScheduler::new(self.checkpoint_interval)?;

        let tol = self.exchange.elevation_tolerance;
        if !(tol.is_finite() && tol >= 0.0) {
            return Err(ConfigError::NonPositiveInterval {
                name: "elevation_tolerance",
                value: tol,
            });
        }
        Ok(())
    }

    pub(crate) fn build_mapper(&self) -> Result<DomainMapper, ConfigError> {
        DomainMapper::new(
            self.mechanics_bounds,
            self.effective_dem_bounds(),
            self.resolution,
            self.transform,
        )
    }

    pub(crate) fn build_exchange(&self) -> Result<SurfaceExchange, ConfigError> {
        let classifier = MaterialClassifier::new(self.materials.clone());
        Ok(SurfaceExchange::new(self.build_mapper()?, classifier).with_config(self.exchange))
    }

    pub(crate) fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            max_step: self.max_step,
            surface_interval: self.surface_interval,
        }
    }
}
