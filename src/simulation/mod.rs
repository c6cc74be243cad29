//! Coupled run orchestration.
//!
//! This module ties together:
//! - [`LinkageConfig`]: validated run configuration (TOML-loadable)
//! - [`LinkageModel`]: the façade that owns both solvers and runs the loop
//! - [`RunSummary`]: statistics and resumable state of a finished run
//!
//! # Example
//! ```ignore
//! use surface_linkage::simulation::{LinkageConfig, LinkageModel};
//!
//! let config = LinkageConfig::from_toml_file("linkage.toml")?;
//! let mut model = LinkageModel::new(config, mechanics, landscape)?;
//! let summary = model.run_for(1.0e6)?;
//! println!("{summary}");
//! ```

mod config;
mod runner;
mod summary;

pub use config::LinkageConfig;
pub use runner::{Checkpoint, LinkageModel};
pub use summary::RunSummary;
