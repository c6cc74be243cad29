//! Surface exchange: swarm → DEM → surface processes → material reclassification.

mod report;
mod surface;

pub use report::{ColumnChange, ExchangeReport, ExchangeWarning};
pub use surface::{ExchangeConfig, SurfaceExchange};
