pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod models;
pub mod store;
pub mod visualization;

#[cfg(feature = "web")]
pub mod web;

pub use analysis::{estimate_harvest, Estimator, HarvestEstimate, HistogramBin, ProjectedFruit};
pub use config::EstimatorConfig;
pub use error::HarvestError;
pub use io::{EstimateWriter, MeasurementReader};
pub use models::{MeasurementRecord, ProjectionParams, ProjectionRequest};
pub use store::{InMemoryStore, MeasurementStore};
