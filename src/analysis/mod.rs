mod projection;
mod distribution;
mod statistics;
mod estimator;

pub use projection::{
    predicted_volume, project_all, project_fruit, sphere_volume, ProjectedFruit,
    ProjectionOutcome,
};
pub use distribution::{
    aggregate, assign_bin, bin_edges, filter_window, HistogramBin, RangeBasis,
    VolumeDistribution,
};
pub use statistics::{compute_ci, ConfidenceInterval, ResultStatistics};
pub use estimator::{
    estimate_harvest, EstimateParameters, Estimator, HarvestEstimate, DEFAULT_CONFIDENCE,
};
