use crate::analysis::DEFAULT_CONFIDENCE;
use crate::config::EstimatorConfig;
use crate::models::DEFAULT_NUM_BINS;
use crate::store::{InMemoryStore, MeasurementStore};

pub struct AppState {
    pub store: Box<dyn MeasurementStore>,
    /// Used when a request leaves out `num_bins`
    pub default_bins: usize,
    pub confidence: f64,
}

impl AppState {
    pub fn new(store: Box<dyn MeasurementStore>, config: &EstimatorConfig) -> Self {
        Self {
            store,
            default_bins: config.histogram.num_bins,
            confidence: config.histogram.confidence,
        }
    }

    pub fn new_in_memory(store: InMemoryStore) -> Self {
        Self {
            store: Box::new(store),
            default_bins: DEFAULT_NUM_BINS,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}
