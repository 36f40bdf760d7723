use std::path::Path;

use serde::Serialize;

use crate::error::HarvestError;
use crate::io::read_measurements;
use crate::models::MeasurementRecord;

/// Result of a store health probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreHealth {
    pub reachable: bool,
    pub record_count: usize,
    pub source: String,
}

/// Source of fruit measurements for the estimation engine.
pub trait MeasurementStore: Send + Sync {
    /// Every stored measurement, in store order.
    fn records(&self) -> Result<Vec<MeasurementRecord>, HarvestError>;

    fn count(&self) -> Result<usize, HarvestError> {
        Ok(self.records()?.len())
    }

    fn health(&self) -> StoreHealth;
}

/// Measurements held in memory, usually loaded once from a file.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Vec<MeasurementRecord>,
    source: String,
}

impl InMemoryStore {
    pub fn new(records: Vec<MeasurementRecord>) -> Self {
        Self {
            records,
            source: "memory".to_string(),
        }
    }

    /// Load a CSV, JSON or XLSX measurement file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HarvestError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HarvestError::NotFound(format!(
                "Measurement file {}",
                path.display()
            )));
        }
        let records = read_measurements(path)?;
        tracing::info!(path = %path.display(), records = records.len(), "loaded measurements");
        Ok(Self {
            records,
            source: path.display().to_string(),
        })
    }

    pub fn as_slice(&self) -> &[MeasurementRecord] {
        &self.records
    }
}

impl MeasurementStore for InMemoryStore {
    fn records(&self) -> Result<Vec<MeasurementRecord>, HarvestError> {
        Ok(self.records.clone())
    }

    fn count(&self) -> Result<usize, HarvestError> {
        Ok(self.records.len())
    }

    fn health(&self) -> StoreHealth {
        StoreHealth {
            reachable: true,
            record_count: self.records.len(),
            source: self.source.clone(),
        }
    }
}
