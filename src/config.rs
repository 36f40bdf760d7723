use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::DEFAULT_CONFIDENCE;
use crate::error::HarvestError;
use crate::models::{DEFAULT_NUM_BINS, MAX_NUM_BINS};

/// Histogram defaults applied when a request leaves them out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    pub num_bins: usize,
    pub confidence: f64,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            num_bins: DEFAULT_NUM_BINS,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Top-level configuration, read from an optional TOML file.
///
/// ```toml
/// [histogram]
/// num_bins = 20
/// confidence = 0.95
///
/// [server]
/// host = "127.0.0.1"
/// port = 8080
///
/// [logging]
/// level = "info"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub histogram: HistogramConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl EstimatorConfig {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HarvestError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, HarvestError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, HarvestError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.histogram.num_bins == 0 {
            return Err(HarvestError::invalid_request(
                "num_bins",
                "num_bins must be a positive integer",
            ));
        }
        if self.histogram.num_bins > MAX_NUM_BINS {
            return Err(HarvestError::invalid_request(
                "num_bins",
                format!("num_bins must be at most {MAX_NUM_BINS}"),
            ));
        }
        let c = self.histogram.confidence;
        if !(c > 0.0 && c < 1.0) {
            return Err(HarvestError::invalid_request(
                "confidence",
                format!("Confidence level must be between 0 and 1, got {c}"),
            ));
        }
        if self.server.port == 0 {
            return Err(HarvestError::invalid_request("port", "port must be non-zero"));
        }
        Ok(())
    }
}
