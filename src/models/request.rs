use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HarvestError;

/// Default number of histogram bins.
pub const DEFAULT_NUM_BINS: usize = 20;

/// Largest histogram accepted from any input surface.
pub const MAX_NUM_BINS: usize = 10_000;

/// Date format accepted on every input surface.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn default_num_bins() -> usize {
    DEFAULT_NUM_BINS
}

/// Parameters of one harvest projection.
///
/// Construct it directly or through [`ProjectionParams`]; either way call
/// [`ProjectionRequest::validate`] before computing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub scan_date: NaiveDate,
    pub harvest_date: NaiveDate,
    /// Volumetric growth per elapsed day in mm³
    pub growth_rate: f64,
    /// Lower bound of the scan-time diameter filter (inclusive)
    pub min_diameter: f64,
    /// Upper bound of the scan-time diameter filter (inclusive)
    pub max_diameter: f64,
    #[serde(default = "default_num_bins")]
    pub num_bins: usize,
}

impl ProjectionRequest {
    /// Check every precondition, reporting the first one that fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use harvest_volume_estimator::ProjectionRequest;
    ///
    /// let req = ProjectionRequest {
    ///     scan_date: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
    ///     harvest_date: NaiveDate::from_ymd_opt(2024, 10, 11).unwrap(),
    ///     growth_rate: 1000.0,
    ///     min_diameter: 5.0,
    ///     max_diameter: 20.0,
    ///     num_bins: 20,
    /// };
    /// assert!(req.validate().is_ok());
    /// assert_eq!(req.elapsed_days(), 10.0);
    /// ```
    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.harvest_date <= self.scan_date {
            return Err(HarvestError::invalid_request(
                "harvest_date",
                "Harvest date must be after scan date",
            ));
        }
        if !self.growth_rate.is_finite() {
            return Err(HarvestError::invalid_request(
                "growth_rate",
                "Growth rate must be a finite number",
            ));
        }
        if self.growth_rate < 0.0 {
            return Err(HarvestError::invalid_request(
                "growth_rate",
                "Growth rate must be non-negative",
            ));
        }
        for (field, value) in [
            ("min_diameter", self.min_diameter),
            ("max_diameter", self.max_diameter),
        ] {
            if !value.is_finite() {
                return Err(HarvestError::invalid_request(
                    field,
                    "Diameter values must be finite numbers",
                ));
            }
            if value < 0.0 {
                return Err(HarvestError::invalid_request(
                    field,
                    "Diameter values must be non-negative",
                ));
            }
        }
        if self.min_diameter >= self.max_diameter {
            return Err(HarvestError::invalid_request(
                "min_diameter",
                "Minimum diameter must be less than maximum diameter",
            ));
        }
        if self.num_bins == 0 {
            return Err(HarvestError::invalid_request(
                "num_bins",
                "Number of bins must be positive",
            ));
        }
        if self.num_bins > MAX_NUM_BINS {
            return Err(HarvestError::invalid_request(
                "num_bins",
                format!("Number of bins must be at most {MAX_NUM_BINS}"),
            ));
        }
        Ok(())
    }

    /// Whole days between scan and harvest, from the calendar difference.
    pub fn elapsed_days(&self) -> f64 {
        self.harvest_date
            .signed_duration_since(self.scan_date)
            .num_days() as f64
    }

    /// Volume every fruit gains between scan and harvest.
    pub fn growth_volume(&self) -> f64 {
        self.growth_rate * self.elapsed_days()
    }

    pub fn window(&self) -> DiameterWindow {
        DiameterWindow {
            min: self.min_diameter,
            max: self.max_diameter,
        }
    }
}

/// Inclusive scan-time diameter filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiameterWindow {
    pub min: f64,
    pub max: f64,
}

impl DiameterWindow {
    /// Both ends are inclusive, unlike histogram bins.
    pub fn contains(&self, diameter_mm: f64) -> bool {
        self.min <= diameter_mm && diameter_mm <= self.max
    }
}

/// Loosely-typed request parameters as they arrive from JSON or the CLI.
///
/// Numbers may be given as JSON numbers or numeric strings. Conversion into a
/// [`ProjectionRequest`] reports missing or malformed fields by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionParams {
    pub scan_date: Option<String>,
    pub harvest_date: Option<String>,
    pub growth_rate: Option<Value>,
    pub min_diameter: Option<Value>,
    pub max_diameter: Option<Value>,
    pub num_bins: Option<Value>,
}

impl ProjectionParams {
    /// Parse and validate into a request, using `default_bins` when
    /// `num_bins` is absent.
    pub fn into_request(self, default_bins: usize) -> Result<ProjectionRequest, HarvestError> {
        let scan_date = parse_date("scan_date", require("scan_date", self.scan_date)?.as_str())?;
        let harvest_date =
            parse_date("harvest_date", require("harvest_date", self.harvest_date)?.as_str())?;
        let growth_rate = parse_number("growth_rate", &require("growth_rate", self.growth_rate)?)?;
        let min_diameter =
            parse_number("min_diameter", &require("min_diameter", self.min_diameter)?)?;
        let max_diameter =
            parse_number("max_diameter", &require("max_diameter", self.max_diameter)?)?;
        let num_bins = match self.num_bins {
            None | Some(Value::Null) => default_bins,
            Some(v) => parse_bins(&v)?,
        };

        let request = ProjectionRequest {
            scan_date,
            harvest_date,
            growth_rate,
            min_diameter,
            max_diameter,
            num_bins,
        };
        request.validate()?;
        Ok(request)
    }
}

fn require<T>(field: &'static str, value: Option<T>) -> Result<T, HarvestError> {
    value.ok_or_else(|| {
        HarvestError::invalid_request(field, format!("Missing required parameter: {field}"))
    })
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(field: &'static str, s: &str) -> Result<NaiveDate, HarvestError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| {
        HarvestError::invalid_request(
            field,
            format!("Invalid date format. Expected YYYY-MM-DD, got: {s}"),
        )
    })
}

fn parse_number(field: &'static str, value: &Value) -> Result<f64, HarvestError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        HarvestError::invalid_request(
            field,
            "growth_rate, min_diameter, and max_diameter must be valid numbers",
        )
    })
}

fn parse_bins(value: &Value) -> Result<usize, HarvestError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n > MAX_NUM_BINS as i64 => Err(HarvestError::invalid_request(
            "num_bins",
            format!("Number of bins must be at most {MAX_NUM_BINS}"),
        )),
        Some(n) if n > 0 => Ok(n as usize),
        Some(_) => Err(HarvestError::invalid_request(
            "num_bins",
            "Number of bins must be positive",
        )),
        None => Err(HarvestError::invalid_request(
            "num_bins",
            "num_bins must be a whole number",
        )),
    }
}
