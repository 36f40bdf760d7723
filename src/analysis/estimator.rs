use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::{
    aggregate, project_all, HistogramBin, ProjectedFruit, ProjectionOutcome, RangeBasis,
    ResultStatistics,
};
use crate::error::HarvestError;
use crate::models::{MeasurementRecord, ProjectionRequest};

/// Default confidence level for the interval on mean predicted volume.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Request parameters echoed back with every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateParameters {
    pub scan_date: NaiveDate,
    pub harvest_date: NaiveDate,
    pub growth_rate: f64,
    pub min_diameter: f64,
    pub max_diameter: f64,
    pub num_bins: usize,
    pub days_delta: i64,
}

impl From<&ProjectionRequest> for EstimateParameters {
    fn from(req: &ProjectionRequest) -> Self {
        Self {
            scan_date: req.scan_date,
            harvest_date: req.harvest_date,
            growth_rate: req.growth_rate,
            min_diameter: req.min_diameter,
            max_diameter: req.max_diameter,
            num_bins: req.num_bins,
            days_delta: req.elapsed_days() as i64,
        }
    }
}

/// Complete result of one harvest estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestEstimate {
    pub parameters: EstimateParameters,
    /// Fruits inside the diameter window
    pub fruits: Vec<ProjectedFruit>,
    pub histogram: Vec<HistogramBin>,
    pub statistics: ResultStatistics,
    pub range_basis: RangeBasis,
    /// Volume added to every fruit between scan and harvest
    pub total_growth_per_fruit: f64,
    /// Records dropped for a missing or non-positive diameter
    pub excluded_records: usize,
    /// Valid records outside the diameter window
    pub filtered_out: usize,
}

/// Estimation API over a borrowed measurement collection.
///
/// Holds no state between calls; the same records and request always give
/// the same estimate.
pub struct Estimator<'a> {
    records: &'a [MeasurementRecord],
    confidence: f64,
}

impl<'a> Estimator<'a> {
    /// Create a new Estimator for the given measurements.
    pub fn new(records: &'a [MeasurementRecord]) -> Self {
        Self {
            records,
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    /// Use a different confidence level for the mean-volume interval.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Validate the request and project every measurable record.
    pub fn project(&self, request: &ProjectionRequest) -> Result<ProjectionOutcome, HarvestError> {
        request.validate()?;
        Ok(project_all(self.records, request))
    }

    /// Project, filter, bin and summarize.
    pub fn estimate(&self, request: &ProjectionRequest) -> Result<HarvestEstimate, HarvestError> {
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(HarvestError::invalid_request(
                "confidence",
                format!("Confidence level must be between 0 and 1, got {}", self.confidence),
            ));
        }

        let outcome = self.project(request)?;
        let dist = aggregate(&outcome.fruits, request)?;

        let volumes: Vec<f64> = dist.fruits.iter().map(|f| f.predicted_volume).collect();
        let statistics = dist.statistics.with_interval(&volumes, self.confidence)?;

        tracing::info!(
            records = self.records.len(),
            excluded = outcome.excluded,
            filtered_out = dist.filtered_out,
            count = statistics.count,
            "harvest estimate computed"
        );

        Ok(HarvestEstimate {
            parameters: EstimateParameters::from(request),
            fruits: dist.fruits,
            histogram: dist.bins,
            statistics,
            range_basis: dist.range_basis,
            total_growth_per_fruit: request.growth_volume(),
            excluded_records: outcome.excluded,
            filtered_out: dist.filtered_out,
        })
    }

    /// Histogram bins only.
    pub fn histogram(&self, request: &ProjectionRequest) -> Result<Vec<HistogramBin>, HarvestError> {
        Ok(self.estimate(request)?.histogram)
    }
}

/// Shorthand for `Estimator::new(records).estimate(request)`.
pub fn estimate_harvest(
    records: &[MeasurementRecord],
    request: &ProjectionRequest,
) -> Result<HarvestEstimate, HarvestError> {
    Estimator::new(records).estimate(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn request() -> ProjectionRequest {
        ProjectionRequest {
            scan_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            harvest_date: NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
            growth_rate: 100.0,
            min_diameter: 20.0,
            max_diameter: 120.0,
            num_bins: 5,
        }
    }

    fn records() -> Vec<MeasurementRecord> {
        vec![
            MeasurementRecord::new(30.0).with_id(1),
            MeasurementRecord::new(45.0).with_id(2),
            MeasurementRecord::new(-2.0).with_id(3),
            MeasurementRecord::new(60.0).with_id(4),
            MeasurementRecord::new(150.0).with_id(5),
        ]
    }

    #[test]
    fn test_estimate_counts() {
        let recs = records();
        let est = Estimator::new(&recs).estimate(&request()).unwrap();
        assert_eq!(est.statistics.count, 3);
        assert_eq!(est.excluded_records, 1);
        assert_eq!(est.filtered_out, 1);
        assert_eq!(est.fruits.len(), 3);
        assert_eq!(est.histogram.len(), 5);
        assert_eq!(est.histogram.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn test_estimate_echoes_parameters() {
        let recs = records();
        let est = Estimator::new(&recs).estimate(&request()).unwrap();
        assert_eq!(est.parameters.days_delta, 10);
        assert_eq!(est.parameters.num_bins, 5);
        assert_approx_eq!(est.total_growth_per_fruit, 1000.0);
    }

    #[test]
    fn test_estimate_attaches_interval() {
        let recs = records();
        let est = Estimator::new(&recs)
            .with_confidence(0.90)
            .estimate(&request())
            .unwrap();
        let ci = est.statistics.predicted_volume_ci.unwrap();
        assert_eq!(ci.sample_size, 3);
        assert_eq!(ci.confidence_level, 0.90);
    }

    #[test]
    fn test_bad_confidence_rejected() {
        let recs = records();
        let err = Estimator::new(&recs)
            .with_confidence(1.5)
            .estimate(&request())
            .unwrap_err();
        assert!(matches!(
            err,
            HarvestError::InvalidRequest { field: "confidence", .. }
        ));
    }

    #[test]
    fn test_invalid_request_before_projection() {
        let recs = records();
        let mut req = request();
        req.growth_rate = -1.0;
        assert!(Estimator::new(&recs).project(&req).is_err());
        assert!(Estimator::new(&recs).estimate(&req).is_err());
    }

    #[test]
    fn test_histogram_matches_estimate() {
        let recs = records();
        let est = Estimator::new(&recs);
        assert_eq!(est.histogram(&request()).unwrap(), est.estimate(&request()).unwrap().histogram);
    }

    #[test]
    fn test_estimate_harvest_shorthand() {
        let recs = records();
        let a = estimate_harvest(&recs, &request()).unwrap();
        let b = Estimator::new(&recs).estimate(&request()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_records() {
        let est = estimate_harvest(&[], &request()).unwrap();
        assert_eq!(est.statistics.count, 0);
        assert_eq!(est.excluded_records, 0);
        assert_eq!(est.range_basis, RangeBasis::WindowImplied);
    }
}
