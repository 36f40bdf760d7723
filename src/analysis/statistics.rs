use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::analysis::ProjectedFruit;
use crate::error::HarvestError;

/// Confidence interval for a mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub std_error: f64,
    pub lower: f64,
    pub upper: f64,
    pub confidence_level: f64,
    pub sample_size: usize,
    /// Half-width of the interval as a percentage of the mean
    pub margin_percent: f64,
}

/// Aggregate figures over the fruits that survived the diameter filter.
///
/// Every field is zero when `count == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultStatistics {
    pub count: usize,
    pub average_predicted_volume: f64,
    pub average_diameter: f64,
    pub total_predicted_volume: f64,
    pub min_predicted_volume: f64,
    pub max_predicted_volume: f64,
    /// Interval on the mean predicted volume; needs at least two fruits
    pub predicted_volume_ci: Option<ConfidenceInterval>,
}

impl ResultStatistics {
    /// Statistics of an empty selection.
    pub fn empty() -> Self {
        Self {
            count: 0,
            average_predicted_volume: 0.0,
            average_diameter: 0.0,
            total_predicted_volume: 0.0,
            min_predicted_volume: 0.0,
            max_predicted_volume: 0.0,
            predicted_volume_ci: None,
        }
    }

    /// Sums, means and extremes over the given fruits.
    pub fn compute<'a, I>(fruits: I) -> Self
    where
        I: IntoIterator<Item = &'a ProjectedFruit>,
    {
        let mut count = 0usize;
        let mut total_volume = 0.0;
        let mut total_diameter = 0.0;
        let mut min_pv = f64::INFINITY;
        let mut max_pv = f64::NEG_INFINITY;

        for fruit in fruits {
            count += 1;
            total_volume += fruit.predicted_volume;
            total_diameter += fruit.diameter_mm;
            min_pv = min_pv.min(fruit.predicted_volume);
            max_pv = max_pv.max(fruit.predicted_volume);
        }

        if count == 0 {
            return Self::empty();
        }

        let n = count as f64;
        Self {
            count,
            average_predicted_volume: total_volume / n,
            average_diameter: total_diameter / n,
            total_predicted_volume: total_volume,
            min_predicted_volume: min_pv,
            max_predicted_volume: max_pv,
            predicted_volume_ci: None,
        }
    }

    /// Attach a confidence interval on the mean predicted volume.
    ///
    /// Leaves the interval unset when fewer than two values are available.
    pub fn with_interval(mut self, volumes: &[f64], confidence: f64) -> Result<Self, HarvestError> {
        self.predicted_volume_ci = if volumes.len() >= 2 {
            Some(compute_ci(volumes, confidence)?)
        } else {
            None
        };
        Ok(self)
    }
}

/// Compute a Student-t confidence interval from a set of values.
pub fn compute_ci(values: &[f64], confidence: f64) -> Result<ConfidenceInterval, HarvestError> {
    let n = values.len();
    if n < 2 {
        return Err(HarvestError::invalid_request(
            "confidence",
            "Need at least 2 observations for a confidence interval",
        ));
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(HarvestError::invalid_request(
            "confidence",
            format!("Confidence level must be between 0 and 1, got {confidence}"),
        ));
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_error = variance.sqrt() / (n as f64).sqrt();

    let df = (n - 1) as f64;
    let alpha = 1.0 - confidence;
    let t_dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| HarvestError::invalid_request("confidence", e.to_string()))?;
    let t_value = t_dist.inverse_cdf(1.0 - alpha / 2.0);

    let margin = t_value * std_error;
    let margin_percent = if mean.abs() > f64::EPSILON {
        (margin / mean) * 100.0
    } else {
        0.0
    };

    Ok(ConfidenceInterval {
        mean,
        std_error,
        lower: mean - margin,
        upper: mean + margin,
        confidence_level: confidence,
        sample_size: n,
        margin_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn fruit(diameter_mm: f64, predicted_volume: f64) -> ProjectedFruit {
        ProjectedFruit {
            fruit_id: None,
            lat: None,
            long: None,
            diameter_mm,
            scan_volume: predicted_volume,
            elapsed_days: 0.0,
            predicted_volume,
        }
    }

    #[test]
    fn test_empty_is_all_zero() {
        let stats = ResultStatistics::compute(std::iter::empty::<&ProjectedFruit>());
        assert_eq!(stats, ResultStatistics::empty());
        assert_eq!(stats.average_predicted_volume, 0.0);
        assert!(!stats.average_diameter.is_nan());
    }

    #[test]
    fn test_means_and_total() {
        let fruits = vec![fruit(40.0, 100.0), fruit(50.0, 200.0), fruit(60.0, 600.0)];
        let stats = ResultStatistics::compute(&fruits);
        assert_eq!(stats.count, 3);
        assert_approx_eq!(stats.total_predicted_volume, 900.0);
        assert_approx_eq!(stats.average_predicted_volume, 300.0);
        assert_approx_eq!(stats.average_diameter, 50.0);
        assert_eq!(stats.min_predicted_volume, 100.0);
        assert_eq!(stats.max_predicted_volume, 600.0);
        assert!(stats.predicted_volume_ci.is_none());
    }

    #[test]
    fn test_with_interval_needs_two_values() {
        let stats = ResultStatistics::compute(&[fruit(40.0, 10.0)])
            .with_interval(&[10.0], 0.95)
            .unwrap();
        assert!(stats.predicted_volume_ci.is_none());
    }

    #[test]
    fn test_with_interval_attached() {
        let fruits = vec![fruit(40.0, 10.0), fruit(41.0, 12.0), fruit(42.0, 14.0)];
        let volumes: Vec<f64> = fruits.iter().map(|f| f.predicted_volume).collect();
        let stats = ResultStatistics::compute(&fruits)
            .with_interval(&volumes, 0.95)
            .unwrap();
        let ci = stats.predicted_volume_ci.unwrap();
        assert_approx_eq!(ci.mean, stats.average_predicted_volume);
        assert_eq!(ci.sample_size, 3);
    }

    #[test]
    fn test_compute_ci_basic() {
        let values = vec![10.0, 12.0, 11.0, 13.0, 9.0];
        let ci = compute_ci(&values, 0.95).unwrap();
        assert_approx_eq!(ci.mean, 11.0);
        assert!(ci.lower < ci.mean);
        assert!(ci.upper > ci.mean);
        assert_approx_eq!(ci.mean - ci.lower, ci.upper - ci.mean, 1e-9);
    }

    #[test]
    fn test_compute_ci_identical_values() {
        let ci = compute_ci(&[7.0, 7.0, 7.0], 0.95).unwrap();
        assert_eq!(ci.std_error, 0.0);
        assert_eq!(ci.lower, 7.0);
        assert_eq!(ci.upper, 7.0);
    }

    #[test]
    fn test_compute_ci_higher_confidence_wider() {
        let values = vec![10.0, 12.0, 11.0, 13.0, 9.0];
        let ci_90 = compute_ci(&values, 0.90).unwrap();
        let ci_99 = compute_ci(&values, 0.99).unwrap();
        assert!(ci_99.upper - ci_99.lower > ci_90.upper - ci_90.lower);
    }

    #[test]
    fn test_compute_ci_rejects_bad_input() {
        assert!(compute_ci(&[1.0], 0.95).is_err());
        assert!(compute_ci(&[1.0, 2.0], 1.0).is_err());
        assert!(compute_ci(&[1.0, 2.0], 0.0).is_err());
    }

    #[test]
    fn test_statistics_json_roundtrip() {
        let stats = ResultStatistics::compute(&[fruit(40.0, 10.0), fruit(44.0, 20.0)]);
        let json = serde_json::to_string(&stats).unwrap();
        let back: ResultStatistics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
