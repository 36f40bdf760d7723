use serde::{Deserialize, Serialize};

use crate::error::HarvestError;
use crate::models::{MeasurementRecord, ProjectionRequest};

/// A measured fruit carried forward to the harvest date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedFruit {
    pub fruit_id: Option<u64>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    /// Scan-time diameter in mm
    pub diameter_mm: f64,
    /// Sphere volume implied by the scan-time diameter, in mm³
    pub scan_volume: f64,
    pub elapsed_days: f64,
    /// `scan_volume + growth_rate * elapsed_days`, in mm³
    pub predicted_volume: f64,
}

/// Result of projecting a whole measurement collection.
#[derive(Debug, Clone, Default)]
pub struct ProjectionOutcome {
    pub fruits: Vec<ProjectedFruit>,
    /// Records skipped because their diameter was unmeasurable
    pub excluded: usize,
}

/// Volume of a sphere with the given diameter: `4/3 * pi * (d/2)^3`.
///
/// # Examples
///
/// ```
/// use harvest_volume_estimator::analysis::sphere_volume;
///
/// assert!((sphere_volume(40.0) - 33_510.32).abs() < 0.01);
/// ```
pub fn sphere_volume(diameter_mm: f64) -> f64 {
    4.0 / 3.0 * std::f64::consts::PI * (diameter_mm / 2.0).powi(3)
}

/// Predicted harvest volume for a fruit of the given scan-time diameter.
///
/// Growth is linear in elapsed time with no clamping.
pub fn predicted_volume(diameter_mm: f64, request: &ProjectionRequest) -> f64 {
    sphere_volume(diameter_mm) + request.growth_volume()
}

/// Project one record to the harvest date.
///
/// Returns `HarvestError::InvalidRecord` when the diameter is missing,
/// non-positive or not finite, or when its projected volume is too large to
/// represent. Callers exclude such records.
pub fn project_fruit(
    record: &MeasurementRecord,
    request: &ProjectionRequest,
) -> Result<ProjectedFruit, HarvestError> {
    let diameter_mm = record.valid_diameter().ok_or_else(|| {
        HarvestError::InvalidRecord(format!(
            "{}: diameter must be a positive number, got {:?}",
            record.label(),
            record.diameter_mm
        ))
    })?;

    let scan_volume = sphere_volume(diameter_mm);
    let elapsed_days = request.elapsed_days();
    let predicted_volume = scan_volume + request.growth_rate * elapsed_days;
    if !predicted_volume.is_finite() {
        return Err(HarvestError::InvalidRecord(format!(
            "{}: projected volume overflows for diameter {diameter_mm}",
            record.label()
        )));
    }

    Ok(ProjectedFruit {
        fruit_id: record.fruit_id,
        lat: record.lat,
        long: record.long,
        diameter_mm,
        scan_volume,
        elapsed_days,
        predicted_volume,
    })
}

/// Project every record, dropping and counting the unmeasurable ones.
pub fn project_all(records: &[MeasurementRecord], request: &ProjectionRequest) -> ProjectionOutcome {
    let mut outcome = ProjectionOutcome {
        fruits: Vec::with_capacity(records.len()),
        excluded: 0,
    };

    for record in records {
        match project_fruit(record, request) {
            Ok(fruit) => outcome.fruits.push(fruit),
            Err(e) => {
                tracing::trace!("excluding record: {e}");
                outcome.excluded += 1;
            }
        }
    }

    if outcome.excluded > 0 {
        tracing::debug!(
            excluded = outcome.excluded,
            projected = outcome.fruits.len(),
            "excluded unmeasurable records"
        );
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use chrono::NaiveDate;

    fn request(growth_rate: f64) -> ProjectionRequest {
        ProjectionRequest {
            scan_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            harvest_date: NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
            growth_rate,
            min_diameter: 20.0,
            max_diameter: 120.0,
            num_bins: 1,
        }
    }

    #[test]
    fn test_sphere_volume_known_values() {
        assert_approx_eq!(sphere_volume(40.0), 33_510.321_638, 1e-4);
        assert_approx_eq!(sphere_volume(2.0), 4.0 / 3.0 * std::f64::consts::PI, 1e-12);
        assert_eq!(sphere_volume(0.0), 0.0);
    }

    #[test]
    fn test_project_single_fruit() {
        let fruit = project_fruit(&MeasurementRecord::new(40.0), &request(100.0)).unwrap();
        assert_eq!(fruit.diameter_mm, 40.0);
        assert_eq!(fruit.elapsed_days, 10.0);
        assert_approx_eq!(fruit.scan_volume, 33_510.3, 0.1);
        assert_approx_eq!(fruit.predicted_volume, 34_510.3, 0.1);
    }

    #[test]
    fn test_zero_growth_keeps_scan_volume() {
        let fruit = project_fruit(&MeasurementRecord::new(55.0), &request(0.0)).unwrap();
        assert_eq!(fruit.predicted_volume, fruit.scan_volume);
    }

    #[test]
    fn test_metadata_carried_through() {
        let rec = MeasurementRecord::new(40.0)
            .with_id(99)
            .with_location(1.5, 2.5);
        let fruit = project_fruit(&rec, &request(1.0)).unwrap();
        assert_eq!(fruit.fruit_id, Some(99));
        assert_eq!(fruit.lat, Some(1.5));
        assert_eq!(fruit.long, Some(2.5));
    }

    #[test]
    fn test_invalid_records_rejected() {
        let req = request(1.0);
        for d in [0.0, -10.0, f64::NAN] {
            let err = project_fruit(&MeasurementRecord::new(d), &req).unwrap_err();
            assert!(matches!(err, HarvestError::InvalidRecord(_)));
        }
        let missing = MeasurementRecord {
            diameter_mm: None,
            ..MeasurementRecord::new(1.0)
        };
        assert!(project_fruit(&missing, &req).is_err());
    }

    #[test]
    fn test_overflowing_volume_rejected() {
        let req = request(1.0);
        let err = project_fruit(&MeasurementRecord::new(1e104), &req).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidRecord(_)));

        let fruit = project_fruit(&MeasurementRecord::new(1e100), &req).unwrap();
        assert!(fruit.predicted_volume.is_finite());

        let outcome = project_all(
            &[MeasurementRecord::new(10.0), MeasurementRecord::new(1e104)],
            &req,
        );
        assert_eq!(outcome.fruits.len(), 1);
        assert_eq!(outcome.excluded, 1);
    }

    #[test]
    fn test_project_all_counts_exclusions() {
        let records = vec![
            MeasurementRecord::new(40.0),
            MeasurementRecord::new(-1.0),
            MeasurementRecord::new(60.0),
            MeasurementRecord::new(0.0),
        ];
        let outcome = project_all(&records, &request(5.0));
        assert_eq!(outcome.fruits.len(), 2);
        assert_eq!(outcome.excluded, 2);
        assert_eq!(outcome.fruits[0].diameter_mm, 40.0);
        assert_eq!(outcome.fruits[1].diameter_mm, 60.0);
    }

    #[test]
    fn test_project_all_empty() {
        let outcome = project_all(&[], &request(5.0));
        assert!(outcome.fruits.is_empty());
        assert_eq!(outcome.excluded, 0);
    }

    #[test]
    fn test_predicted_volume_matches_projection() {
        let req = request(12.5);
        let fruit = project_fruit(&MeasurementRecord::new(33.0), &req).unwrap();
        assert_eq!(predicted_volume(33.0, &req), fruit.predicted_volume);
    }

    #[test]
    fn test_higher_growth_never_lowers_volume() {
        let rec = MeasurementRecord::new(48.0);
        let slow = project_fruit(&rec, &request(10.0)).unwrap();
        let fast = project_fruit(&rec, &request(20.0)).unwrap();
        assert!(fast.predicted_volume >= slow.predicted_volume);
    }
}
