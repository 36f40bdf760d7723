mod csv_io;
mod json_io;
mod excel_io;

use std::path::Path;

use crate::analysis::HarvestEstimate;
use crate::error::HarvestError;
use crate::models::MeasurementRecord;

pub use csv_io::{read_csv, read_csv_from_bytes, write_csv, write_fruits_csv, write_histogram_csv};
pub use json_io::{read_json, read_json_from_bytes, write_json};
pub use excel_io::{read_excel, read_excel_from_bytes, write_excel};

/// Trait for reading fruit measurements from a file.
pub trait MeasurementReader {
    fn read(&self, path: &Path) -> Result<Vec<MeasurementRecord>, HarvestError>;
}

/// Trait for writing a harvest estimate to a file.
pub trait EstimateWriter {
    fn write(&self, estimate: &HarvestEstimate, path: &Path) -> Result<(), HarvestError>;
}

/// CSV format reader/writer. Estimates are written as their histogram bins.
pub struct CsvFormat;

impl MeasurementReader for CsvFormat {
    fn read(&self, path: &Path) -> Result<Vec<MeasurementRecord>, HarvestError> {
        read_csv(path)
    }
}

impl EstimateWriter for CsvFormat {
    fn write(&self, estimate: &HarvestEstimate, path: &Path) -> Result<(), HarvestError> {
        write_histogram_csv(&estimate.histogram, path)
    }
}

/// JSON format reader/writer.
#[derive(Default)]
pub struct JsonFormat {
    pub pretty: bool,
}

impl MeasurementReader for JsonFormat {
    fn read(&self, path: &Path) -> Result<Vec<MeasurementRecord>, HarvestError> {
        read_json(path)
    }
}

impl EstimateWriter for JsonFormat {
    fn write(&self, estimate: &HarvestEstimate, path: &Path) -> Result<(), HarvestError> {
        write_json(estimate, path, self.pretty)
    }
}

/// Excel (.xlsx) format reader/writer.
pub struct ExcelFormat;

impl MeasurementReader for ExcelFormat {
    fn read(&self, path: &Path) -> Result<Vec<MeasurementRecord>, HarvestError> {
        read_excel(path)
    }
}

impl EstimateWriter for ExcelFormat {
    fn write(&self, estimate: &HarvestEstimate, path: &Path) -> Result<(), HarvestError> {
        write_excel(estimate, path)
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Read measurements, picking the format from the file extension.
pub fn read_measurements(path: impl AsRef<Path>) -> Result<Vec<MeasurementRecord>, HarvestError> {
    let path = path.as_ref();
    match extension(path).as_str() {
        "csv" => CsvFormat.read(path),
        "json" => JsonFormat::default().read(path),
        "xlsx" | "xls" => ExcelFormat.read(path),
        other => Err(HarvestError::ParseError(format!(
            "Unsupported input format '{other}' for {}",
            path.display()
        ))),
    }
}

/// Write an estimate, picking the format from the file extension.
pub fn write_estimate(estimate: &HarvestEstimate, path: impl AsRef<Path>) -> Result<(), HarvestError> {
    let path = path.as_ref();
    match extension(path).as_str() {
        "csv" => CsvFormat.write(estimate, path),
        "json" => JsonFormat { pretty: true }.write(estimate, path),
        "xlsx" => ExcelFormat.write(estimate, path),
        other => Err(HarvestError::ParseError(format!(
            "Unsupported output format '{other}' for {}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::estimate_harvest;
    use crate::models::ProjectionRequest;
    use chrono::NaiveDate;

    fn sample_records() -> Vec<MeasurementRecord> {
        vec![
            MeasurementRecord::new(35.0).with_id(1),
            MeasurementRecord::new(48.0).with_id(2),
            MeasurementRecord::new(62.0).with_id(3),
        ]
    }

    fn sample_estimate() -> HarvestEstimate {
        let request = ProjectionRequest {
            scan_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            harvest_date: NaiveDate::from_ymd_opt(2024, 9, 15).unwrap(),
            growth_rate: 25.0,
            min_diameter: 30.0,
            max_diameter: 70.0,
            num_bins: 3,
        };
        estimate_harvest(&sample_records(), &request).unwrap()
    }

    #[test]
    fn test_csv_trait_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fruits.csv");
        write_csv(&sample_records(), &path).unwrap();

        let reader: &dyn MeasurementReader = &CsvFormat;
        assert_eq!(reader.read(&path).unwrap(), sample_records());
    }

    #[test]
    fn test_json_trait_roundtrip() {
        let estimate = sample_estimate();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("estimate.json");

        let writer: &dyn EstimateWriter = &JsonFormat { pretty: true };
        writer.write(&estimate, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: HarvestEstimate = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.statistics.count, estimate.statistics.count);
        assert_eq!(loaded.histogram.len(), 3);
    }

    #[test]
    fn test_json_format_default() {
        let fmt = JsonFormat::default();
        assert!(!fmt.pretty);
    }

    #[test]
    fn test_read_measurements_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("fruits.CSV");
        write_csv(&sample_records(), &csv_path).unwrap();
        assert_eq!(read_measurements(&csv_path).unwrap().len(), 3);

        let json_path = dir.path().join("fruits.json");
        write_json(&sample_records(), &json_path, false).unwrap();
        assert_eq!(read_measurements(&json_path).unwrap().len(), 3);
    }

    #[test]
    fn test_write_estimate_by_extension() {
        let estimate = sample_estimate();
        let dir = tempfile::tempdir().unwrap();
        for name in ["out.csv", "out.json", "out.xlsx"] {
            let path = dir.path().join(name);
            write_estimate(&estimate, &path).unwrap();
            assert!(path.exists(), "{name} not written");
        }
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            read_measurements("fruits.txt").unwrap_err(),
            HarvestError::ParseError(_)
        ));
        assert!(write_estimate(&sample_estimate(), "out.parquet").is_err());
    }
}
