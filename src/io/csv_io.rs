use std::io::Read;
use std::path::Path;

use crate::analysis::{HistogramBin, ProjectedFruit};
use crate::error::HarvestError;
use crate::models::{average_diameter, MeasurementRecord};

/// CSV row structure for fruit measurements.
///
/// Every column is optional. When `diameter_mm` is absent the diameter is the
/// mean of the three axes, if all of them are present.
#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
pub(crate) struct MeasurementRow {
    #[serde(default)]
    pub fruit_id: Option<u64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub long: Option<f64>,
    #[serde(default)]
    pub diameter_mm: Option<f64>,
    #[serde(default)]
    pub major_mm: Option<f64>,
    #[serde(default)]
    pub minor_mm: Option<f64>,
    #[serde(default)]
    pub subminor_mm: Option<f64>,
}

impl MeasurementRow {
    pub(crate) fn into_record(self) -> MeasurementRecord {
        let diameter_mm = self.diameter_mm.or(match (self.major_mm, self.minor_mm, self.subminor_mm) {
            (Some(a), Some(b), Some(c)) => Some(average_diameter(a, b, c)),
            _ => None,
        });
        MeasurementRecord {
            fruit_id: self.fruit_id,
            lat: self.lat,
            long: self.long,
            diameter_mm,
        }
    }
}

fn parse_csv_records<R: Read>(
    rdr: &mut csv::Reader<R>,
) -> Result<Vec<MeasurementRecord>, HarvestError> {
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let row: MeasurementRow = result?;
        records.push(row.into_record());
    }
    Ok(records)
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All);
    builder
}

/// Read fruit measurements from a CSV file.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<MeasurementRecord>, HarvestError> {
    let mut rdr = reader_builder().from_path(path.as_ref())?;
    parse_csv_records(&mut rdr)
}

/// Read fruit measurements from CSV bytes.
pub fn read_csv_from_bytes(data: &[u8]) -> Result<Vec<MeasurementRecord>, HarvestError> {
    let mut rdr = reader_builder().from_reader(data);
    parse_csv_records(&mut rdr)
}

/// Write fruit measurements to a CSV file.
pub fn write_csv(records: &[MeasurementRecord], path: impl AsRef<Path>) -> Result<(), HarvestError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for record in records {
        wtr.serialize(MeasurementRow {
            fruit_id: record.fruit_id,
            lat: record.lat,
            long: record.long,
            diameter_mm: record.diameter_mm,
            ..MeasurementRow::default()
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write histogram bins to a CSV file.
pub fn write_histogram_csv(bins: &[HistogramBin], path: impl AsRef<Path>) -> Result<(), HarvestError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for bin in bins {
        wtr.serialize(bin)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write projected fruits to a CSV file.
pub fn write_fruits_csv(fruits: &[ProjectedFruit], path: impl AsRef<Path>) -> Result<(), HarvestError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    for fruit in fruits {
        wtr.serialize(fruit)?;
    }
    wtr.flush()?;
    Ok(())
}
