use std::io::{Read, Seek};
use std::path::Path;

use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use crate::analysis::HarvestEstimate;
use crate::error::HarvestError;

use super::csv_io::MeasurementRow;
use crate::models::MeasurementRecord;

const MEASUREMENT_COLUMNS: [&str; 7] = [
    "fruit_id",
    "lat",
    "long",
    "diameter_mm",
    "major_mm",
    "minor_mm",
    "subminor_mm",
];

/// Read fruit measurements from an Excel (.xlsx) file.
///
/// Uses the first sheet. Columns are located by header name, so any subset of
/// fruit_id, lat, long, diameter_mm, major_mm, minor_mm, subminor_mm may
/// appear in any order.
pub fn read_excel(path: impl AsRef<Path>) -> Result<Vec<MeasurementRecord>, HarvestError> {
    let workbook: Xlsx<_> = open_workbook(path.as_ref())?;
    read_workbook(workbook)
}

/// Read fruit measurements from Excel bytes.
pub fn read_excel_from_bytes(data: &[u8]) -> Result<Vec<MeasurementRecord>, HarvestError> {
    let workbook = Xlsx::new(std::io::Cursor::new(data))?;
    read_workbook(workbook)
}

fn read_workbook<RS: Read + Seek>(mut workbook: Xlsx<RS>) -> Result<Vec<MeasurementRecord>, HarvestError> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| HarvestError::Excel("No sheets found in workbook".to_string()))?;

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let header = match rows.next() {
        Some(h) => h,
        None => return Ok(Vec::new()),
    };
    let column_of = |name: &str| -> Option<usize> {
        header
            .iter()
            .position(|c| c.to_string().trim().eq_ignore_ascii_case(name))
    };
    let columns: Vec<Option<usize>> = MEASUREMENT_COLUMNS.iter().map(|&n| column_of(n)).collect();

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let get = |slot: usize| -> Option<f64> {
            columns[slot]
                .and_then(|idx| row.get(idx))
                .and_then(|c| c.as_f64())
        };
        let measurement = MeasurementRow {
            fruit_id: get(0).map(|v| v as u64),
            lat: get(1),
            long: get(2),
            diameter_mm: get(3),
            major_mm: get(4),
            minor_mm: get(5),
            subminor_mm: get(6),
        };
        records.push(measurement.into_record());
    }

    Ok(records)
}

/// Write an estimate to an Excel (.xlsx) workbook with a Histogram, a
/// Statistics and a Fruits sheet.
pub fn write_excel(estimate: &HarvestEstimate, path: impl AsRef<Path>) -> Result<(), HarvestError> {
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Histogram")?;
        for (col, header) in ["bin_start", "bin_end", "bin_center", "count", "percentage"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, *header)?;
        }
        for (i, bin) in estimate.histogram.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_number(row, 0, bin.bin_start)?;
            sheet.write_number(row, 1, bin.bin_end)?;
            sheet.write_number(row, 2, bin.bin_center)?;
            sheet.write_number(row, 3, bin.count as f64)?;
            sheet.write_number(row, 4, bin.percentage)?;
        }
    }

    {
        let stats = &estimate.statistics;
        let sheet = workbook.add_worksheet();
        sheet.set_name("Statistics")?;
        let rows: [(&str, f64); 9] = [
            ("count", stats.count as f64),
            ("average_predicted_volume", stats.average_predicted_volume),
            ("average_diameter", stats.average_diameter),
            ("total_predicted_volume", stats.total_predicted_volume),
            ("min_predicted_volume", stats.min_predicted_volume),
            ("max_predicted_volume", stats.max_predicted_volume),
            ("days_between_scan_and_harvest", estimate.parameters.days_delta as f64),
            ("total_growth_per_fruit", estimate.total_growth_per_fruit),
            ("excluded_records", estimate.excluded_records as f64),
        ];
        for (i, (name, value)) in rows.iter().enumerate() {
            sheet.write_string(i as u32, 0, *name)?;
            sheet.write_number(i as u32, 1, *value)?;
        }
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Fruits")?;
        let headers = [
            "fruit_id",
            "lat",
            "long",
            "diameter_mm",
            "scan_volume",
            "predicted_volume",
        ];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header)?;
        }
        for (i, fruit) in estimate.fruits.iter().enumerate() {
            let row = (i + 1) as u32;
            if let Some(id) = fruit.fruit_id {
                sheet.write_number(row, 0, id as f64)?;
            }
            if let Some(lat) = fruit.lat {
                sheet.write_number(row, 1, lat)?;
            }
            if let Some(long) = fruit.long {
                sheet.write_number(row, 2, long)?;
            }
            sheet.write_number(row, 3, fruit.diameter_mm)?;
            sheet.write_number(row, 4, fruit.scan_volume)?;
            sheet.write_number(row, 5, fruit.predicted_volume)?;
        }
    }

    workbook.save(path.as_ref())?;
    Ok(())
}
