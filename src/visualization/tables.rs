use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::analysis::{HarvestEstimate, ProjectedFruit};
use crate::models::MeasurementRecord;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_else(|| "-".to_string())
}

/// Format the estimate summary table as a string.
pub fn format_statistics_table(estimate: &HarvestEstimate) -> String {
    let params = &estimate.parameters;
    let stats = &estimate.statistics;

    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Harvest Estimate".bold().green()));
    output.push_str(&format!(
        "{}\n",
        format!(
            "Scan {} -> Harvest {} ({} days) | Window {:.1}-{:.1} mm",
            params.scan_date, params.harvest_date, params.days_delta, params.min_diameter,
            params.max_diameter
        )
        .dimmed()
    ));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let mut table = new_table();
    table.set_header(vec!["Metric", "Value", "Unit"]);

    let rows = [
        ("Fruits in window", format!("{}", stats.count), ""),
        ("Excluded records", format!("{}", estimate.excluded_records), ""),
        ("Outside window", format!("{}", estimate.filtered_out), ""),
        ("Growth per fruit", format!("{:.1}", estimate.total_growth_per_fruit), "mm³"),
        ("Mean predicted volume", format!("{:.1}", stats.average_predicted_volume), "mm³"),
        ("Min predicted volume", format!("{:.1}", stats.min_predicted_volume), "mm³"),
        ("Max predicted volume", format!("{:.1}", stats.max_predicted_volume), "mm³"),
        ("Total predicted volume", format!("{:.1}", stats.total_predicted_volume), "mm³"),
        ("Mean diameter", format!("{:.2}", stats.average_diameter), "mm"),
    ];
    for (name, value, unit) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value), Cell::new(unit)]);
    }

    if let Some(ci) = &stats.predicted_volume_ci {
        table.add_row(vec![
            Cell::new(format!("{:.0}% CI (mean volume)", ci.confidence_level * 100.0)),
            Cell::new(format!("{:.1} - {:.1}", ci.lower, ci.upper)),
            Cell::new("mm³"),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the estimate summary table.
pub fn print_statistics_table(estimate: &HarvestEstimate) {
    print!("{}", format_statistics_table(estimate));
}

/// Format the per-fruit projection table as a string.
pub fn format_fruits_table(fruits: &[ProjectedFruit]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Projected Fruits".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let mut table = new_table();
    table.set_header(vec![
        "Fruit",
        "Lat",
        "Long",
        "Diameter (mm)",
        "Scan Vol (mm³)",
        "Predicted Vol (mm³)",
    ]);

    for fruit in fruits {
        table.add_row(vec![
            Cell::new(
                fruit
                    .fruit_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(optional(fruit.lat, 6)),
            Cell::new(optional(fruit.long, 6)),
            Cell::new(format!("{:.2}", fruit.diameter_mm)),
            Cell::new(format!("{:.1}", fruit.scan_volume)),
            Cell::new(format!("{:.1}", fruit.predicted_volume)),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the per-fruit projection table.
pub fn print_fruits_table(fruits: &[ProjectedFruit]) {
    print!("{}", format_fruits_table(fruits));
}

/// Format an overview of a measurement file as a string.
pub fn format_measurement_summary(records: &[MeasurementRecord]) -> String {
    let diameters: Vec<f64> = records.iter().filter_map(|r| r.valid_diameter()).collect();
    let measurable = diameters.len();
    let (min, max, mean) = if measurable == 0 {
        (None, None, None)
    } else {
        (
            Some(diameters.iter().copied().fold(f64::INFINITY, f64::min)),
            Some(diameters.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            Some(diameters.iter().sum::<f64>() / measurable as f64),
        )
    };
    let located = records
        .iter()
        .filter(|r| r.lat.is_some() && r.long.is_some())
        .count();

    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Measurement Summary".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = new_table();
    table.set_header(vec!["Metric", "Value", "Unit"]);
    table.add_row(vec![
        Cell::new("Records"),
        Cell::new(records.len()),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Measurable"),
        Cell::new(measurable),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Missing or invalid diameter"),
        Cell::new(records.len() - measurable),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("With location"),
        Cell::new(located),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Min diameter"),
        Cell::new(optional(min, 2)),
        Cell::new("mm"),
    ]);
    table.add_row(vec![
        Cell::new("Max diameter"),
        Cell::new(optional(max, 2)),
        Cell::new("mm"),
    ]);
    table.add_row(vec![
        Cell::new("Mean diameter"),
        Cell::new(optional(mean, 2)),
        Cell::new("mm"),
    ]);

    output.push_str(&format!("{table}"));
    output
}

/// Print an overview of a measurement file.
pub fn print_measurement_summary(records: &[MeasurementRecord]) {
    print!("{}", format_measurement_summary(records));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::estimate_harvest;
    use crate::models::ProjectionRequest;
    use chrono::NaiveDate;

    fn sample_records() -> Vec<MeasurementRecord> {
        vec![
            MeasurementRecord::new(40.0).with_id(1).with_location(-33.5, 150.25),
            MeasurementRecord::new(50.0).with_id(2),
            MeasurementRecord::new(60.0).with_id(3),
            MeasurementRecord {
                fruit_id: Some(4),
                lat: None,
                long: None,
                diameter_mm: None,
            },
        ]
    }

    fn sample_estimate() -> HarvestEstimate {
        let request = ProjectionRequest {
            scan_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            harvest_date: NaiveDate::from_ymd_opt(2024, 2, 21).unwrap(),
            growth_rate: 10.0,
            min_diameter: 30.0,
            max_diameter: 55.0,
            num_bins: 4,
        };
        estimate_harvest(&sample_records(), &request).unwrap()
    }

    #[test]
    fn test_format_statistics_table_contains_fields() {
        let output = format_statistics_table(&sample_estimate());
        assert!(output.contains("Harvest Estimate"));
        assert!(output.contains("Fruits in window"));
        assert!(output.contains("Excluded records"));
        assert!(output.contains("Mean predicted volume"));
        assert!(output.contains("20 days"));
        assert!(output.contains("95% CI"));
    }

    #[test]
    fn test_format_statistics_table_without_interval() {
        let mut estimate = sample_estimate();
        estimate.statistics.predicted_volume_ci = None;
        let output = format_statistics_table(&estimate);
        assert!(!output.contains("CI (mean volume)"));
    }

    #[test]
    fn test_format_fruits_table() {
        let estimate = sample_estimate();
        let output = format_fruits_table(&estimate.fruits);
        assert!(output.contains("Projected Fruits"));
        assert!(output.contains("Predicted Vol"));
        assert!(output.contains("-33.500000"));
        assert!(output.contains("40.00"));
    }

    #[test]
    fn test_format_fruits_table_empty() {
        let output = format_fruits_table(&[]);
        assert!(output.contains("Projected Fruits"));
    }

    #[test]
    fn test_format_measurement_summary() {
        let output = format_measurement_summary(&sample_records());
        assert!(output.contains("Measurement Summary"));
        assert!(output.contains("Missing or invalid diameter"));
        assert!(output.contains("50.00"));
    }

    #[test]
    fn test_format_measurement_summary_empty() {
        let output = format_measurement_summary(&[]);
        assert!(output.contains("Records"));
    }
}
