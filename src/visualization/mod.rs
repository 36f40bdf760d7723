mod tables;
mod charts;

pub use tables::{
    format_statistics_table, print_statistics_table,
    format_fruits_table, print_fruits_table,
    format_measurement_summary, print_measurement_summary,
};
pub use charts::{format_volume_histogram, print_volume_histogram};
