#![no_main]

use libfuzzer_sys::fuzz_target;

use harvest_volume_estimator::{
    estimate_harvest, io::read_csv_from_bytes, models::parse_date, ProjectionRequest,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(records) = read_csv_from_bytes(data) {
        let request = ProjectionRequest {
            scan_date: parse_date("scan_date", "2024-01-01").unwrap(),
            harvest_date: parse_date("harvest_date", "2024-02-01").unwrap(),
            growth_rate: 50.0,
            min_diameter: 0.0,
            max_diameter: 200.0,
            num_bins: 20,
        };
        let est = estimate_harvest(&records, &request).unwrap();
        let total: usize = est.histogram.iter().map(|b| b.count).sum();
        assert_eq!(total, est.statistics.count);
    }
});
