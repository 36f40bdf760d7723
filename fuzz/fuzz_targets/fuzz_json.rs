#![no_main]

use libfuzzer_sys::fuzz_target;

use harvest_volume_estimator::{io::read_json_from_bytes, ProjectionParams};

fuzz_target!(|data: &[u8]| {
    let _ = read_json_from_bytes(data);
    if let Ok(params) = serde_json::from_slice::<ProjectionParams>(data) {
        let _ = params.into_request(20);
    }
});
