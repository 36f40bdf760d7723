use std::path::Path;

use serde::Serialize;

use crate::error::HarvestError;
use crate::models::MeasurementRecord;

/// Read fruit measurements from a JSON file holding an array of records.
pub fn read_json(path: impl AsRef<Path>) -> Result<Vec<MeasurementRecord>, HarvestError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}

/// Read fruit measurements from JSON bytes.
pub fn read_json_from_bytes(data: &[u8]) -> Result<Vec<MeasurementRecord>, HarvestError> {
    let content = std::str::from_utf8(data)
        .map_err(|e| HarvestError::ParseError(format!("Invalid UTF-8: {e}")))?;
    Ok(serde_json::from_str(content)?)
}

/// Write any serializable result to a JSON file.
pub fn write_json<T: Serialize + ?Sized>(
    value: &T,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), HarvestError> {
    let content = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    std::fs::write(path.as_ref(), content)?;
    Ok(())
}
