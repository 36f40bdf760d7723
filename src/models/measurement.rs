use serde::{Deserialize, Serialize};

/// A single fruit measurement taken at scan time.
///
/// Records come from an external store and are read-only to the engine. A
/// record whose diameter is missing, non-positive, or not finite is
/// unmeasurable and gets excluded from projection rather than failing the
/// whole request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Identifier assigned by the measurement store
    #[serde(default)]
    pub fruit_id: Option<u64>,
    /// Latitude of the scanned fruit
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude of the scanned fruit
    #[serde(default)]
    pub long: Option<f64>,
    /// Average diameter in millimetres at scan time
    pub diameter_mm: Option<f64>,
}

impl MeasurementRecord {
    /// Create a bare record with only a diameter.
    pub fn new(diameter_mm: f64) -> Self {
        Self {
            fruit_id: None,
            lat: None,
            long: None,
            diameter_mm: Some(diameter_mm),
        }
    }

    /// Attach a store identifier.
    pub fn with_id(mut self, fruit_id: u64) -> Self {
        self.fruit_id = Some(fruit_id);
        self
    }

    /// Attach a location.
    pub fn with_location(mut self, lat: f64, long: f64) -> Self {
        self.lat = Some(lat);
        self.long = Some(long);
        self
    }

    /// Build a record from the three measured axes. The diameter is their mean.
    pub fn from_axes(major_mm: f64, minor_mm: f64, subminor_mm: f64) -> Self {
        Self::new(average_diameter(major_mm, minor_mm, subminor_mm))
    }

    /// The diameter, if the record is measurable.
    pub fn valid_diameter(&self) -> Option<f64> {
        self.diameter_mm.filter(|d| d.is_finite() && *d > 0.0)
    }

    /// Human-readable label for log lines.
    pub fn label(&self) -> String {
        match self.fruit_id {
            Some(id) => format!("fruit {id}"),
            None => "fruit <unnamed>".to_string(),
        }
    }
}

/// Mean of the major, minor and subminor axes.
pub fn average_diameter(major_mm: f64, minor_mm: f64, subminor_mm: f64) -> f64 {
    (major_mm + minor_mm + subminor_mm) / 3.0
}
