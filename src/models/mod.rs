mod measurement;
mod request;

pub use measurement::{average_diameter, MeasurementRecord};
pub use request::{
    parse_date, DiameterWindow, ProjectionParams, ProjectionRequest, DATE_FORMAT,
    DEFAULT_NUM_BINS, MAX_NUM_BINS,
};
