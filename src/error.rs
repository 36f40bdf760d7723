use thiserror::Error;

/// Errors that can occur while estimating harvest volumes.
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    /// A request precondition failed. `field` names the offending parameter.
    #[error("Invalid request ({field}): {message}")]
    InvalidRequest { field: &'static str, message: String },

    /// A single measurement cannot be projected and is excluded.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl HarvestError {
    pub(crate) fn invalid_request(field: &'static str, message: impl Into<String>) -> Self {
        HarvestError::InvalidRequest {
            field,
            message: message.into(),
        }
    }
}

impl From<calamine::Error> for HarvestError {
    fn from(e: calamine::Error) -> Self {
        HarvestError::Excel(e.to_string())
    }
}

impl From<calamine::XlsxError> for HarvestError {
    fn from(e: calamine::XlsxError) -> Self {
        HarvestError::Excel(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for HarvestError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        HarvestError::Excel(e.to_string())
    }
}
