use thiserror::Error;

#[derive(Error, Debug)]
pub enum DsnapError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("No content fetched from {0}")]
    FetchEmptyError(String),

    #[error("Page structure changed: {0}")]
    StructureError(String),

    #[error("Update timestamp unresolved: {0}")]
    TimestampError(String),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("CSV encoding error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Pattern error: {0}")]
    PatternError(String),

    #[error("Data error: {0}")]
    DataError(String),
}

pub type Result<T> = std::result::Result<T, DsnapError>;

// Escape hatch for ad-hoc error strings
impl From<String> for DsnapError {
    fn from(s: String) -> Self {
        DsnapError::DataError(s)
    }
}

impl From<&str> for DsnapError {
    fn from(s: &str) -> Self {
        DsnapError::DataError(s.to_string())
    }
}
