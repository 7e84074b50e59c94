use thiserror::Error;

#[derive(Error, Debug)]
pub enum DcasError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unsupported file format: {0}. Please use .csv, .xlsx or .xls")]
    UnsupportedFormat(String),

    #[error("Error parsing spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("No valid records found")]
    NoRecords,

    #[error("Unexpected risk analysis response: {0}")]
    RiskResponse(String),

    #[error("A risk analysis is already running")]
    AnalysisInProgress,

    #[error("{0}")]
    Workflow(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, DcasError>;
