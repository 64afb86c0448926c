//! Error types for callscope

use thiserror::Error;

use crate::models::MonthKey;

#[derive(Error, Debug)]
pub enum Error {
    /// The table has fewer columns than the requested operation needs
    #[error("Schema error: {operation} requires at least {required} columns, table has {actual}")]
    Schema {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    /// A single value could not be turned into a month or date
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Month not found: {0}")]
    MonthNotFound(MonthKey),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors caused by too few columns
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
