use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No data loaded. Call load() first.")]
    NotLoaded,

    #[error("Cannot parse date in column '{column}' at row {row}: {value:?}")]
    DateParse {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Row width mismatch: expected {expected} values, got {actual}")]
    RowWidth { expected: usize, actual: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
