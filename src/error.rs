use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinancialRatioError {
    /// No JSON object could be recovered from a model response. The original text is kept for
    /// diagnostics but left out of the display message.
    #[error("No valid JSON object could be recovered from the model response ({} chars)", text.len())]
    ParseError { text: String },

    #[error("Invalid statement shape: {0}")]
    InvalidStatementShape(String),

    #[error("No years were provided for ratio calculation")]
    EmptyInput,

    #[cfg(feature = "gemini")]
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[cfg(feature = "gemini")]
    #[error("Every candidate model failed: {}", attempts.join("; "))]
    AllModelsFailed { attempts: Vec<String> },

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FinancialRatioError>;
