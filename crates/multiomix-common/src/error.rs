use thiserror::Error;

#[derive(Debug, Error)]
pub enum MultiomixError {
    /// A required column is missing from an input table.
    #[error("Schema error: table '{table}' is missing required column '{column}'")]
    Schema { table: String, column: String },

    /// One enrichment library failed; the other libraries are unaffected.
    #[error("Enrichment service error for library '{library}': {reason}")]
    EnrichmentService { library: String, reason: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Security error: {0}")]
    Security(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MultiomixError {
    pub fn schema(table: impl Into<String>, column: impl Into<String>) -> Self {
        MultiomixError::Schema { table: table.into(), column: column.into() }
    }

    pub fn enrichment(library: impl Into<String>, reason: impl Into<String>) -> Self {
        MultiomixError::EnrichmentService { library: library.into(), reason: reason.into() }
    }

    /// True when the error only affects one table (the rest of the run continues).
    pub fn is_schema(&self) -> bool {
        matches!(self, MultiomixError::Schema { .. })
    }
}

pub type Result<T> = std::result::Result<T, MultiomixError>;
