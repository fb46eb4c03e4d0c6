//! Error types for the chart-scout library.
//!
//! All fallible operations return [`ScoutError`] through the crate-wide
//! [`Result`] alias. The classifier, the date normalizer and the suggestion
//! engine are total and never produce an error; the variants below come from
//! ingestion, the table store and chart resolution.

use thiserror::Error;

/// The main error type for chart-scout.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// The uploaded file does not carry a `.csv` extension.
    #[error("Invalid file type '{filename}'. Please upload a CSV.")]
    InvalidFileType { filename: String },

    /// The upload could not be parsed into a table.
    #[error("Error processing file: {message}")]
    UnparseableUpload {
        /// Human-readable cause
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An operation needed a loaded table but none is present.
    #[error("No data available. Please upload a CSV first.")]
    NoData,

    /// Unknown chart type, missing required role or unknown aggregation.
    #[error("Invalid chart configuration: {0}")]
    InvalidChartConfig(String),

    /// A chart role references a column that is not in the live table.
    #[error("Chart generation failed. Column not found: '{column}'")]
    ColumnNotFound { column: String },

    /// Any other failure while building a chart document.
    #[error("Failed to generate chart: {message}")]
    ResolutionFailure {
        /// Human-readable cause
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// A type alias for `Result<T, ScoutError>`.
pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    /// Creates an unparseable-upload error from a message.
    pub fn unparseable(message: impl Into<String>) -> Self {
        Self::UnparseableUpload {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unparseable-upload error carrying its cause.
    pub fn unparseable_with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::UnparseableUpload {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates an invalid chart configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidChartConfig(message.into())
    }

    /// Creates a column-not-found error for the given column name.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates a resolution failure from a message.
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::ResolutionFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any error raised while building a chart into a resolution failure.
    ///
    /// Errors that already carry a resolution-level meaning are passed through.
    pub fn into_resolution_failure(self) -> Self {
        match self {
            err @ (Self::InvalidChartConfig(_)
            | Self::ColumnNotFound { .. }
            | Self::ResolutionFailure { .. }
            | Self::NoData) => err,
            other => Self::ResolutionFailure {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }

    /// HTTP status code a thin web layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidFileType { .. }
            | Self::InvalidChartConfig(_)
            | Self::ColumnNotFound { .. } => 400,
            Self::NoData => 404,
            _ => 500,
        }
    }

    /// Whether the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

/// Converts serde_json errors to ScoutError.
impl From<serde_json::Error> for ScoutError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
