//! Common imports for chart-scout users.

pub use crate::analyzers::{
    ChartSuggestion, ColumnProfile, ColumnProfiler, ColumnType, DateNormalizer, SuggestionEngine,
    TableProfile,
};
pub use crate::charts::{Aggregation, ChartDocument, ChartResolver, ChartSpec, ChartType};
pub use crate::core::{ScoutConfig, TableStore, UploadSummary};
pub use crate::error::{Result, ScoutError};
pub use crate::logging::LogConfig;
pub use crate::sources::{CsvOptions, CsvSource, TableSource};
pub use crate::table::Table;
