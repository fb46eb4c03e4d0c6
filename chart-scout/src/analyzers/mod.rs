//! Column analysis: classification, date normalization, suggestions and
//! correlation.
//!
//! ## Available Analyzers
//!
//! - **Column Profiler** (`profiler`): type, missing percentage, distinct count
//!   and cardinality bucket per column
//! - **Date Normalizer** (`temporal`): converts date-like text columns to
//!   timestamps before profiling
//! - **Chart Suggestions** (`suggestions`): fixed rule set proposing charts
//!   from a table profile
//! - **Correlation** (`correlation`): pairwise Pearson matrix over numeric
//!   columns
//!
//! ## Example Usage
//!
//! ```rust
//! use chart_scout::analyzers::{ColumnProfiler, DateNormalizer, SuggestionEngine};
//! use chart_scout::sources::{CsvOptions, CsvSource};
//!
//! let csv = b"date,region,sales\n2024-01-01,east,10\n2024-01-02,east,20\n2024-01-03,west,30\n";
//! let mut table = CsvSource::parse(csv, &CsvOptions::default()).unwrap();
//! DateNormalizer::new().normalize(&mut table, None);
//!
//! let profile = ColumnProfiler::new().profile_table(&table);
//! let suggestions = SuggestionEngine::standard().suggest(&profile);
//! assert_eq!(suggestions.len(), 5);
//! ```

pub mod correlation;
pub mod profiler;
pub mod suggestions;
pub mod temporal;

pub use correlation::CorrelationMatrix;
pub use profiler::{
    Cardinality, ColumnProfile, ColumnProfiler, ColumnProfilerBuilder, ColumnType,
    ProfilerConfig, TableProfile, DEFAULT_LOW_CARDINALITY_THRESHOLD,
};
pub use suggestions::{
    CategoryAverageRule, CategoryDistributionRule, ChartSuggestion, ChartSuggestionRule,
    ColumnPartitions, CorrelationHeatmapRule, DistributionRule, NumericPairRule, ProportionRule,
    SuggestionEngine, TrendRule,
};
pub use temporal::{
    default_formats, ConvertedColumn, DateFormat, DateNormalizer, DateNormalizerBuilder,
    NormalizationReport, NormalizerConfig,
};
