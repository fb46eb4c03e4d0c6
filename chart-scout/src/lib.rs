//! # chart-scout - Column profiling and chart suggestions for tabular data
//!
//! chart-scout loads a CSV into an in-memory Arrow table, works out what each
//! column is, proposes charts worth drawing, and builds figure documents for
//! the charts a client asks for. Bar-chart aggregation runs through DataFusion.
//!
//! ## Quick Start
//!
//! ```rust
//! use chart_scout::prelude::*;
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = TableStore::new();
//!
//! let csv = b"date,region,sales\n2024-01-01,east,10\n2024-01-02,east,20\n2024-01-03,west,30\n";
//! let summary = store.upload("sales.csv", csv.to_vec(), None).await?;
//! assert_eq!(summary.columns.get("date").unwrap().column_type, ColumnType::Datetime);
//!
//! // line, bar, histogram, box, pie
//! let suggestions = store.suggest().await?;
//! assert_eq!(suggestions.len(), 5);
//!
//! let figure = store
//!     .generate_chart_json(json!({"chart_type": "bar", "x": "region", "y": "sales"}))
//!     .await?;
//! assert_eq!(figure.data[0]["y"], json!([30, 30]));
//! # Ok::<(), ScoutError>(())
//! # }).unwrap();
//! ```
//!
//! ## Pipeline
//!
//! 1. [`sources`] parses the upload into a [`table::Table`]; all-missing
//!    columns are dropped.
//! 2. [`analyzers::DateNormalizer`] converts date-like text columns to
//!    timestamps, all or nothing per column.
//! 3. [`analyzers::ColumnProfiler`] classifies each column as numeric,
//!    categorical or datetime, with missing percentage, distinct count and
//!    a low/high cardinality bucket.
//! 4. [`analyzers::SuggestionEngine`] applies a fixed, ordered rule set to the
//!    profile.
//! 5. [`charts::ChartResolver`] validates a [`charts::ChartSpec`] against the
//!    live table and renders it through a [`charts::ChartRenderer`].
//!
//! [`core::TableStore`] ties the steps together around a single live table
//! that each upload replaces.
//!
//! ## Logging
//!
//! Every stage emits `tracing` spans and events. Use
//! [`logging::setup::init_logging`] to install a subscriber, or bring your own.

pub mod analyzers;
pub mod charts;
pub mod core;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod security;
pub mod sources;
pub mod table;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
