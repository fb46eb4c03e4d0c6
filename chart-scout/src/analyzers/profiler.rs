//! Column classification.
//!
//! The [`ColumnProfiler`] inspects each column of a [`Table`] and produces a
//! [`ColumnProfile`]: its semantic type, the share of missing values, the
//! number of distinct non-missing values and a low/high cardinality bucket.
//!
//! Type decision order (first match wins):
//!
//! 1. Arrow date or timestamp type → [`ColumnType::Datetime`]
//! 2. Arrow integer, float or decimal type → [`ColumnType::Numeric`]
//! 3. anything else (text, booleans, all-null) → [`ColumnType::Categorical`]
//!
//! Profiles describe the table as it is *now*. Run the
//! [`DateNormalizer`](super::DateNormalizer) first, otherwise date columns
//! are reported as categorical.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Int64Array, StringArray};
//! use chart_scout::analyzers::{Cardinality, ColumnProfiler, ColumnType};
//! use chart_scout::table::Table;
//!
//! let table = Table::from_columns(vec![
//!     ("region", Arc::new(StringArray::from(vec!["east", "east", "west"])) as ArrayRef),
//!     ("sales", Arc::new(Int64Array::from(vec![10, 20, 30])) as ArrayRef),
//! ])
//! .unwrap();
//!
//! let profile = ColumnProfiler::new().profile_table(&table);
//! let region = profile.get("region").unwrap();
//! assert_eq!(region.column_type, ColumnType::Categorical);
//! assert_eq!(region.cardinality, Cardinality::Low);
//! assert_eq!(profile.get("sales").unwrap().column_type, ColumnType::Numeric);
//! ```

use std::collections::HashSet;

use arrow::array::{Array, ArrayRef};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info, instrument};

use crate::table::{is_numeric_type, is_temporal_type, missing_mask, Table};

/// Columns with at most this many distinct values are low cardinality.
pub const DEFAULT_LOW_CARDINALITY_THRESHOLD: u64 = 15;

/// Configuration for the column profiler
#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    /// Inclusive upper bound on distinct values for a low-cardinality column
    pub low_cardinality_threshold: u64,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            low_cardinality_threshold: DEFAULT_LOW_CARDINALITY_THRESHOLD,
        }
    }
}

/// Semantic type assigned to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Integer, float or decimal values
    Numeric,
    /// Text, booleans and everything not otherwise matched
    Categorical,
    /// Dates and timestamps
    Datetime,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
            ColumnType::Datetime => "datetime",
        }
    }
}

/// Low/high bucket of a column's distinct value count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Low,
    High,
}

/// Classification of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    #[serde(skip)]
    pub column_name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Percentage of missing values, rounded to two decimals
    pub missing_percentage: f64,
    /// Distinct non-missing values
    pub unique_count: u64,
    pub cardinality: Cardinality,
}

impl ColumnProfile {
    pub fn is_numeric(&self) -> bool {
        self.column_type == ColumnType::Numeric
    }

    pub fn is_datetime(&self) -> bool {
        self.column_type == ColumnType::Datetime
    }

    /// Categorical with low cardinality, eligible for grouping roles.
    pub fn is_low_cardinality_categorical(&self) -> bool {
        self.column_type == ColumnType::Categorical && self.cardinality == Cardinality::Low
    }
}

/// Profiles for every column of a table, in table column order.
///
/// Serializes as a JSON object keyed by column name, keeping table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableProfile {
    columns: Vec<ColumnProfile>,
}

impl TableProfile {
    pub fn new(columns: Vec<ColumnProfile>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnProfile] {
        &self.columns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnProfile> {
        self.columns.iter()
    }

    pub fn get(&self, column_name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|p| p.column_name == column_name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|p| p.column_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a TableProfile {
    type Item = &'a ColumnProfile;
    type IntoIter = std::slice::Iter<'a, ColumnProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

impl Serialize for TableProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for profile in &self.columns {
            map.serialize_entry(&profile.column_name, profile)?;
        }
        map.end()
    }
}

/// Builder for ColumnProfiler
pub struct ColumnProfilerBuilder {
    config: ProfilerConfig,
}

impl ColumnProfilerBuilder {
    /// Set the inclusive distinct-count bound for low cardinality
    pub fn low_cardinality_threshold(mut self, threshold: u64) -> Self {
        self.config.low_cardinality_threshold = threshold;
        self
    }

    /// Build the ColumnProfiler
    pub fn build(self) -> ColumnProfiler {
        ColumnProfiler {
            config: self.config,
        }
    }
}

/// Classifies columns into [`ColumnProfile`]s.
#[derive(Debug, Clone, Default)]
pub struct ColumnProfiler {
    config: ProfilerConfig,
}

impl ColumnProfiler {
    /// Create a new builder for ColumnProfiler
    pub fn builder() -> ColumnProfilerBuilder {
        ColumnProfilerBuilder {
            config: ProfilerConfig::default(),
        }
    }

    /// Create a ColumnProfiler with default configuration
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_config(config: ProfilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Profile every column of the table, in table order.
    #[instrument(skip_all, fields(rows = table.num_rows(), columns = table.num_columns()))]
    pub fn profile_table(&self, table: &Table) -> TableProfile {
        let columns: Vec<ColumnProfile> = table
            .columns()
            .map(|(name, array)| self.profile_column(name, array))
            .collect();

        info!(columns = columns.len(), "Completed table profiling");
        TableProfile::new(columns)
    }

    /// Profile a single column.
    pub fn profile_column(&self, column_name: &str, array: &ArrayRef) -> ColumnProfile {
        let total_rows = array.len();
        let missing = missing_mask(array.as_ref());
        let missing_count = missing.iter().filter(|m| **m).count();

        let missing_percentage = if total_rows > 0 {
            round2(missing_count as f64 * 100.0 / total_rows as f64)
        } else {
            0.0
        };

        let unique_count = distinct_count(array, &missing);
        let cardinality = if unique_count <= self.config.low_cardinality_threshold {
            Cardinality::Low
        } else {
            Cardinality::High
        };

        let column_type = classify_type(array);

        debug!(
            column = column_name,
            column_type = column_type.as_str(),
            missing_percentage,
            unique_count,
            "Profiled column"
        );

        ColumnProfile {
            column_name: column_name.to_string(),
            column_type,
            missing_percentage,
            unique_count,
            cardinality,
        }
    }
}

fn classify_type(array: &ArrayRef) -> ColumnType {
    let data_type = array.data_type();
    if is_temporal_type(data_type) {
        ColumnType::Datetime
    } else if is_numeric_type(data_type) {
        ColumnType::Numeric
    } else {
        ColumnType::Categorical
    }
}

/// Counts distinct non-missing values by their formatted representation.
fn distinct_count(array: &ArrayRef, missing: &[bool]) -> u64 {
    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(array.as_ref(), &options).ok();

    let mut seen = HashSet::new();
    for (row, is_missing) in missing.iter().enumerate() {
        if *is_missing {
            continue;
        }
        let value = match &formatter {
            Some(formatter) => formatter.value(row).to_string(),
            None => format!("{:?}", array.slice(row, 1)),
        };
        seen.insert(value);
    }
    seen.len() as u64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
