//! Chart suggestion system that turns a table profile into chart candidates.
//!
//! This module implements a rule-based system that examines the column
//! profiles of a table and proposes charts worth looking at. Every rule sees
//! the same partition of columns (numeric, datetime, low-cardinality
//! categorical) and emits one suggestion per qualifying combination.
//!
//! ## Architecture
//!
//! The suggestion system consists of:
//! - `ChartSuggestionRule` trait for implementing specific rule logic
//! - `ChartSuggestion` struct representing a recommendation
//! - Individual rule implementations, one per chart kind
//! - `SuggestionEngine` for orchestrating rule evaluation in a fixed order
//!
//! High-cardinality categorical columns never take part in any rule.
//!
//! ## Example Usage
//!
//! ```rust
//! use chart_scout::analyzers::{ColumnProfiler, SuggestionEngine};
//! use chart_scout::sources::{CsvOptions, CsvSource};
//!
//! let table = CsvSource::parse(b"kind,price\nA,1.5\nB,2.0\n", &CsvOptions::default()).unwrap();
//! let profile = ColumnProfiler::new().profile_table(&table);
//! let suggestions = SuggestionEngine::standard().suggest(&profile);
//!
//! for suggestion in &suggestions {
//!     println!("{} ({})", suggestion.title, suggestion.chart_type);
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::analyzers::profiler::TableProfile;
use crate::charts::{Aggregation, ChartSpec, ChartType};
use crate::error::Result;

/// A suggested chart. Column names are not validated at suggestion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSuggestion {
    /// Human-readable title embedding the column names
    pub title: String,
    pub chart_type: ChartType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
}

impl ChartSuggestion {
    fn new(title: String, chart_type: ChartType) -> Self {
        Self {
            title,
            chart_type,
            x: None,
            y: None,
            names: None,
            aggregation: None,
        }
    }

    fn x(mut self, column: &str) -> Self {
        self.x = Some(column.to_string());
        self
    }

    fn y(mut self, column: &str) -> Self {
        self.y = Some(column.to_string());
        self
    }

    fn names(mut self, column: &str) -> Self {
        self.names = Some(column.to_string());
        self
    }

    fn aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    /// Converts the suggestion into a chart spec that can be resolved.
    pub fn to_spec(&self) -> Result<ChartSpec> {
        ChartSpec::from_json_value(serde_json::to_value(self)?)
    }
}

/// Columns of a table grouped the way the rules consume them, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPartitions<'a> {
    pub numeric: Vec<&'a str>,
    pub datetime: Vec<&'a str>,
    pub low_cardinality: Vec<&'a str>,
}

impl<'a> ColumnPartitions<'a> {
    pub fn from_profile(profile: &'a TableProfile) -> Self {
        let mut partitions = Self::default();
        for column in profile {
            let name = column.column_name.as_str();
            if column.is_numeric() {
                partitions.numeric.push(name);
            } else if column.is_datetime() {
                partitions.datetime.push(name);
            } else if column.is_low_cardinality_categorical() {
                partitions.low_cardinality.push(name);
            }
        }
        partitions
    }
}

/// Trait for implementing chart suggestion rules
pub trait ChartSuggestionRule: Send + Sync {
    /// Apply this rule to the partitioned columns and return suggested charts
    fn apply(&self, columns: &ColumnPartitions<'_>) -> Vec<ChartSuggestion>;

    /// Get a human-readable name for this rule
    fn name(&self) -> &str;

    /// Get a description of what this rule looks for
    fn description(&self) -> &str;
}

/// Engine that runs suggestion rules in registration order
pub struct SuggestionEngine {
    rules: Vec<Box<dyn ChartSuggestionRule>>,
}

impl SuggestionEngine {
    /// Create an engine without any rules
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine with the standard seven rules in their fixed order:
    /// line, bar, scatter, histogram, box, pie, heatmap.
    pub fn standard() -> Self {
        Self::new()
            .add_rule(Box::new(TrendRule))
            .add_rule(Box::new(CategoryAverageRule))
            .add_rule(Box::new(NumericPairRule))
            .add_rule(Box::new(DistributionRule))
            .add_rule(Box::new(CategoryDistributionRule))
            .add_rule(Box::new(ProportionRule))
            .add_rule(Box::new(CorrelationHeatmapRule))
    }

    /// Add a suggestion rule to the engine
    pub fn add_rule(mut self, rule: Box<dyn ChartSuggestionRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Generate chart suggestions for a table profile
    #[instrument(skip(self, profile), fields(columns = profile.len()))]
    pub fn suggest(&self, profile: &TableProfile) -> Vec<ChartSuggestion> {
        let columns = ColumnPartitions::from_profile(profile);
        debug!(
            numeric = columns.numeric.len(),
            datetime = columns.datetime.len(),
            low_cardinality = columns.low_cardinality.len(),
            rules_count = self.rules.len(),
            "Generating chart suggestions"
        );

        let mut all_suggestions = Vec::new();
        for rule in &self.rules {
            let rule_suggestions = rule.apply(&columns);
            debug!(
                rule = rule.name(),
                suggestions_count = rule_suggestions.len(),
                "Applied suggestion rule"
            );
            all_suggestions.extend(rule_suggestions);
        }

        all_suggestions
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Line chart for every (datetime, numeric) pair
pub struct TrendRule;

impl ChartSuggestionRule for TrendRule {
    fn apply(&self, columns: &ColumnPartitions<'_>) -> Vec<ChartSuggestion> {
        columns
            .datetime
            .iter()
            .flat_map(|date| {
                columns.numeric.iter().map(move |num| {
                    ChartSuggestion::new(format!("Trend of {num} over {date}"), ChartType::Line)
                        .x(date)
                        .y(num)
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        "TrendRule"
    }

    fn description(&self) -> &str {
        "Plots every numeric column over every datetime column"
    }
}

/// Bar chart of the mean of every numeric column per low-cardinality category
pub struct CategoryAverageRule;

impl ChartSuggestionRule for CategoryAverageRule {
    fn apply(&self, columns: &ColumnPartitions<'_>) -> Vec<ChartSuggestion> {
        columns
            .low_cardinality
            .iter()
            .flat_map(|cat| {
                columns.numeric.iter().map(move |num| {
                    ChartSuggestion::new(format!("Average {num} by {cat}"), ChartType::Bar)
                        .x(cat)
                        .y(num)
                        .aggregation(Aggregation::Mean)
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        "CategoryAverageRule"
    }

    fn description(&self) -> &str {
        "Compares numeric averages across low-cardinality categories"
    }
}

/// Scatter chart for every unordered pair of distinct numeric columns
pub struct NumericPairRule;

impl ChartSuggestionRule for NumericPairRule {
    fn apply(&self, columns: &ColumnPartitions<'_>) -> Vec<ChartSuggestion> {
        let numeric = &columns.numeric;
        let mut suggestions = Vec::new();
        for (i, a) in numeric.iter().enumerate() {
            for b in &numeric[i + 1..] {
                suggestions.push(
                    ChartSuggestion::new(
                        format!("Correlation between {a} and {b}"),
                        ChartType::Scatter,
                    )
                    .x(a)
                    .y(b),
                );
            }
        }
        suggestions
    }

    fn name(&self) -> &str {
        "NumericPairRule"
    }

    fn description(&self) -> &str {
        "Relates each pair of numeric columns once"
    }
}

/// Histogram for every numeric column
pub struct DistributionRule;

impl ChartSuggestionRule for DistributionRule {
    fn apply(&self, columns: &ColumnPartitions<'_>) -> Vec<ChartSuggestion> {
        columns
            .numeric
            .iter()
            .map(|num| {
                ChartSuggestion::new(format!("Distribution of {num}"), ChartType::Histogram).x(num)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "DistributionRule"
    }

    fn description(&self) -> &str {
        "Shows the distribution of each numeric column"
    }
}

/// Box plot of every numeric column per low-cardinality category
pub struct CategoryDistributionRule;

impl ChartSuggestionRule for CategoryDistributionRule {
    fn apply(&self, columns: &ColumnPartitions<'_>) -> Vec<ChartSuggestion> {
        columns
            .low_cardinality
            .iter()
            .flat_map(|cat| {
                columns.numeric.iter().map(move |num| {
                    ChartSuggestion::new(format!("Distribution of {num} by {cat}"), ChartType::Box)
                        .x(cat)
                        .y(num)
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        "CategoryDistributionRule"
    }

    fn description(&self) -> &str {
        "Compares numeric spread across low-cardinality categories"
    }
}

/// Pie chart for every low-cardinality categorical column
pub struct ProportionRule;

impl ChartSuggestionRule for ProportionRule {
    fn apply(&self, columns: &ColumnPartitions<'_>) -> Vec<ChartSuggestion> {
        columns
            .low_cardinality
            .iter()
            .map(|cat| {
                ChartSuggestion::new(format!("Proportions of {cat}"), ChartType::Pie).names(cat)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "ProportionRule"
    }

    fn description(&self) -> &str {
        "Shows category shares of low-cardinality columns"
    }
}

/// One correlation heatmap once at least two numeric columns exist
pub struct CorrelationHeatmapRule;

impl ChartSuggestionRule for CorrelationHeatmapRule {
    fn apply(&self, columns: &ColumnPartitions<'_>) -> Vec<ChartSuggestion> {
        if columns.numeric.len() < 2 {
            return Vec::new();
        }
        vec![ChartSuggestion::new(
            "Numeric Correlation Heatmap".to_string(),
            ChartType::Heatmap,
        )]
    }

    fn name(&self) -> &str {
        "CorrelationHeatmapRule"
    }

    fn description(&self) -> &str {
        "Correlates all numeric columns in one matrix"
    }
}
