//! Chart specifications.
//!
//! A [`ChartSpec`] is a tagged union keyed by `chart_type`. Each variant
//! carries exactly the roles its chart needs, so a spec that parses is
//! structurally complete; column names are only checked against the live
//! table at resolution time.
//!
//! ```rust
//! use chart_scout::charts::{Aggregation, ChartSpec, ChartType};
//! use serde_json::json;
//!
//! let spec = ChartSpec::from_json_value(json!({
//!     "chart_type": "bar",
//!     "x": "region",
//!     "y": "sales",
//!     "aggregation": "mean"
//! }))
//! .unwrap();
//! assert_eq!(spec.chart_type(), ChartType::Bar);
//!
//! let err = ChartSpec::from_json_value(json!({"chart_type": "line", "x": "day"})).unwrap_err();
//! assert!(err.to_string().starts_with("Invalid chart configuration"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ScoutError};

/// Supported chart kinds, lower-case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Scatter,
    Histogram,
    Box,
    Pie,
    Bar,
    Heatmap,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Scatter => "scatter",
            ChartType::Histogram => "histogram",
            ChartType::Box => "box",
            ChartType::Pie => "pie",
            ChartType::Bar => "bar",
            ChartType::Heatmap => "heatmap",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group-by aggregation applied to the `y` role of a bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
    Median,
    Min,
    Max,
    Count,
    Nunique,
    Std,
    Var,
    First,
    Last,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Median => "median",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Count => "count",
            Aggregation::Nunique => "nunique",
            Aggregation::Std => "std",
            Aggregation::Var => "var",
            Aggregation::First => "first",
            Aggregation::Last => "last",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles for charts plotting `y` against `x` (line, scatter, box).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XyRoles {
    pub x: String,
    pub y: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramRoles {
    pub x: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieRoles {
    pub names: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Roles for a grouped bar chart. A missing aggregation means [`Aggregation::Sum`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarRoles {
    pub x: String,
    pub y: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl BarRoles {
    pub fn aggregation(&self) -> Aggregation {
        self.aggregation.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapRoles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A request to draw one chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "chart_type", rename_all = "lowercase")]
pub enum ChartSpec {
    Line(XyRoles),
    Scatter(XyRoles),
    Histogram(HistogramRoles),
    #[serde(rename = "box")]
    BoxPlot(XyRoles),
    Pie(PieRoles),
    Bar(BarRoles),
    Heatmap(HeatmapRoles),
}

/// Column-bearing role names, in the order columns are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    X,
    Y,
    Names,
    Color,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::X => "x",
            Role::Y => "y",
            Role::Names => "names",
            Role::Color => "color",
        }
    }
}

impl ChartSpec {
    /// Parses a raw JSON request, rejecting unknown chart types, missing
    /// required roles and unknown aggregations.
    pub fn from_json_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ScoutError::invalid_config(e.to_string()))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ScoutError::invalid_config(e.to_string()))
    }

    pub fn chart_type(&self) -> ChartType {
        match self {
            ChartSpec::Line(_) => ChartType::Line,
            ChartSpec::Scatter(_) => ChartType::Scatter,
            ChartSpec::Histogram(_) => ChartType::Histogram,
            ChartSpec::BoxPlot(_) => ChartType::Box,
            ChartSpec::Pie(_) => ChartType::Pie,
            ChartSpec::Bar(_) => ChartType::Bar,
            ChartSpec::Heatmap(_) => ChartType::Heatmap,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            ChartSpec::Line(r) | ChartSpec::Scatter(r) | ChartSpec::BoxPlot(r) => r.title.as_deref(),
            ChartSpec::Histogram(r) => r.title.as_deref(),
            ChartSpec::Pie(r) => r.title.as_deref(),
            ChartSpec::Bar(r) => r.title.as_deref(),
            ChartSpec::Heatmap(r) => r.title.as_deref(),
        }
    }

    /// Columns named by the spec, in role order x, y, names, color.
    pub fn referenced_columns(&self) -> Vec<(Role, &str)> {
        let mut columns = Vec::new();
        match self {
            ChartSpec::Line(r) | ChartSpec::Scatter(r) | ChartSpec::BoxPlot(r) => {
                columns.push((Role::X, r.x.as_str()));
                columns.push((Role::Y, r.y.as_str()));
                columns.extend(r.color.as_deref().map(|c| (Role::Color, c)));
            }
            ChartSpec::Histogram(r) => {
                columns.push((Role::X, r.x.as_str()));
                columns.extend(r.color.as_deref().map(|c| (Role::Color, c)));
            }
            ChartSpec::Pie(r) => columns.push((Role::Names, r.names.as_str())),
            ChartSpec::Bar(r) => {
                columns.push((Role::X, r.x.as_str()));
                columns.push((Role::Y, r.y.as_str()));
                columns.extend(r.color.as_deref().map(|c| (Role::Color, c)));
            }
            ChartSpec::Heatmap(_) => {}
        }
        columns
    }
}
