//! Rendering of resolved charts into figure documents.
//!
//! [`ChartRenderer`] has one constructor per chart kind. Bar charts receive
//! data that is already grouped and aggregated; heatmaps receive a finished
//! correlation matrix. [`PlotlyRenderer`] is the shipped implementation and
//! emits Plotly figure JSON.

use std::collections::HashMap;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type, UInt64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};

use super::document::ChartDocument;
use crate::analyzers::correlation::CorrelationMatrix;
use crate::error::Result;
use crate::table::Table;

/// Title used when a chart spec does not name one.
pub const DEFAULT_TITLE: &str = "Generated Chart";

/// Configuration for figure styling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Layout template name
    pub template: String,
    /// Colorscale for heatmaps; a `_r` suffix reverses the scale
    pub heatmap_colorscale: String,
    pub default_title: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template: "plotly_dark".to_string(),
            heatmap_colorscale: "RdBu_r".to_string(),
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Builds chart documents from table columns.
///
/// Column arguments are names that the caller has already checked against
/// `table`.
pub trait ChartRenderer: Send + Sync {
    fn line(
        &self,
        table: &Table,
        x: &str,
        y: &str,
        color: Option<&str>,
        title: &str,
    ) -> Result<ChartDocument>;

    fn scatter(
        &self,
        table: &Table,
        x: &str,
        y: &str,
        color: Option<&str>,
        title: &str,
    ) -> Result<ChartDocument>;

    fn histogram(
        &self,
        table: &Table,
        x: &str,
        color: Option<&str>,
        title: &str,
    ) -> Result<ChartDocument>;

    fn box_plot(
        &self,
        table: &Table,
        x: &str,
        y: &str,
        color: Option<&str>,
        title: &str,
    ) -> Result<ChartDocument>;

    /// Pie of occurrence counts per distinct value of `names`.
    fn pie(&self, table: &Table, names: &str, title: &str) -> Result<ChartDocument>;

    /// Bar chart over pre-grouped rows.
    fn bar(
        &self,
        grouped: &Table,
        x: &str,
        y: &str,
        color: Option<&str>,
        title: &str,
    ) -> Result<ChartDocument>;

    fn heatmap(&self, matrix: &CorrelationMatrix, title: &str) -> Result<ChartDocument>;
}

/// Renders Plotly figure JSON.
#[derive(Debug, Clone, Default)]
pub struct PlotlyRenderer {
    config: RenderConfig,
}

impl PlotlyRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn layout(
        &self,
        title: &str,
        x_title: Option<&str>,
        y_title: Option<&str>,
        legend_title: Option<&str>,
    ) -> Value {
        let mut layout = Map::new();
        layout.insert("title".to_string(), json!({ "text": title }));
        layout.insert("template".to_string(), json!(self.config.template));
        if let Some(x) = x_title {
            layout.insert("xaxis".to_string(), json!({ "title": { "text": x } }));
        }
        if let Some(y) = y_title {
            layout.insert("yaxis".to_string(), json!({ "title": { "text": y } }));
        }
        if let Some(legend) = legend_title {
            layout.insert("legend".to_string(), json!({ "title": { "text": legend } }));
        }
        Value::Object(layout)
    }

    fn xy_chart(
        &self,
        table: &Table,
        base: Map<String, Value>,
        axes: &[(&str, &str)],
        color: Option<&str>,
        title: &str,
        y_title: Option<&str>,
    ) -> Result<ChartDocument> {
        let data = traces(table, base, axes, color)?;
        let x_title = axes.first().map(|(_, column)| *column);
        Ok(ChartDocument::new(
            data,
            self.layout(title, x_title, y_title, color),
        ))
    }
}

impl ChartRenderer for PlotlyRenderer {
    fn line(
        &self,
        table: &Table,
        x: &str,
        y: &str,
        color: Option<&str>,
        title: &str,
    ) -> Result<ChartDocument> {
        let base = trace_base("scatter", Some("lines"));
        self.xy_chart(table, base, &[("x", x), ("y", y)], color, title, Some(y))
    }

    fn scatter(
        &self,
        table: &Table,
        x: &str,
        y: &str,
        color: Option<&str>,
        title: &str,
    ) -> Result<ChartDocument> {
        let base = trace_base("scatter", Some("markers"));
        self.xy_chart(table, base, &[("x", x), ("y", y)], color, title, Some(y))
    }

    fn histogram(
        &self,
        table: &Table,
        x: &str,
        color: Option<&str>,
        title: &str,
    ) -> Result<ChartDocument> {
        let base = trace_base("histogram", None);
        self.xy_chart(table, base, &[("x", x)], color, title, Some("count"))
    }

    fn box_plot(
        &self,
        table: &Table,
        x: &str,
        y: &str,
        color: Option<&str>,
        title: &str,
    ) -> Result<ChartDocument> {
        let base = trace_base("box", None);
        self.xy_chart(table, base, &[("x", x), ("y", y)], color, title, Some(y))
    }

    fn pie(&self, table: &Table, names: &str, title: &str) -> Result<ChartDocument> {
        let array = table.require_column(names)?;
        let values = column_json(array)?;

        let mut labels: Vec<Value> = Vec::new();
        let mut counts: Vec<u64> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (key, value) in group_keys(array)?.into_iter().zip(values) {
            let Some(key) = key else { continue };
            match index.get(&key) {
                Some(&slot) => counts[slot] += 1,
                None => {
                    index.insert(key, labels.len());
                    labels.push(value);
                    counts.push(1);
                }
            }
        }

        let mut trace = trace_base("pie", None);
        trace.insert("labels".to_string(), Value::Array(labels));
        trace.insert("values".to_string(), json!(counts));
        trace.insert("name".to_string(), json!(names));

        Ok(ChartDocument::new(
            vec![Value::Object(trace)],
            self.layout(title, None, None, Some(names)),
        ))
    }

    fn bar(
        &self,
        grouped: &Table,
        x: &str,
        y: &str,
        color: Option<&str>,
        title: &str,
    ) -> Result<ChartDocument> {
        let base = trace_base("bar", None);
        self.xy_chart(grouped, base, &[("x", x), ("y", y)], color, title, Some(y))
    }

    fn heatmap(&self, matrix: &CorrelationMatrix, title: &str) -> Result<ChartDocument> {
        let z: Vec<Value> = matrix
            .values()
            .iter()
            .map(|row| Value::Array(row.iter().map(|v| float_json(*v)).collect()))
            .collect();
        let text: Vec<Value> = matrix
            .values()
            .iter()
            .map(|row| {
                Value::Array(
                    row.iter()
                        .map(|v| v.map_or(Value::Null, |v| json!(format!("{v:.2}"))))
                        .collect(),
                )
            })
            .collect();

        let (colorscale, reversed) = match self.config.heatmap_colorscale.strip_suffix("_r") {
            Some(name) => (name, true),
            None => (self.config.heatmap_colorscale.as_str(), false),
        };

        let mut trace = trace_base("heatmap", None);
        trace.insert("z".to_string(), Value::Array(z));
        trace.insert("x".to_string(), json!(matrix.columns()));
        trace.insert("y".to_string(), json!(matrix.columns()));
        trace.insert("text".to_string(), Value::Array(text));
        trace.insert("texttemplate".to_string(), json!("%{text}"));
        trace.insert("colorscale".to_string(), json!(colorscale));
        trace.insert("reversescale".to_string(), json!(reversed));
        trace.insert("zmin".to_string(), json!(-1.0));
        trace.insert("zmax".to_string(), json!(1.0));

        Ok(ChartDocument::new(
            vec![Value::Object(trace)],
            self.layout(title, None, None, None),
        ))
    }
}

fn trace_base(kind: &str, mode: Option<&str>) -> Map<String, Value> {
    let mut trace = Map::new();
    trace.insert("type".to_string(), json!(kind));
    if let Some(mode) = mode {
        trace.insert("mode".to_string(), json!(mode));
    }
    trace
}

/// One trace per distinct `color` value (first appearance order), or a
/// single trace without it. Rows with a missing color are left out.
fn traces(
    table: &Table,
    base: Map<String, Value>,
    axes: &[(&str, &str)],
    color: Option<&str>,
) -> Result<Vec<Value>> {
    let columns = axes
        .iter()
        .map(|(key, column)| -> Result<(&str, Vec<Value>)> {
            Ok((*key, column_json(table.require_column(column)?)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let groups = match color {
        Some(color) => color_groups(table.require_column(color)?)?,
        None => vec![(None, (0..table.num_rows()).collect())],
    };

    Ok(groups
        .into_iter()
        .map(|(label, rows)| {
            let mut trace = base.clone();
            for (key, values) in &columns {
                let selected = rows.iter().map(|&row| values[row].clone()).collect();
                trace.insert(key.to_string(), Value::Array(selected));
            }
            if let Some(label) = label {
                trace.insert("name".to_string(), json!(label));
                trace.insert("legendgroup".to_string(), json!(label));
                trace.insert("showlegend".to_string(), json!(true));
            }
            Value::Object(trace)
        })
        .collect())
}

fn color_groups(array: &ArrayRef) -> Result<Vec<(Option<String>, Vec<usize>)>> {
    let mut groups: Vec<(Option<String>, Vec<usize>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (row, key) in group_keys(array)?.into_iter().enumerate() {
        let Some(key) = key else { continue };
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(row),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((Some(key), vec![row]));
            }
        }
    }
    Ok(groups)
}

/// Display strings per row, `None` where the value is missing.
fn group_keys(array: &ArrayRef) -> Result<Vec<Option<String>>> {
    let missing = crate::table::missing_mask(array.as_ref());
    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(array.as_ref(), &options)?;
    Ok(missing
        .iter()
        .enumerate()
        .map(|(row, is_missing)| (!is_missing).then(|| formatter.value(row).to_string()))
        .collect())
}

fn float_json(value: Option<f64>) -> Value {
    value
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

/// Converts a column to JSON values: integers stay integers, floats become
/// numbers (NaN as null), booleans stay booleans, everything else is its
/// display string.
pub fn column_json(array: &ArrayRef) -> Result<Vec<Value>> {
    let data_type = array.data_type();
    let values = match data_type {
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let ints = cast(array.as_ref(), &DataType::Int64)?;
            let ints = ints.as_primitive::<Int64Type>();
            ints.iter().map(|v| v.map_or(Value::Null, Value::from)).collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let ints = cast(array.as_ref(), &DataType::UInt64)?;
            let ints = ints.as_primitive::<UInt64Type>();
            ints.iter().map(|v| v.map_or(Value::Null, Value::from)).collect()
        }
        DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => {
            let floats = cast(array.as_ref(), &DataType::Float64)?;
            let floats = floats.as_primitive::<Float64Type>();
            floats.iter().map(float_json).collect()
        }
        DataType::Boolean => array
            .as_boolean()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect(),
        DataType::Null => vec![Value::Null; array.len()],
        _ => {
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(array.as_ref(), &options)?;
            (0..array.len())
                .map(|row| {
                    if array.is_null(row) {
                        Value::Null
                    } else {
                        Value::String(formatter.value(row).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(values)
}
