//! Resolution of chart specs against a live table.
//!
//! The resolver checks every column a spec names, then dispatches to the
//! renderer. Bar charts are grouped and aggregated first through a DataFusion
//! query over an in-memory copy of the referenced columns; heatmaps correlate
//! every numeric column. The table itself is never modified.

use std::sync::Arc;

use arrow::array::{ArrayRef, UInt64Array};
use arrow::compute::concat_batches;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use tracing::{debug, info, instrument, warn};

use super::document::ChartDocument;
use super::render::{ChartRenderer, PlotlyRenderer, RenderConfig};
use super::spec::{Aggregation, BarRoles, ChartSpec};
use crate::analyzers::correlation::CorrelationMatrix;
use crate::error::{Result, ScoutError};
use crate::security::SqlSecurity;
use crate::table::Table;

/// Name the bar-chart snapshot is registered under.
const CHART_TABLE: &str = "chart_data";
/// Original row position, used to order first/last aggregations.
const ROW_ID_COLUMN: &str = "__chart_scout_row";

/// Turns chart specs into documents through a [`ChartRenderer`].
#[derive(Clone)]
pub struct ChartResolver {
    renderer: Arc<dyn ChartRenderer>,
    default_title: String,
}

impl ChartResolver {
    pub fn new(renderer: Arc<dyn ChartRenderer>) -> Self {
        Self {
            renderer,
            default_title: RenderConfig::default().default_title,
        }
    }

    /// Resolver backed by a [`PlotlyRenderer`] with the given styling.
    pub fn plotly(config: RenderConfig) -> Self {
        let default_title = config.default_title.clone();
        Self {
            renderer: Arc::new(PlotlyRenderer::new(config)),
            default_title,
        }
    }

    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Builds the document for `spec` from `table`.
    ///
    /// Fails with [`ScoutError::ColumnNotFound`] for the first referenced
    /// column (in role order x, y, names, color) missing from the table, and
    /// with [`ScoutError::ResolutionFailure`] for anything else that goes
    /// wrong while building the chart.
    #[instrument(skip_all, fields(chart_type = %spec.chart_type(), rows = table.num_rows()))]
    pub async fn resolve(&self, spec: &ChartSpec, table: &Table) -> Result<ChartDocument> {
        for (role, column) in spec.referenced_columns() {
            if !table.has_column(column) {
                warn!(role = role.as_str(), column, "Chart references unknown column");
                return Err(ScoutError::column_not_found(column));
            }
        }

        let title = spec.title().unwrap_or(&self.default_title);
        let renderer = self.renderer.as_ref();

        let document = match spec {
            ChartSpec::Line(r) => renderer.line(table, &r.x, &r.y, r.color.as_deref(), title),
            ChartSpec::Scatter(r) => renderer.scatter(table, &r.x, &r.y, r.color.as_deref(), title),
            ChartSpec::Histogram(r) => renderer.histogram(table, &r.x, r.color.as_deref(), title),
            ChartSpec::BoxPlot(r) => renderer.box_plot(table, &r.x, &r.y, r.color.as_deref(), title),
            ChartSpec::Pie(r) => renderer.pie(table, &r.names, title),
            ChartSpec::Bar(r) => match aggregate_bar(table, r).await {
                Ok(grouped) => renderer.bar(&grouped, &r.x, &r.y, r.color.as_deref(), title),
                Err(e) => Err(e),
            },
            ChartSpec::Heatmap(_) => CorrelationMatrix::from_table(table)
                .and_then(|matrix| renderer.heatmap(&matrix, title)),
        }
        .map_err(ScoutError::into_resolution_failure)?;

        info!(traces = document.trace_count(), "Resolved chart");
        Ok(document)
    }
}

impl Default for ChartResolver {
    fn default() -> Self {
        Self::plotly(RenderConfig::default())
    }
}

impl std::fmt::Debug for ChartResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartResolver")
            .field("default_title", &self.default_title)
            .finish_non_exhaustive()
    }
}

/// Groups `table` by x (and color) and aggregates y.
///
/// Rows with a missing grouping key are dropped and groups come back sorted
/// by key. The result has columns `x`, optionally `color`, and `y` holding
/// the aggregate.
pub async fn aggregate_bar(table: &Table, roles: &BarRoles) -> Result<Table> {
    let mut wanted: Vec<&str> = Vec::with_capacity(3);
    for name in [Some(roles.x.as_str()), Some(roles.y.as_str()), roles.color.as_deref()]
        .into_iter()
        .flatten()
    {
        if !wanted.contains(&name) {
            wanted.push(name);
        }
    }

    let mut fields = Vec::with_capacity(wanted.len() + 1);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(wanted.len() + 1);
    let schema = table.schema();
    for name in wanted {
        let index = table
            .column_index(name)
            .ok_or_else(|| ScoutError::column_not_found(name))?;
        fields.push(schema.field(index).clone());
        arrays.push(table.column(index).clone());
    }
    fields.push(Field::new(ROW_ID_COLUMN, DataType::UInt64, false));
    arrays.push(Arc::new(UInt64Array::from_iter_values(
        0..table.num_rows() as u64,
    )));

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let ctx = SessionContext::new();
    let provider = MemTable::try_new(schema, vec![vec![batch]])?;
    ctx.register_table(CHART_TABLE, Arc::new(provider))?;

    let sql = bar_query(roles)?;
    debug!(sql = %sql, "Running bar aggregation");

    let df = ctx.sql(&sql).await?;
    let planned_schema = df.schema().inner().clone();
    let batches = df.collect().await?;
    let result_schema = batches
        .first()
        .map(|b| b.schema())
        .unwrap_or(planned_schema);
    let grouped = concat_batches(&result_schema, &batches)?;

    debug!(groups = grouped.num_rows(), "Aggregated bar chart data");
    Table::try_new(grouped)
}

/// SQL for a bar aggregation over the registered snapshot.
pub fn bar_query(roles: &BarRoles) -> Result<String> {
    let x = SqlSecurity::escape_identifier(&roles.x)?;
    let y = SqlSecurity::escape_identifier(&roles.y)?;
    let color = roles
        .color
        .as_deref()
        .map(SqlSecurity::escape_identifier)
        .transpose()?;
    let row_id = SqlSecurity::escape_identifier(ROW_ID_COLUMN)?;

    let keys = match &color {
        Some(color) => format!("{x}, {color}"),
        None => x.clone(),
    };
    let mut filter = format!("{x} IS NOT NULL");
    if let Some(color) = &color {
        filter.push_str(&format!(" AND {color} IS NOT NULL"));
    }

    let aggregate = aggregate_expr(roles.aggregation(), &y, &row_id);
    Ok(format!(
        "SELECT {keys}, {aggregate} AS {y} FROM {CHART_TABLE} WHERE {filter} GROUP BY {keys} ORDER BY {keys}"
    ))
}

fn aggregate_expr(aggregation: Aggregation, y: &str, row_id: &str) -> String {
    match aggregation {
        Aggregation::Sum => format!("SUM({y})"),
        Aggregation::Mean => format!("AVG({y})"),
        Aggregation::Median => format!("MEDIAN({y})"),
        Aggregation::Min => format!("MIN({y})"),
        Aggregation::Max => format!("MAX({y})"),
        Aggregation::Count => format!("COUNT({y})"),
        Aggregation::Nunique => format!("COUNT(DISTINCT {y})"),
        Aggregation::Std => format!("STDDEV({y})"),
        Aggregation::Var => format!("VAR_SAMP({y})"),
        Aggregation::First => {
            format!("FIRST_VALUE({y} ORDER BY {row_id}) FILTER (WHERE {y} IS NOT NULL)")
        }
        Aggregation::Last => {
            format!("LAST_VALUE({y} ORDER BY {row_id}) FILTER (WHERE {y} IS NOT NULL)")
        }
    }
}
