//! Chart specs, their resolution against a table, and rendering.
//!
//! - [`ChartSpec`] describes one requested chart and is validated when parsed
//! - [`ChartResolver`] checks the referenced columns and prepares the data
//! - [`ChartRenderer`] turns prepared data into a [`ChartDocument`]

pub mod document;
pub mod render;
pub mod resolver;
pub mod spec;

pub use document::ChartDocument;
pub use render::{column_json, ChartRenderer, PlotlyRenderer, RenderConfig, DEFAULT_TITLE};
pub use resolver::{aggregate_bar, bar_query, ChartResolver};
pub use spec::{
    Aggregation, BarRoles, ChartSpec, ChartType, HeatmapRoles, HistogramRoles, PieRoles, Role,
    XyRoles,
};
