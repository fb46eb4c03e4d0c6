//! The serializable figure returned by chart resolution.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A figure document: a list of traces plus a layout object.
///
/// The shape follows the Plotly figure JSON schema so a browser client can
/// hand it to `Plotly.newPlot` unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    pub data: Vec<Value>,
    pub layout: Value,
}

impl ChartDocument {
    pub fn new(data: Vec<Value>, layout: Value) -> Self {
        Self { data, layout }
    }

    pub fn trace_count(&self) -> usize {
        self.data.len()
    }

    /// The layout title text, if set.
    pub fn title(&self) -> Option<&str> {
        self.layout.pointer("/title/text").and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
