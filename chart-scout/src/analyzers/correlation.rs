//! Pairwise Pearson correlation over the numeric columns of a table.
//!
//! Each coefficient uses the rows where both columns have a value
//! (pairwise-complete observations). A coefficient is undefined, and stored
//! as `None`, when fewer than two paired rows exist or either side has zero
//! variance over those rows.

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::table::{is_numeric_type, Table};

/// Square correlation matrix keyed by column name on both axes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlates every numeric column of `table`, in table order.
    #[instrument(skip_all, fields(columns = table.num_columns()))]
    pub fn from_table(table: &Table) -> Result<Self> {
        let mut columns = Vec::new();
        let mut series = Vec::new();
        for (name, array) in table.columns() {
            if is_numeric_type(array.data_type()) {
                columns.push(name.to_string());
                series.push(float_values(array)?);
            }
        }

        let size = columns.len();
        let mut values = vec![vec![None; size]; size];
        for i in 0..size {
            for j in i..size {
                let coefficient = pearson(&series[i], &series[j]);
                values[i][j] = coefficient;
                values[j][i] = coefficient;
            }
        }

        debug!(numeric_columns = size, "Computed correlation matrix");
        Ok(Self { columns, values })
    }

    /// Numeric column names, the labels of both axes.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row-major coefficients.
    pub fn values(&self) -> &[Vec<Option<f64>>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Reads a numeric column as floats; NaN counts as missing.
fn float_values(array: &ArrayRef) -> Result<Vec<Option<f64>>> {
    let floats = cast(array.as_ref(), &DataType::Float64)?;
    let floats = floats.as_primitive::<Float64Type>();
    Ok((0..floats.len())
        .map(|i| {
            if floats.is_null(i) {
                None
            } else {
                Some(floats.value(i)).filter(|v| !v.is_nan())
            }
        })
        .collect())
}

fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sum_xy += dx * dy;
        sum_x2 += dx * dx;
        sum_y2 += dy * dy;
    }

    let denominator = (sum_x2 * sum_y2).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    Some((sum_xy / denominator).clamp(-1.0, 1.0))
}
