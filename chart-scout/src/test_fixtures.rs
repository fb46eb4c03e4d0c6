//! Common test fixtures for profiling and chart scenarios.
//!
//! Small, hand-checked tables used across the unit tests. Dates are kept as
//! text so tests can decide whether to run the date normalizer first.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};

use crate::table::Table;

/// The CSV behind [`sales_table`].
pub const SALES_CSV: &str =
    "date,region,sales\n2024-01-01,east,10\n2024-01-02,east,20\n2024-01-03,west,30\n";

/// Three rows: `date` (ISO text), `region` (east, east, west), `sales` (10, 20, 30).
pub fn sales_table() -> Table {
    build(vec![
        (
            "date",
            Arc::new(StringArray::from(vec![
                "2024-01-01",
                "2024-01-02",
                "2024-01-03",
            ])) as ArrayRef,
        ),
        (
            "region",
            Arc::new(StringArray::from(vec!["east", "east", "west"])) as ArrayRef,
        ),
        ("sales", Arc::new(Int64Array::from(vec![10, 20, 30])) as ArrayRef),
    ])
}

/// Mixed-type table with gaps: two numeric columns, a boolean flag, a
/// high-cardinality id and a low-cardinality category.
pub fn mixed_table() -> Table {
    let rows = 20;
    build(vec![
        (
            "id",
            Arc::new(StringArray::from(
                (0..rows).map(|i| format!("id-{i:03}")).collect::<Vec<_>>(),
            )) as ArrayRef,
        ),
        (
            "segment",
            Arc::new(StringArray::from(
                (0..rows)
                    .map(|i| ["retail", "wholesale", "online"][i % 3])
                    .collect::<Vec<_>>(),
            )) as ArrayRef,
        ),
        (
            "price",
            Arc::new(Float64Array::from(
                (0..rows)
                    .map(|i| (i % 7 != 0).then_some(i as f64 * 1.5))
                    .collect::<Vec<_>>(),
            )) as ArrayRef,
        ),
        (
            "quantity",
            Arc::new(Int64Array::from(
                (0..rows).map(|i| (i * 3 % 11) as i64).collect::<Vec<_>>(),
            )) as ArrayRef,
        ),
        (
            "active",
            Arc::new(BooleanArray::from(
                (0..rows).map(|i| i % 2 == 0).collect::<Vec<_>>(),
            )) as ArrayRef,
        ),
    ])
}

fn build(columns: Vec<(&str, ArrayRef)>) -> Table {
    match Table::from_columns(columns) {
        Ok(table) => table,
        Err(e) => panic!("fixture table is invalid: {e}"),
    }
}
