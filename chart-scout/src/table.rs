//! The in-memory table every analysis runs against.
//!
//! [`Table`] wraps a single Arrow [`RecordBatch`] and enforces that column
//! names are unique. Columns keep the order they were loaded in; that order
//! drives profile and suggestion ordering.

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Field, Float32Type, Float64Type, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::error::{Result, ScoutError};

/// An ordered set of uniquely named columns.
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    /// Wraps a record batch, rejecting duplicate column names.
    pub fn try_new(batch: RecordBatch) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in batch.schema_ref().fields() {
            if !seen.insert(field.name().as_str()) {
                return Err(ScoutError::Configuration(format!(
                    "duplicate column name '{}'",
                    field.name()
                )));
            }
        }
        Ok(Self { batch })
    }

    /// Builds a table from `(name, array)` pairs. All arrays must share a length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, ArrayRef)>) -> Result<Self> {
        let row_count = columns.first().map(|(_, array)| array.len()).unwrap_or(0);
        let mut fields = Vec::with_capacity(columns.len());
        let mut arrays = Vec::with_capacity(columns.len());
        for (name, array) in columns {
            fields.push(Field::new(name.into(), array.data_type().clone(), true));
            arrays.push(array);
        }
        let options = RecordBatchOptions::new().with_row_count(Some(row_count));
        let batch =
            RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
        Self::try_new(batch)
    }

    /// A table without columns or rows.
    pub fn empty() -> Self {
        Self {
            batch: RecordBatch::new_empty(Arc::new(Schema::empty())),
        }
    }

    /// The underlying record batch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Iterates `(name, array)` pairs in table order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ArrayRef)> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .zip(self.batch.columns())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.batch.schema_ref().index_of(name).ok()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column(&self, index: usize) -> &ArrayRef {
        self.batch.column(index)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Looks up a column, failing with [`ScoutError::ColumnNotFound`].
    pub fn require_column(&self, name: &str) -> Result<&ArrayRef> {
        self.column_by_name(name)
            .ok_or_else(|| ScoutError::column_not_found(name))
    }

    /// Replaces the column at `index` with `array`, updating its data type.
    pub(crate) fn replace_column(&mut self, index: usize, array: ArrayRef) -> Result<()> {
        let schema = self.batch.schema();
        let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
        let mut arrays = self.batch.columns().to_vec();

        let name = fields[index].name().clone();
        fields[index] = Field::new(name, array.data_type().clone(), true);
        arrays[index] = array;

        let options = RecordBatchOptions::new().with_row_count(Some(self.batch.num_rows()));
        self.batch =
            RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
        Ok(())
    }

    /// Drops every column whose values are all missing.
    ///
    /// A table with zero rows loses all of its columns, matching the
    /// "all values missing" rule vacuously.
    pub fn drop_all_null_columns(self) -> Result<Self> {
        let keep: Vec<usize> = self
            .batch
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, array)| array.logical_null_count() < array.len())
            .map(|(i, _)| i)
            .collect();

        if keep.len() == self.batch.num_columns() {
            return Ok(self);
        }

        Ok(Self {
            batch: self.batch.project(&keep)?,
        })
    }
}

/// Per-row missing flags: nulls, plus NaN for floating point columns.
pub fn missing_mask(array: &dyn Array) -> Vec<bool> {
    let nulls = array.logical_nulls();
    let is_null = |i: usize| nulls.as_ref().is_some_and(|n| n.is_null(i));

    match array.data_type() {
        DataType::Float64 => {
            let values = array.as_primitive::<Float64Type>();
            (0..array.len())
                .map(|i| is_null(i) || values.value(i).is_nan())
                .collect()
        }
        DataType::Float32 => {
            let values = array.as_primitive::<Float32Type>();
            (0..array.len())
                .map(|i| is_null(i) || values.value(i).is_nan())
                .collect()
        }
        _ => (0..array.len()).map(is_null).collect(),
    }
}

/// Whether the Arrow type is treated as temporal by the classifier.
pub fn is_temporal_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _)
    )
}

/// Whether the Arrow type is treated as numeric by the classifier.
pub fn is_numeric_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _)
    )
}

/// Whether the Arrow type holds free text eligible for date normalization.
pub fn is_text_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array, StringArray};

    fn sample_table() -> Table {
        Table::from_columns(vec![
            (
                "id",
                Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef,
            ),
            (
                "empty",
                Arc::new(StringArray::from(vec![None::<&str>, None, None])) as ArrayRef,
            ),
            (
                "score",
                Arc::new(Float64Array::from(vec![Some(1.5), None, Some(2.5)])) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let result = Table::from_columns(vec![
            ("a", Arc::new(Int64Array::from(vec![1])) as ArrayRef),
            ("a", Arc::new(Int64Array::from(vec![2])) as ArrayRef),
        ]);
        assert!(matches!(result, Err(ScoutError::Configuration(_))));
    }

    #[test]
    fn test_column_lookup() {
        let table = sample_table();
        assert_eq!(table.column_names(), vec!["id", "empty", "score"]);
        assert_eq!(table.column_index("score"), Some(2));
        assert!(table.has_column("id"));
        assert!(!table.has_column("missing"));
        assert!(matches!(
            table.require_column("missing"),
            Err(ScoutError::ColumnNotFound { column }) if column == "missing"
        ));
    }

    #[test]
    fn test_drop_all_null_columns() {
        let table = sample_table().drop_all_null_columns().unwrap();
        assert_eq!(table.column_names(), vec!["id", "score"]);
        assert_eq!(table.num_rows(), 3);
    }

    #[test]
    fn test_replace_column_updates_type() {
        let mut table = sample_table();
        let replacement = Arc::new(StringArray::from(vec!["a", "b", "c"])) as ArrayRef;
        table.replace_column(0, replacement).unwrap();
        assert_eq!(table.schema().field(0).name(), "id");
        assert_eq!(table.schema().field(0).data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::empty();
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.num_columns(), 0);
    }

    #[test]
    fn test_missing_mask_counts_nan_and_null_arrays() {
        let floats = Float64Array::from(vec![Some(1.0), Some(f64::NAN), None]);
        assert_eq!(missing_mask(&floats), vec![false, true, true]);

        let nulls = arrow::array::NullArray::new(2);
        assert_eq!(missing_mask(&nulls), vec![true, true]);
    }

    #[test]
    fn test_type_predicates() {
        assert!(is_numeric_type(&DataType::Int64));
        assert!(is_numeric_type(&DataType::Float32));
        assert!(!is_numeric_type(&DataType::Boolean));
        assert!(is_temporal_type(&DataType::Date32));
        assert!(!is_temporal_type(&DataType::Utf8));
        assert!(is_text_type(&DataType::Utf8View));
    }
}
