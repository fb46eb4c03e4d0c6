//! CSV source implementation.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use arrow::compute::{cast_with_options, concat_batches, CastOptions};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};

use super::TableSource;
use crate::error::{Result, ScoutError};
use crate::table::{is_temporal_type, Table};

/// Cell values read as missing, in addition to the empty string.
static NULL_VALUES: Lazy<Regex> = Lazy::new(|| {
    // This regex is compile-time constant and known to be valid
    #[allow(clippy::expect_used)]
    Regex::new(r"^(|NA|N/A|n/a|NaN|nan|-NaN|-nan|NULL|null|None|#N/A|<NA>)$")
        .expect("Hard-coded regex pattern should be valid")
});

/// Options for configuring CSV reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Records read for schema inference; `None` reads every record
    pub schema_infer_max_records: Option<usize>,
    /// Rows per decoded Arrow batch before concatenation
    pub batch_size: usize,
    /// Remove columns whose values are all missing (default: true)
    pub drop_all_null_columns: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            schema_infer_max_records: None,
            batch_size: 8192,
            drop_all_null_columns: true,
        }
    }
}

#[derive(Debug, Clone)]
enum CsvInput {
    Bytes { filename: String, bytes: Arc<[u8]> },
    Path(PathBuf),
}

/// A CSV data source backed by upload bytes or a file path.
///
/// Temporal types are never inferred here: every text column stays text so
/// that date detection is owned by the
/// [`DateNormalizer`](crate::analyzers::DateNormalizer).
///
/// # Examples
///
/// ```rust
/// use chart_scout::sources::{CsvSource, TableSource};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let source = CsvSource::from_upload("sales.csv", b"region,sales\neast,10\nwest,20\n".to_vec()).unwrap();
/// let table = source.load().await.unwrap();
/// assert_eq!(table.column_names(), vec!["region", "sales"]);
/// # })
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    input: CsvInput,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a source from uploaded bytes. The filename must end in `.csv`.
    pub fn from_upload(filename: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let filename = filename.into();
        if !filename.ends_with(".csv") {
            return Err(ScoutError::InvalidFileType { filename });
        }
        Ok(Self {
            input: CsvInput::Bytes {
                filename,
                bytes: bytes.into(),
            },
            options: CsvOptions::default(),
        })
    }

    /// Creates a source reading the file at `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            input: CsvInput::Path(path.into()),
            options: CsvOptions::default(),
        }
    }

    /// Sets custom options for this CSV source.
    pub fn with_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    /// Parses CSV bytes into a table using the given options.
    #[instrument(skip(bytes, options), fields(len = bytes.len()))]
    pub fn parse(bytes: &[u8], options: &CsvOptions) -> Result<Table> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ScoutError::unparseable("No columns to parse from file"));
        }

        let format = Format::default()
            .with_header(options.has_header)
            .with_delimiter(options.delimiter)
            .with_quote(options.quote)
            .with_null_regex(NULL_VALUES.clone());

        let (inferred, records) = format
            .infer_schema(Cursor::new(bytes), options.schema_infer_max_records)
            .map_err(unparseable)?;
        debug!(
            fields = inferred.fields().len(),
            records, "Inferred CSV schema"
        );

        let schema = Arc::new(prepare_schema(&inferred));
        if schema.fields().is_empty() {
            return Err(ScoutError::unparseable("No columns to parse from file"));
        }

        let batch = match read_batch(bytes, schema.clone(), options) {
            Ok(batch) => batch,
            Err(e) => {
                debug!(error = %e, "Typed CSV read failed, retrying column by column");
                read_with_text_fallback(bytes, &schema, options)?
            }
        };

        let table = Table::try_new(batch)?;
        if options.drop_all_null_columns {
            table.drop_all_null_columns()
        } else {
            Ok(table)
        }
    }
}

#[async_trait]
impl TableSource for CsvSource {
    #[instrument(skip(self), fields(source = %self.description()))]
    async fn load(&self) -> Result<Table> {
        let table = match &self.input {
            CsvInput::Bytes { bytes, .. } => Self::parse(bytes, &self.options)?,
            CsvInput::Path(path) => {
                let bytes = tokio::fs::read(path).await?;
                Self::parse(&bytes, &self.options)?
            }
        };

        info!(
            rows = table.num_rows(),
            columns = table.num_columns(),
            "Loaded CSV table"
        );
        Ok(table)
    }

    fn name(&self) -> String {
        match &self.input {
            CsvInput::Bytes { filename, .. } => filename.clone(),
            CsvInput::Path(path) => path.display().to_string(),
        }
    }

    fn description(&self) -> String {
        match &self.input {
            CsvInput::Bytes { filename, bytes } => {
                format!("CSV upload '{filename}' ({} bytes)", bytes.len())
            }
            CsvInput::Path(path) => format!("CSV file {}", path.display()),
        }
    }
}

/// Decodes the whole input against `schema` into one batch.
fn read_batch(
    bytes: &[u8],
    schema: SchemaRef,
    options: &CsvOptions,
) -> std::result::Result<RecordBatch, ArrowError> {
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(options.has_header)
        .with_delimiter(options.delimiter)
        .with_quote(options.quote)
        .with_null_regex(NULL_VALUES.clone())
        .with_batch_size(options.batch_size)
        .build(Cursor::new(bytes))?;

    let batches = reader.collect::<std::result::Result<Vec<RecordBatch>, ArrowError>>()?;
    concat_batches(&schema, &batches)
}

/// Reads every column as text, then casts each one back to its inferred
/// type. Columns holding a value that does not fit stay text.
fn read_with_text_fallback(
    bytes: &[u8],
    schema: &Schema,
    options: &CsvOptions,
) -> Result<RecordBatch> {
    let text_schema = Arc::new(Schema::new(
        schema
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    let text = read_batch(bytes, text_schema, options).map_err(unparseable)?;

    let strict = CastOptions {
        safe: false,
        ..Default::default()
    };
    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut columns = Vec::with_capacity(schema.fields().len());
    for (field, column) in schema.fields().iter().zip(text.columns()) {
        let typed = if field.data_type() == &DataType::Utf8 {
            None
        } else {
            cast_with_options(column.as_ref(), field.data_type(), &strict).ok()
        };
        match typed {
            Some(array) => {
                fields.push(field.as_ref().clone());
                columns.push(array);
            }
            None => {
                if field.data_type() != &DataType::Utf8 {
                    debug!(column = %field.name(), "Column kept as text");
                }
                fields.push(Field::new(field.name(), DataType::Utf8, true));
                columns.push(column.clone());
            }
        }
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(unparseable)
}

fn unparseable(err: ArrowError) -> ScoutError {
    ScoutError::unparseable_with_source(err.to_string(), Box::new(err))
}

/// Renames blank and duplicate headers and turns temporal types back into text.
///
/// Blank headers become `Unnamed: {index}`; repeated names get a `.{n}`
/// suffix (`a`, `a.1`, `a.2`).
fn prepare_schema(inferred: &Schema) -> Schema {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut taken: Vec<String> = Vec::new();

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let base = if field.name().trim().is_empty() {
                format!("Unnamed: {index}")
            } else {
                field.name().clone()
            };

            let mut name = base.clone();
            while taken.contains(&name) {
                let counter = seen.entry(base.clone()).or_insert(0);
                *counter += 1;
                name = format!("{base}.{counter}");
            }
            taken.push(name.clone());

            let data_type = if is_temporal_type(field.data_type()) {
                DataType::Utf8
            } else {
                field.data_type().clone()
            };
            Field::new(name, data_type, true)
        })
        .collect();

    Schema::new(fields)
}
