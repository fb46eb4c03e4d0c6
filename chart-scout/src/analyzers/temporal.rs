//! Date normalization for text columns.
//!
//! Before classification, every text column is offered to the
//! [`DateNormalizer`], which may replace it in place with a nanosecond
//! timestamp column. Two modes exist:
//!
//! - **Strict** (a format is supplied): every non-missing value must parse
//!   with exactly that format. One failure leaves the column untouched.
//! - **Inference** (no format): a lenient probe tries the format catalogue
//!   on every value. If nothing parses, the column stays text. Otherwise the
//!   format of the first non-missing value is adopted and the whole column is
//!   re-parsed strictly with it; any failure leaves the column untouched.
//!
//! A column is therefore either fully converted or not converted at all.
//! Numeric, boolean and already temporal columns are never attempted, and a
//! failed conversion is not an error.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, StringArray};
//! use arrow::datatypes::{DataType, TimeUnit};
//! use chart_scout::analyzers::DateNormalizer;
//! use chart_scout::table::Table;
//!
//! let mut table = Table::from_columns(vec![(
//!     "day",
//!     Arc::new(StringArray::from(vec!["2024-01-01", "2024-01-02"])) as ArrayRef,
//! )])
//! .unwrap();
//!
//! let report = DateNormalizer::new().normalize(&mut table, None);
//! assert_eq!(report.converted.len(), 1);
//! assert_eq!(
//!     table.schema().field(0).data_type(),
//!     &DataType::Timestamp(TimeUnit::Nanosecond, None)
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, TimestampNanosecondArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::table::{is_text_type, Table};

/// Characters that can appear in any catalogue format.
static DATE_CHARSET: Lazy<Regex> = Lazy::new(|| {
    // This regex is compile-time constant and known to be valid
    #[allow(clippy::expect_used)]
    Regex::new(r"^[0-9A-Za-z ,:./+\-]{6,64}$").expect("Hard-coded regex pattern should be valid")
});

/// A date/time format understood by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormat {
    /// RFC 3339 / ISO 8601 with offset, e.g. `2024-01-01T10:00:00+02:00`
    Rfc3339,
    /// RFC 2822, e.g. `Tue, 1 Jul 2003 10:52:37 +0200`
    Rfc2822,
    /// A strftime-style pattern, e.g. `%d/%m/%Y`
    Pattern(String),
}

impl DateFormat {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::Pattern(pattern.into())
    }

    /// Parses a single value to nanoseconds since the Unix epoch (UTC).
    ///
    /// Returns `None` when the value does not match or is outside the
    /// representable nanosecond range.
    pub fn parse(&self, value: &str) -> Option<i64> {
        let value = value.trim();
        match self {
            DateFormat::Rfc3339 => DateTime::parse_from_rfc3339(value)
                .ok()?
                .with_timezone(&Utc)
                .timestamp_nanos_opt(),
            DateFormat::Rfc2822 => DateTime::parse_from_rfc2822(value)
                .ok()?
                .with_timezone(&Utc)
                .timestamp_nanos_opt(),
            DateFormat::Pattern(pattern) => parse_pattern(value, pattern),
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFormat::Rfc3339 => write!(f, "RFC 3339"),
            DateFormat::Rfc2822 => write!(f, "RFC 2822"),
            DateFormat::Pattern(pattern) => write!(f, "{pattern}"),
        }
    }
}

fn parse_pattern(value: &str, pattern: &str) -> Option<i64> {
    if pattern.contains("%z") || pattern.contains("%:z") {
        return DateTime::parse_from_str(value, pattern)
            .ok()?
            .with_timezone(&Utc)
            .timestamp_nanos_opt();
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, pattern) {
        return datetime.and_utc().timestamp_nanos_opt();
    }
    NaiveDate::parse_from_str(value, pattern)
        .ok()?
        .and_hms_opt(0, 0, 0)?
        .and_utc()
        .timestamp_nanos_opt()
}

/// Formats tried in inference mode, in priority order.
pub fn default_formats() -> Vec<DateFormat> {
    let patterns = [
        "%Y-%m-%d",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    let tail = [
        "%Y/%m/%d",
        "%Y/%m/%d %H:%M:%S",
        "%m/%d/%Y",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%d/%m/%Y",
        "%d.%m.%Y",
        "%d.%m.%Y %H:%M:%S",
        "%d-%m-%Y",
        "%b %d, %Y",
        "%B %d, %Y",
        "%b %d %Y",
        "%d %b %Y",
        "%d %B %Y",
    ];

    let mut formats: Vec<DateFormat> = patterns.iter().map(|p| DateFormat::pattern(*p)).collect();
    formats.push(DateFormat::Rfc3339);
    formats.extend(tail.iter().map(|p| DateFormat::pattern(*p)));
    formats.push(DateFormat::Rfc2822);
    formats
}

/// Configuration for the date normalizer
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Catalogue used by inference mode, in priority order
    pub formats: Vec<DateFormat>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
        }
    }
}

/// A column that was converted to timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedColumn {
    pub column: String,
    /// The format every value was parsed with
    pub format: String,
}

/// Outcome of a normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    pub converted: Vec<ConvertedColumn>,
    /// Text columns that were attempted and left unchanged
    pub unchanged: Vec<String>,
}

impl NormalizationReport {
    pub fn was_converted(&self, column: &str) -> bool {
        self.converted.iter().any(|c| c.column == column)
    }
}

/// Builder for DateNormalizer
pub struct DateNormalizerBuilder {
    config: NormalizerConfig,
}

impl DateNormalizerBuilder {
    /// Replace the inference catalogue
    pub fn formats(mut self, formats: Vec<DateFormat>) -> Self {
        self.config.formats = formats;
        self
    }

    /// Append a format to the inference catalogue
    pub fn add_format(mut self, format: DateFormat) -> Self {
        self.config.formats.push(format);
        self
    }

    pub fn build(self) -> DateNormalizer {
        DateNormalizer {
            config: self.config,
        }
    }
}

/// Converts date-like text columns to timestamp columns in place.
#[derive(Debug, Clone, Default)]
pub struct DateNormalizer {
    config: NormalizerConfig,
}

impl DateNormalizer {
    pub fn builder() -> DateNormalizerBuilder {
        DateNormalizerBuilder {
            config: NormalizerConfig::default(),
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_config(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalizes every text column of `table`.
    ///
    /// With `format` the strict mode is used for every column, otherwise the
    /// inference mode. Never fails; columns that do not convert are kept.
    #[instrument(skip(self, table), fields(columns = table.num_columns()))]
    pub fn normalize(&self, table: &mut Table, format: Option<&str>) -> NormalizationReport {
        let strict = format.map(DateFormat::pattern);
        let mut report = NormalizationReport::default();

        for index in 0..table.num_columns() {
            let array = table.column(index).clone();
            if !is_text_type(array.data_type()) {
                continue;
            }
            let name = table.schema().field(index).name().clone();

            let converted = match &strict {
                Some(format) => self.convert_strict(&array, format),
                None => self.convert_inferred(&array),
            };

            match converted {
                Some((timestamps, format)) => match table.replace_column(index, timestamps) {
                    Ok(()) => {
                        debug!(column = %name, format = %format, "Converted column to datetime");
                        report.converted.push(ConvertedColumn {
                            column: name,
                            format: format.to_string(),
                        });
                    }
                    Err(e) => {
                        debug!(column = %name, error = %e, "Failed to replace column");
                        report.unchanged.push(name);
                    }
                },
                None => {
                    debug!(column = %name, "Column left as text");
                    report.unchanged.push(name);
                }
            }
        }

        info!(
            converted = report.converted.len(),
            unchanged = report.unchanged.len(),
            strict = strict.is_some(),
            "Completed date normalization"
        );
        report
    }

    /// Strict mode: every non-missing value must parse with `format`.
    pub fn convert_strict(
        &self,
        array: &ArrayRef,
        format: &DateFormat,
    ) -> Option<(ArrayRef, DateFormat)> {
        let values = text_values(array)?;
        let parsed = parse_all(&values, format)?;
        Some((to_timestamps(parsed), format.clone()))
    }

    /// Inference mode: lenient probe, then a strict re-parse with the format
    /// of the first non-missing value.
    pub fn convert_inferred(&self, array: &ArrayRef) -> Option<(ArrayRef, DateFormat)> {
        let values = text_values(array)?;

        let any_parsed = values
            .iter()
            .flatten()
            .any(|value| self.detect_format(value).is_some());
        if !any_parsed {
            return None;
        }

        let first = values.iter().flatten().next()?;
        let format = self.detect_format(first)?;
        let parsed = parse_all(&values, format)?;
        Some((to_timestamps(parsed), format.clone()))
    }

    /// The first catalogue format that parses `value`.
    pub fn detect_format(&self, value: &str) -> Option<&DateFormat> {
        let trimmed = value.trim();
        if !DATE_CHARSET.is_match(trimmed) || !trimmed.bytes().any(|b| b.is_ascii_digit()) {
            return None;
        }
        self.config
            .formats
            .iter()
            .find(|format| format.parse(trimmed).is_some())
    }
}

/// Reads a text column as owned optional strings.
fn text_values(array: &ArrayRef) -> Option<Vec<Option<String>>> {
    let utf8 = cast(array.as_ref(), &DataType::Utf8).ok()?;
    let strings = utf8.as_string::<i32>();
    Some(
        (0..strings.len())
            .map(|i| (!strings.is_null(i)).then(|| strings.value(i).to_string()))
            .collect(),
    )
}

/// Parses every value with one format; `None` if any non-missing value fails.
fn parse_all(values: &[Option<String>], format: &DateFormat) -> Option<Vec<Option<i64>>> {
    values
        .iter()
        .map(|value| match value {
            None => Some(None),
            Some(value) => format.parse(value).map(Some),
        })
        .collect()
}

fn to_timestamps(values: Vec<Option<i64>>) -> ArrayRef {
    Arc::new(TimestampNanosecondArray::from(values))
}
