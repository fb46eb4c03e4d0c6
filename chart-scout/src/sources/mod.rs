//! Table sources for chart-scout.
//!
//! A [`TableSource`] produces a [`Table`] from some external input. The only
//! source shipped today reads CSV, either from raw upload bytes or from a
//! file on disk.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::Result;
use crate::table::Table;

mod csv;

pub use csv::{CsvOptions, CsvSource};

/// A producer of tables.
///
/// # Examples
///
/// ```rust,no_run
/// use chart_scout::sources::{CsvSource, TableSource};
///
/// # async fn example() -> chart_scout::error::Result<()> {
/// let source = CsvSource::from_path("data/sales.csv");
/// let table = source.load().await?;
/// println!("{} rows from {}", table.num_rows(), source.description());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait TableSource: Debug + Send + Sync {
    /// Loads the full table into memory.
    async fn load(&self) -> Result<Table>;

    /// Name reported back to callers (the upload's filename, or the path).
    fn name(&self) -> String;

    /// Returns a human-readable description of this source.
    fn description(&self) -> String;
}
