//! The table store: one live table, replaced wholesale on every upload.
//!
//! An upload parses, normalizes and classifies the new table completely
//! before it takes the write lock, so readers never observe a partially built
//! table. Readers clone an `Arc` snapshot under a short read lock and work on
//! it lock-free; an in-flight chart keeps its snapshot even if a new upload
//! lands meanwhile. Failed operations leave the store unchanged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use super::config::ScoutConfig;
use crate::analyzers::{
    ChartSuggestion, ColumnProfiler, DateNormalizer, NormalizationReport, SuggestionEngine,
    TableProfile,
};
use crate::charts::{ChartDocument, ChartResolver, ChartSpec};
use crate::error::{Result, ScoutError};
use crate::logging::LogConfig;
use crate::sources::{CsvOptions, CsvSource, TableSource};
use crate::table::Table;

/// A table together with what was learned while loading it.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub filename: String,
    pub table: Table,
    /// Profile computed right after date normalization
    pub profile: TableProfile,
    pub normalization: NormalizationReport,
    pub loaded_at: DateTime<Utc>,
}

/// Response to a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadSummary {
    pub filename: String,
    pub columns: TableProfile,
}

/// Shared handle to the single live table.
///
/// # Example
///
/// ```rust
/// use chart_scout::core::TableStore;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = TableStore::new();
/// let csv = b"date,region,sales\n2024-01-01,east,10\n2024-01-02,east,20\n2024-01-03,west,30\n";
/// let summary = store.upload("sales.csv", csv.to_vec(), None).await.unwrap();
/// assert_eq!(summary.columns.len(), 3);
///
/// let suggestions = store.suggest().await.unwrap();
/// assert_eq!(suggestions.len(), 5);
/// # })
/// ```
#[derive(Clone)]
pub struct TableStore {
    slot: Arc<RwLock<Option<Arc<LoadedTable>>>>,
    csv: CsvOptions,
    profiler: ColumnProfiler,
    normalizer: DateNormalizer,
    engine: Arc<SuggestionEngine>,
    resolver: ChartResolver,
    log: LogConfig,
}

impl TableStore {
    /// Creates an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(ScoutConfig::default())
    }

    pub fn with_config(config: ScoutConfig) -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            csv: config.csv,
            profiler: ColumnProfiler::with_config(config.profiler),
            normalizer: DateNormalizer::with_config(config.normalizer),
            engine: Arc::new(SuggestionEngine::standard()),
            resolver: ChartResolver::plotly(config.render),
            log: config.log,
        }
    }

    /// Replaces the suggestion engine.
    pub fn with_engine(mut self, engine: SuggestionEngine) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    /// Replaces the chart resolver.
    pub fn with_resolver(mut self, resolver: ChartResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Loads an uploaded CSV and makes it the live table.
    ///
    /// `date_format` switches the date normalizer to strict mode.
    #[instrument(skip(self, filename, bytes), fields(filename = %self.log.field(filename)))]
    pub async fn upload(
        &self,
        filename: &str,
        bytes: impl Into<Arc<[u8]>>,
        date_format: Option<&str>,
    ) -> Result<UploadSummary> {
        let source = CsvSource::from_upload(filename, bytes)
            .inspect_err(|e| warn!(error = %self.log.field(&e.to_string()), "Rejected upload"))?
            .with_options(self.csv.clone());
        self.load_source(&source, date_format).await
    }

    /// Loads any table source and makes it the live table.
    #[instrument(skip(self, source), fields(source = %source.name()))]
    pub async fn load_source(
        &self,
        source: &dyn TableSource,
        date_format: Option<&str>,
    ) -> Result<UploadSummary> {
        let mut table = source
            .load()
            .await
            .inspect_err(|e| warn!(error = %self.log.field(&e.to_string()), "Failed to load table"))?;

        let normalization = self.normalizer.normalize(&mut table, date_format);
        let profile = self.profiler.profile_table(&table);

        let loaded = Arc::new(LoadedTable {
            filename: source.name(),
            table,
            profile: profile.clone(),
            normalization,
            loaded_at: Utc::now(),
        });

        let summary = UploadSummary {
            filename: loaded.filename.clone(),
            columns: profile,
        };

        *self.slot.write().await = Some(loaded);

        info!(
            filename = %summary.filename,
            columns = summary.columns.len(),
            "Replaced live table"
        );
        Ok(summary)
    }

    /// Snapshot of the live table.
    pub async fn current(&self) -> Result<Arc<LoadedTable>> {
        self.slot.read().await.clone().ok_or(ScoutError::NoData)
    }

    pub async fn is_loaded(&self) -> bool {
        self.slot.read().await.is_some()
    }

    /// Profile computed when the live table was loaded.
    pub async fn profile(&self) -> Result<TableProfile> {
        Ok(self.current().await?.profile.clone())
    }

    /// Suggestions for the live table, from a fresh classification.
    #[instrument(skip(self))]
    pub async fn suggest(&self) -> Result<Vec<ChartSuggestion>> {
        let snapshot = self.current().await?;
        let profile = self.profiler.profile_table(&snapshot.table);
        let suggestions = self.engine.suggest(&profile);
        info!(suggestions = suggestions.len(), "Generated chart suggestions");
        Ok(suggestions)
    }

    /// Builds a chart from the live table.
    #[instrument(skip(self, spec), fields(chart_type = %spec.chart_type()))]
    pub async fn generate_chart(&self, spec: &ChartSpec) -> Result<ChartDocument> {
        let snapshot = self.current().await?;
        self.resolver
            .resolve(spec, &snapshot.table)
            .await
            .inspect_err(|e| warn!(error = %e, "Chart generation failed"))
    }

    /// Builds a chart from a raw JSON request.
    ///
    /// A missing table is reported before the request is validated.
    pub async fn generate_chart_json(&self, request: Value) -> Result<ChartDocument> {
        self.current().await?;
        let spec = ChartSpec::from_json_value(request)
            .inspect_err(|e| warn!(error = %self.log.field(&e.to_string()), "Rejected chart request"))?;
        self.generate_chart(&spec).await
    }

    /// Drops the live table.
    pub async fn clear(&self) {
        *self.slot.write().await = None;
        info!("Cleared live table");
    }
}

impl Default for TableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore")
            .field("csv", &self.csv)
            .field("profiler", &self.profiler)
            .field("engine_rules", &self.engine.rule_names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::ColumnType;
    use serde_json::json;

    const SALES: &[u8] =
        b"date,region,sales\n2024-01-01,east,10\n2024-01-02,east,20\n2024-01-03,west,30\n";

    #[tokio::test]
    async fn test_empty_store_reports_no_data() {
        let store = TableStore::new();
        assert!(matches!(store.suggest().await, Err(ScoutError::NoData)));
        assert!(matches!(store.profile().await, Err(ScoutError::NoData)));
        let err = store
            .generate_chart_json(json!({"chart_type": "radar"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ScoutError::NoData));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_upload_classifies_after_normalization() {
        let store = TableStore::new();
        let summary = store.upload("sales.csv", SALES.to_vec(), None).await.unwrap();

        assert_eq!(summary.filename, "sales.csv");
        assert_eq!(
            summary.columns.get("date").unwrap().column_type,
            ColumnType::Datetime
        );
        let loaded = store.current().await.unwrap();
        assert!(loaded.normalization.was_converted("date"));
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_previous_table() {
        let store = TableStore::new();
        store.upload("sales.csv", SALES.to_vec(), None).await.unwrap();

        assert!(store.upload("sales.txt", SALES.to_vec(), None).await.is_err());
        assert!(store.upload("bad.csv", b"a,b\n1,2\n3,4,5\n".to_vec(), None).await.is_err());

        assert_eq!(store.current().await.unwrap().filename, "sales.csv");
    }

    #[tokio::test]
    async fn test_snapshot_survives_replacement() {
        let store = TableStore::new();
        store.upload("first.csv", SALES.to_vec(), None).await.unwrap();
        let snapshot = store.current().await.unwrap();

        store.upload("second.csv", b"x\n1\n".to_vec(), None).await.unwrap();

        assert_eq!(snapshot.filename, "first.csv");
        assert_eq!(snapshot.table.num_columns(), 3);
        assert_eq!(store.current().await.unwrap().table.column_names(), vec!["x"]);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = TableStore::new();
        store.upload("sales.csv", SALES.to_vec(), None).await.unwrap();
        assert!(store.is_loaded().await);
        store.clear().await;
        assert!(!store.is_loaded().await);
    }

    #[tokio::test]
    async fn test_generate_chart_json_validates_request() {
        let store = TableStore::new();
        store.upload("sales.csv", SALES.to_vec(), None).await.unwrap();

        let err = store
            .generate_chart_json(json!({"chart_type": "radar"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ScoutError::InvalidChartConfig(_)));

        let doc = store
            .generate_chart_json(json!({"chart_type": "bar", "x": "region", "y": "sales"}))
            .await
            .unwrap();
        assert_eq!(doc.data[0]["y"], json!([30, 30]));
    }
}
