//! Configuration shared by the store and the CLI.

use crate::analyzers::{NormalizerConfig, ProfilerConfig};
use crate::charts::RenderConfig;
use crate::logging::LogConfig;
use crate::sources::CsvOptions;

/// Aggregated configuration for a [`TableStore`](super::TableStore).
#[derive(Debug, Clone, Default)]
pub struct ScoutConfig {
    pub csv: CsvOptions,
    pub profiler: ProfilerConfig,
    pub normalizer: NormalizerConfig,
    pub render: RenderConfig,
    pub log: LogConfig,
}

impl ScoutConfig {
    pub fn builder() -> ScoutConfigBuilder {
        ScoutConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ScoutConfig`].
///
/// # Examples
///
/// ```rust
/// use chart_scout::core::ScoutConfig;
///
/// let config = ScoutConfig::builder()
///     .low_cardinality_threshold(20)
///     .template("plotly_white")
///     .build();
/// assert_eq!(config.profiler.low_cardinality_threshold, 20);
/// ```
#[derive(Debug, Clone)]
pub struct ScoutConfigBuilder {
    config: ScoutConfig,
}

impl ScoutConfigBuilder {
    pub fn csv(mut self, csv: CsvOptions) -> Self {
        self.config.csv = csv;
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.config.csv.delimiter = delimiter;
        self
    }

    pub fn low_cardinality_threshold(mut self, threshold: u64) -> Self {
        self.config.profiler.low_cardinality_threshold = threshold;
        self
    }

    pub fn normalizer(mut self, normalizer: NormalizerConfig) -> Self {
        self.config.normalizer = normalizer;
        self
    }

    pub fn render(mut self, render: RenderConfig) -> Self {
        self.config.render = render;
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.config.render.template = template.into();
        self
    }

    pub fn log(mut self, log: LogConfig) -> Self {
        self.config.log = log;
        self
    }

    pub fn build(self) -> ScoutConfig {
        self.config
    }
}
