//! Stateful entry point: the table store and its configuration.

mod config;
mod store;

pub use config::{ScoutConfig, ScoutConfigBuilder};
pub use store::{LoadedTable, TableStore, UploadSummary};
