pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use adapters::{CsvRowSource, CsvSink, MemorySink};
pub use app::forwarder::run_forwarder;
pub use crate::core::{delivery::DeliveryClient, etl::EtlEngine, etl::RunSummary, processor::RowProcessor};
pub use domain::model::{DeliveryOutcome, ErrorRow, ObjectionRecord, OutputRow, SourceRow, SuccessRow};
pub use utils::error::{EtlError, Result};
