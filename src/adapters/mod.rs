// Adapters layer: concrete row sources and sinks for the forwarding engine.

pub mod files;
pub mod memory;

pub use files::{CsvRowSource, CsvSink};
pub use memory::MemorySink;
