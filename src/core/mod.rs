pub mod delivery;
pub mod etl;
pub mod processor;

pub use crate::domain::model::{DeliveryOutcome, ErrorRow, ObjectionRecord, OutputRow, SourceRow, SuccessRow};
pub use crate::domain::ports::{ConfigProvider, RecordDelivery, RowSink};
pub use crate::utils::error::Result;
