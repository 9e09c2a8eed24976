use crate::domain::model::DeliveryOutcome;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_username(&self) -> &str;
    fn api_password(&self) -> &str;
    fn input_path(&self) -> &str;
    fn success_output_path(&self) -> &str;
    fn error_output_path(&self) -> &str;
}

/// Sends one serialized record. Never fails: every failure is an outcome.
#[async_trait]
pub trait RecordDelivery: Send + Sync {
    async fn deliver(&self, ub_id: i32, payload: Vec<u8>) -> DeliveryOutcome;

    /// Releases transport resources at the end of a run.
    fn close(self)
    where
        Self: Sized,
    {
    }
}

pub trait RowSink<T>: Send {
    fn write_row(&mut self, row: &T) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}
