use crate::core::delivery::DeliveryClient;
use crate::core::{ConfigProvider, RecordDelivery};
use crate::domain::model::{DeliveryOutcome, ErrorRow, ObjectionRecord, OutputRow, SourceRow};
use crate::utils::error::{EtlError, Result};

/// Turns each source row into exactly one [`OutputRow`].
///
/// Per-row failures never escape [`RowProcessor::process_row`]; only
/// [`RowProcessor::init`] can fail.
pub struct RowProcessor<D: RecordDelivery> {
    delivery: D,
}

impl RowProcessor<DeliveryClient> {
    pub fn init<C: ConfigProvider>(config: &C) -> Result<Self> {
        match DeliveryClient::configure(
            config.api_endpoint(),
            config.api_username(),
            config.api_password(),
        ) {
            Ok(client) => {
                tracing::info!("🔐 API integration initialized successfully");
                Ok(Self::new(client))
            }
            Err(e) => {
                tracing::error!("❌ Error in init: {}", e);
                Err(e)
            }
        }
    }
}

impl<D: RecordDelivery> RowProcessor<D> {
    pub fn new(delivery: D) -> Self {
        Self { delivery }
    }

    pub async fn process_row(&self, row: SourceRow) -> OutputRow {
        let ub_id = row.ub_id.unwrap_or(0);

        match self.build_and_deliver(row).await {
            Ok(output) => output,
            Err(e) => self.processing_failure(ub_id, &e),
        }
    }

    /// 上游讀取失敗的行也要輸出一筆錯誤記錄
    pub fn process_unreadable(&self, err: &EtlError) -> OutputRow {
        self.processing_failure(err.row_id().unwrap_or(0), err)
    }

    pub fn shutdown(self) {
        self.delivery.close();
        tracing::info!("🏁 API integration completed successfully");
    }

    async fn build_and_deliver(&self, row: SourceRow) -> Result<OutputRow> {
        let record = ObjectionRecord::from_source(row)?;

        let outcome = if record.is_valid() {
            let payload = record.to_json()?;
            self.delivery.deliver(record.ub_id, payload).await
        } else {
            let reason = missing_fields(&record);
            tracing::warn!(ub_id = record.ub_id, "Invalid objection letter UB_ID {}: {}", record.ub_id, reason);
            DeliveryOutcome::ValidationFailed(reason)
        };

        tracing::debug!(ub_id = record.ub_id, outcome = outcome.label(), "Routing UB_ID {}", record.ub_id);
        Ok(OutputRow::from_outcome(
            record.ub_id,
            &outcome,
            chrono::Local::now().naive_local(),
        ))
    }

    fn processing_failure(&self, ub_id: i32, err: &EtlError) -> OutputRow {
        tracing::error!(ub_id, "Error processing row {}: {}", ub_id, err);
        OutputRow::Error(ErrorRow::processing_error(ub_id, err))
    }
}

fn missing_fields(record: &ObjectionRecord) -> String {
    let mut missing = Vec::new();
    if record.identifier.is_empty() {
        missing.push("IH_CRIBNR is empty");
    }
    if record.assessment_number.is_empty() {
        missing.push("Aanslagnummer is empty");
    }
    if record.ub_id <= 0 {
        missing.push("UB_ID must be positive");
    }
    missing.join(", ")
}
