use crate::core::processor::RowProcessor;
use crate::core::{RecordDelivery, RowSink};
use crate::domain::model::{ErrorRow, OutputRow, SourceRow, SuccessRow};
use crate::utils::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct EtlEngine<D, S, E>
where
    D: RecordDelivery,
    S: RowSink<SuccessRow>,
    E: RowSink<ErrorRow>,
{
    processor: RowProcessor<D>,
    success_sink: S,
    error_sink: E,
}

impl<D, S, E> EtlEngine<D, S, E>
where
    D: RecordDelivery,
    S: RowSink<SuccessRow>,
    E: RowSink<ErrorRow>,
{
    pub fn new(processor: RowProcessor<D>, success_sink: S, error_sink: E) -> Self {
        Self {
            processor,
            success_sink,
            error_sink,
        }
    }

    /// 逐筆處理：每筆的輸出寫入 sink 後才讀取下一筆
    pub async fn run<I>(mut self, rows: I) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<SourceRow>>,
    {
        tracing::info!("🚀 Starting objection letter forwarding");
        let mut summary = RunSummary::default();

        for row in rows {
            let output = match row {
                Ok(row) => self.processor.process_row(row).await,
                Err(e) => self.processor.process_unreadable(&e),
            };

            summary.total += 1;
            match output {
                OutputRow::Success(row) => {
                    summary.succeeded += 1;
                    self.success_sink.write_row(&row)?;
                }
                OutputRow::Error(row) => {
                    summary.failed += 1;
                    self.error_sink.write_row(&row)?;
                }
            }
        }

        self.success_sink.flush()?;
        self.error_sink.flush()?;
        self.processor.shutdown();

        tracing::info!(
            "📊 Processed {} records: {} succeeded, {} failed",
            summary.total,
            summary.succeeded,
            summary.failed
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemorySink;
    use crate::domain::model::DeliveryOutcome;
    use crate::utils::error::EtlError;

    /// 依 UB_ID 決定回應：偶數成功，奇數被拒
    struct ParityDelivery;

    #[async_trait::async_trait]
    impl RecordDelivery for ParityDelivery {
        async fn deliver(&self, ub_id: i32, _payload: Vec<u8>) -> DeliveryOutcome {
            if ub_id % 2 == 0 {
                DeliveryOutcome::Success {
                    status: 200,
                    body: String::new(),
                }
            } else {
                DeliveryOutcome::ApiRejected {
                    status: 422,
                    body: String::new(),
                }
            }
        }
    }

    struct FailingSink;

    impl RowSink<SuccessRow> for FailingSink {
        fn write_row(&mut self, _row: &SuccessRow) -> Result<()> {
            Err(EtlError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn row(ub_id: Option<i32>, identifier: &str) -> SourceRow {
        SourceRow {
            ub_id,
            ih_cribnr: Some(identifier.to_string()),
            aanslagnummer: Some("A-9".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_every_row_yields_exactly_one_output() {
        let success = MemorySink::new();
        let errors = MemorySink::new();
        let engine = EtlEngine::new(
            RowProcessor::new(ParityDelivery),
            success.clone(),
            errors.clone(),
        );

        let rows = vec![
            Ok(row(Some(2), "CRIB-2")),
            Ok(row(Some(3), "CRIB-3")),
            Ok(row(Some(4), "")),
            Ok(row(None, "CRIB-X")),
            Err(EtlError::RowDecodeError {
                ub_id: 6,
                column: "Datum".to_string(),
                message: "invalid date 'yesterday'".to_string(),
            }),
            Ok(row(Some(8), "CRIB-8")),
        ];

        let summary = engine.run(rows).await.unwrap();

        assert_eq!(
            summary,
            RunSummary {
                total: 6,
                succeeded: 2,
                failed: 4,
            }
        );

        let success_ids: Vec<i32> = success.rows().iter().map(|r| r.ub_id).collect();
        assert_eq!(success_ids, vec![2, 8]);

        let errors = errors.rows();
        let descriptions: Vec<(i32, &str)> = errors
            .iter()
            .map(|r| (r.ub_id, r.error_description.as_str()))
            .collect();
        assert_eq!(descriptions[0], (3, "API call failed"));
        assert_eq!(
            descriptions[1],
            (4, "Invalid objection letter data - missing required fields")
        );
        assert_eq!(
            descriptions[2],
            (0, "Processing error: required column UB_ID is null")
        );
        assert_eq!(descriptions[3].0, 6);
        assert!(descriptions[3].1.starts_with("Processing error: cannot decode column Datum"));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let success = MemorySink::new();
        let errors = MemorySink::new();
        let engine = EtlEngine::new(
            RowProcessor::new(ParityDelivery),
            success.clone(),
            errors.clone(),
        );

        let summary = engine.run(Vec::<Result<SourceRow>>::new()).await.unwrap();

        assert_eq!(summary, RunSummary::default());
        assert!(success.rows().is_empty());
        assert!(errors.rows().is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_aborts_run() {
        let engine = EtlEngine::new(
            RowProcessor::new(ParityDelivery),
            FailingSink,
            MemorySink::new(),
        );

        let rows: Vec<Result<SourceRow>> = vec![Ok(row(Some(2), "CRIB-2"))];
        let result = engine.run(rows).await;

        assert!(matches!(result, Err(EtlError::IoError(_))));
    }
}
