use crate::adapters::{CsvRowSource, CsvSink};
use crate::core::etl::{EtlEngine, RunSummary};
use crate::core::processor::RowProcessor;
use crate::core::{ConfigProvider, ErrorRow, SuccessRow};
use crate::utils::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputStats {
    pub readable: usize,
    pub unreadable: usize,
}

/// 讀取 CSV、逐筆送出，結果寫入成功與錯誤兩個 CSV
pub async fn run_forwarder<C: ConfigProvider>(config: &C) -> Result<RunSummary> {
    // 先初始化憑證：設定錯誤必須在讀取任何資料前中止
    let processor = RowProcessor::init(config)?;

    tracing::info!("📁 Reading objection letters from: {}", config.input_path());
    let source = CsvRowSource::from_path(config.input_path())?;
    let success_sink = CsvSink::create::<SuccessRow, _>(config.success_output_path())?;
    let error_sink = CsvSink::create::<ErrorRow, _>(config.error_output_path())?;

    let summary = EtlEngine::new(processor, success_sink, error_sink)
        .run(source)
        .await?;

    tracing::info!(
        "📁 Success rows: {}, error rows: {}",
        config.success_output_path(),
        config.error_output_path()
    );
    Ok(summary)
}

/// Counts rows without sending anything.
pub fn inspect_input(path: &str) -> Result<InputStats> {
    let mut stats = InputStats::default();
    for row in CsvRowSource::from_path(path)? {
        match row {
            Ok(_) => stats.readable += 1,
            Err(e) => {
                tracing::warn!("Unreadable row: {}", e);
                stats.unreadable += 1;
            }
        }
    }
    Ok(stats)
}
