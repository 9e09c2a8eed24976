use crate::core::RowSink;
use crate::utils::error::{EtlError, Result};
use std::sync::{Arc, Mutex};

/// 共享緩衝區的 sink：clone 後仍指向同一份資料
#[derive(Debug)]
pub struct MemorySink<T> {
    rows: Arc<Mutex<Vec<T>>>,
}

impl<T> MemorySink<T> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone> MemorySink<T> {
    pub fn rows(&self) -> Vec<T> {
        self.rows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl<T> Clone for MemorySink<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T> Default for MemorySink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send> RowSink<T> for MemorySink<T> {
    fn write_row(&mut self, row: &T) -> Result<()> {
        let mut rows = self.rows.lock().map_err(|e| EtlError::ProcessingError {
            message: format!("memory sink lock poisoned: {}", e),
        })?;
        rows.push(row.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
