use async_trait::async_trait;
use chrono::Local;
use domain::printer::{FallbackPrinter, PrinterError};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

/// Local print path used when no network printer takes the payload.
///
/// Payloads are appended unmodified to one spool file per day
/// (`receipts-YYYYMMDD.prn`) so they can be re-sent or printed manually.
pub struct SpoolFilePrinter {
    dir: PathBuf,
}

impl SpoolFilePrinter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn spool_path(&self) -> PathBuf {
        self.dir
            .join(format!("receipts-{}.prn", Local::now().format("%Y%m%d")))
    }
}

#[async_trait]
impl FallbackPrinter for SpoolFilePrinter {
    async fn print(&self, payload: &[u8]) -> Result<(), PrinterError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            error!("Failed to create spool directory {:?}: {}", self.dir, e);
            PrinterError::WriteFailed(e.to_string())
        })?;

        let path = self.spool_path();
        // Open, write, close per job so the data is on disk immediately
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                error!("Failed to open spool file {:?}: {}", path, e);
                PrinterError::WriteFailed(e.to_string())
            })?;

        if let Err(e) = file.write_all(payload).await {
            error!("Failed to write to spool file: {}", e);
            return Err(PrinterError::WriteFailed(e.to_string()));
        }
        if let Err(e) = file.flush().await {
            error!("Failed to flush spool file: {}", e);
            return Err(PrinterError::WriteFailed(e.to_string()));
        }

        info!(path = ?path, bytes = payload.len(), "Receipt spooled to file");
        Ok(())
    }
}
