//! Delivery sinks for finished export payloads
//!
//! A sink receives the payload once the export has fully succeeded. The
//! export pipeline never inspects what the sink does with it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::coordinator::ExportPayload;

/// Destination for export payloads
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Hand over the payload
    ///
    /// # Returns
    /// * `Result<String>` - Human readable description of where it went
    async fn deliver(&self, payload: &ExportPayload) -> Result<String>;
}

/// Writes payloads as files into a directory
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Create a sink writing into `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path the payload with `filename` will be written to
    pub fn target_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Check that the output directory exists
    async fn validate_dir(dir: &Path) -> Result<()> {
        if dir.as_os_str().is_empty() {
            return Ok(());
        }

        match tokio::fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            _ => Err(ConfigError::Generic(format!(
                "Output directory does not exist: {}",
                dir.display()
            ))
            .into()),
        }
    }
}

#[async_trait]
impl DeliverySink for FileSink {
    async fn deliver(&self, payload: &ExportPayload) -> Result<String> {
        Self::validate_dir(&self.dir).await?;

        let path = self.target_path(&payload.filename);
        tokio::fs::write(&path, &payload.content).await?;

        info!("Wrote {} bytes to {}", payload.content.len(), path.display());
        Ok(path.display().to_string())
    }
}

/// Writes raw payload bytes to standard output
pub struct StdoutSink;

#[async_trait]
impl DeliverySink for StdoutSink {
    async fn deliver(&self, payload: &ExportPayload) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(&payload.content).await?;
        stdout.flush().await?;

        debug!("Wrote {} bytes to stdout", payload.content.len());
        Ok("stdout".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RosterError;
    use crate::export::writers::ExportFormat;

    fn payload() -> ExportPayload {
        ExportPayload {
            content: b"ID,Name,Email,CreatedAt".to_vec(),
            filename: "all_students.csv".to_string(),
            format: ExportFormat::Csv,
            record_count: 0,
        }
    }

    #[tokio::test]
    async fn test_file_sink_writes_payload() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());

        let location = sink.deliver(&payload()).await.unwrap();

        let path = dir.path().join("all_students.csv");
        assert_eq!(location, path.display().to_string());
        assert_eq!(
            tokio::fs::read(&path).await.unwrap(),
            b"ID,Name,Email,CreatedAt"
        );
    }

    #[tokio::test]
    async fn test_file_sink_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("missing"));
        let err = sink.deliver(&payload()).await.unwrap_err();
        assert!(matches!(err, RosterError::Config(_)));
    }

    #[tokio::test]
    async fn test_file_sink_rejects_file_as_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_dir");
        tokio::fs::write(&file, b"x").await.unwrap();

        let err = FileSink::new(&file).deliver(&payload()).await.unwrap_err();
        assert!(matches!(err, RosterError::Config(_)));
        assert_eq!(tokio::fs::read(&file).await.unwrap(), b"x");
    }
}
