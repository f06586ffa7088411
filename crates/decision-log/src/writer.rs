use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::entry::LogEntry;

/// Errors from decision-log I/O.
#[derive(Debug, thiserror::Error)]
pub enum LogWriteError {
    #[error("failed to create log directory: {0}")]
    CreateDir(std::io::Error),

    #[error("failed to open decision log: {0}")]
    OpenFile(std::io::Error),

    #[error("failed to serialize log entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to append to decision log: {0}")]
    Write(std::io::Error),

    #[error("failed to flush decision log: {0}")]
    Flush(std::io::Error),
}

/// Append-only JSON-lines writer: one newline-terminated object per entry.
pub struct LogWriter {
    file: tokio::fs::File,
}

impl LogWriter {
    /// Open the log at `path` in append mode, creating the file and any
    /// missing parent directories.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, LogWriteError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(LogWriteError::CreateDir)?;
        }
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(LogWriteError::OpenFile)?;
        Ok(Self { file })
    }

    pub async fn write(&mut self, entry: &LogEntry) -> Result<(), LogWriteError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        self.file
            .write_all(&line)
            .await
            .map_err(LogWriteError::Write)
    }

    pub async fn flush(&mut self) -> Result<(), LogWriteError> {
        self.file.flush().await.map_err(LogWriteError::Flush)
    }
}
