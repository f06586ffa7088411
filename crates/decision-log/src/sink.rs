use std::path::Path;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::entry::LogEntry;
use crate::writer::{LogWriteError, LogWriter};

/// Entries buffered between producers and the background writer.
const CHANNEL_BUFFER: usize = 1024;

/// Idle time after which buffered writes are flushed to disk.
const FLUSH_INTERVAL_SECS: u64 = 1;

/// Cloneable handle for submitting entries to the background writer task.
///
/// Dropping the last clone closes the channel; the writer flushes what it
/// has and exits, which is what the returned join handle completes on.
#[derive(Clone)]
pub struct LogSink {
    tx: mpsc::Sender<LogEntry>,
}

impl LogSink {
    /// Open the decision log and spawn the writer task.
    ///
    /// The task never panics: write failures are logged through `tracing`
    /// and the affected entry is dropped.
    pub async fn start(path: impl AsRef<Path>) -> Result<(Self, JoinHandle<()>), LogWriteError> {
        let (tx, rx) = mpsc::channel::<LogEntry>(CHANNEL_BUFFER);
        let mut writer = LogWriter::open(path).await?;
        let handle = tokio::spawn(async move {
            drain(&mut writer, rx).await;
        });
        Ok((Self { tx }, handle))
    }

    /// Queue an entry. Waits if the buffer is full; if the writer task has
    /// already exited the entry is dropped with a warning.
    pub async fn log(&self, entry: LogEntry) {
        if let Err(err) = self.tx.send(entry).await {
            tracing::warn!(event = ?err.0.event, "decision log closed, entry dropped");
        }
    }
}

/// Writer loop: append entries as they arrive, flush after idle gaps and
/// once more on shutdown.
async fn drain(writer: &mut LogWriter, mut rx: mpsc::Receiver<LogEntry>) {
    let idle = tokio::time::Duration::from_secs(FLUSH_INTERVAL_SECS);
    let mut pending = false;

    loop {
        match tokio::time::timeout(idle, rx.recv()).await {
            Ok(Some(entry)) => match writer.write(&entry).await {
                Ok(()) => pending = true,
                Err(err) => tracing::error!(%err, "failed to write decision log entry"),
            },
            // Channel closed: final flush, then exit.
            Ok(None) => {
                if pending {
                    if let Err(err) = writer.flush().await {
                        tracing::error!(%err, "failed to flush decision log on shutdown");
                    }
                }
                tracing::debug!("decision log writer stopped");
                return;
            }
            // Idle: flush anything buffered.
            Err(_) => {
                if pending {
                    match writer.flush().await {
                        Ok(()) => pending = false,
                        Err(err) => tracing::error!(%err, "periodic decision log flush failed"),
                    }
                }
            }
        }
    }
}
