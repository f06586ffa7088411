//! # decision-log
//!
//! Append-only JSON-lines trail of access decisions and engine lifecycle
//! events. Each entry is one newline-terminated JSON object, so the log can
//! be tailed, shipped and replayed with standard tooling.
//!
//! Writes go through a background task fed by a cloneable [`LogSink`], so
//! request paths never block on disk.
//!
//! ```rust,no_run
//! use decision_log::{EventKind, EventSource, LogEntry, LogSink};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (sink, _handle) = LogSink::start("decisions.jsonl").await?;
//! sink.log(LogEntry::new(
//!     EventKind::EngineStarted,
//!     EventSource::new("vaultgate"),
//!     serde_json::json!({"rules": 12}),
//! ))
//! .await;
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod sink;
pub mod writer;

pub use entry::{DecisionRecord, EventKind, EventSource, LogEntry};
pub use sink::LogSink;
pub use writer::{LogWriteError, LogWriter};
