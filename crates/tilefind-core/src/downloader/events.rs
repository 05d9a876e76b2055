//! Progress events emitted by the download worker, in order.

use std::path::PathBuf;

/// One event on the worker → consumer channel. Consumers must handle them in
/// emission order; exactly one `BatchDone` ends the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    /// An attempt's response was accepted; the per-file byte counter restarts.
    FileStarted {
        /// 1-based position in the batch.
        index: usize,
        total: usize,
        name: String,
        /// `Content-Length`, when present and numeric.
        total_bytes: Option<u64>,
    },
    /// A chunk was written to the destination file.
    ChunkReceived { bytes: usize },
    /// An attempt failed.
    FileError {
        index: usize,
        url: String,
        name: String,
        message: String,
        attempt: u32,
        max_attempts: u32,
        will_retry: bool,
    },
    /// Terminal event.
    BatchDone(BatchReport),
}

impl DownloadEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadEvent::BatchDone(_))
    }
}

/// Per-file result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Succeeded,
    /// Every attempt failed.
    Failed,
    /// Cancellation was observed before the file completed.
    Canceled,
}

/// Counts for a batch, complete or partial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Number of tasks in the batch.
    pub total: usize,
    /// The file path for a one-file batch, otherwise the containing folder.
    pub destination: PathBuf,
}

/// How a batch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchReport {
    Finished(BatchSummary),
    Canceled(BatchSummary),
    /// Aborted by an error outside the per-file retry loop.
    Fatal {
        message: String,
        summary: BatchSummary,
    },
}

impl BatchReport {
    pub fn summary(&self) -> &BatchSummary {
        match self {
            BatchReport::Finished(s) | BatchReport::Canceled(s) => s,
            BatchReport::Fatal { summary, .. } => summary,
        }
    }
}
