//! Consumer-side progress for the file currently downloading.
//!
//! Folds [`DownloadEvent`]s in emission order; rate = bytes / elapsed and
//! fraction = downloaded / total when the total is known.

use std::time::Instant;

use crate::downloader::DownloadEvent;

#[derive(Debug, Clone)]
pub struct FileProgress {
    /// 1-based index of the current file.
    pub index: usize,
    pub total_files: usize,
    pub name: String,
    /// `None` when the server gave no usable `Content-Length`.
    pub total_bytes: Option<u64>,
    pub downloaded: u64,
    started: Instant,
}

impl Default for FileProgress {
    fn default() -> Self {
        Self {
            index: 0,
            total_files: 0,
            name: String::new(),
            total_bytes: None,
            downloaded: 0,
            started: Instant::now(),
        }
    }
}

impl FileProgress {
    /// Updates from one event. Returns true when the event changed progress.
    pub fn apply(&mut self, event: &DownloadEvent) -> bool {
        match event {
            DownloadEvent::FileStarted {
                index,
                total,
                name,
                total_bytes,
            } => {
                *self = FileProgress {
                    index: *index,
                    total_files: *total,
                    name: name.clone(),
                    total_bytes: *total_bytes,
                    downloaded: 0,
                    started: Instant::now(),
                };
                true
            }
            DownloadEvent::ChunkReceived { bytes } => {
                self.downloaded += *bytes as u64;
                true
            }
            DownloadEvent::FileError { .. } | DownloadEvent::BatchDone(_) => false,
        }
    }

    /// Fraction complete in [0.0, 1.0], or `None` when the total is unknown
    /// (render an indeterminate indicator).
    pub fn fraction(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(1.0),
            Some(total) => Some((self.downloaded as f64 / total as f64).min(1.0)),
            None => None,
        }
    }

    /// Bytes per second since the file (re)started (0 if no time has passed).
    pub fn bytes_per_sec(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.downloaded as f64 / elapsed
    }
}
