//! Background batch worker and the consumer-side handle.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

use super::events::{BatchReport, BatchSummary, DownloadEvent};
use super::{batch_destination, execute, DownloadOptions, DownloadTask};
use crate::control::{BatchBusy, BatchSlot, CancelToken};

/// Starts download batches on a background thread, one at a time.
#[derive(Debug, Default)]
pub struct BatchRunner {
    slot: BatchSlot,
    options: DownloadOptions,
}

impl BatchRunner {
    pub fn new(options: DownloadOptions) -> Self {
        Self {
            slot: BatchSlot::new(),
            options,
        }
    }

    /// True while a started batch has not yet emitted its terminal event.
    pub fn is_busy(&self) -> bool {
        self.slot.is_active()
    }

    /// Spawns the worker for `tasks`. Fails with `BatchBusy` while a previous
    /// batch is still running.
    pub fn start(&self, tasks: Vec<DownloadTask>) -> Result<BatchHandle, BatchBusy> {
        let guard = self.slot.acquire()?;
        let (tx, rx) = mpsc::channel();
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let options = self.options.clone();
        let total = tasks.len();
        let destination = batch_destination(&tasks);

        let worker = std::thread::spawn(move || {
            let report = execute(&tasks, &options, &worker_cancel, &tx);
            // Free the slot before the terminal event so the consumer can
            // start the next batch as soon as it sees it.
            drop(guard);
            let _ = tx.send(DownloadEvent::BatchDone(report.clone()));
            report
        });

        Ok(BatchHandle {
            events: rx,
            cancel,
            worker,
            total,
            destination_hint: destination,
        })
    }
}

/// Consumer side of a running batch.
pub struct BatchHandle {
    events: Receiver<DownloadEvent>,
    cancel: CancelToken,
    worker: JoinHandle<BatchReport>,
    total: usize,
    destination_hint: std::path::PathBuf,
}

impl BatchHandle {
    /// Requests cooperative cancellation; takes effect at the next attempt or
    /// body write.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Drains every event available right now, in emission order.
    pub fn poll(&self) -> Vec<DownloadEvent> {
        self.events.try_iter().collect()
    }

    /// Waits up to `timeout` for the next event. `None` on timeout or once
    /// the worker has exited and the channel is empty.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<DownloadEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Waits for the worker and returns its report. Events not yet polled
    /// are discarded.
    pub fn join(self) -> BatchReport {
        let BatchHandle {
            worker,
            total,
            destination_hint,
            ..
        } = self;
        worker.join().unwrap_or_else(|_| BatchReport::Fatal {
            message: "download worker panicked".to_string(),
            summary: BatchSummary {
                total,
                destination: destination_hint,
                ..Default::default()
            },
        })
    }
}
