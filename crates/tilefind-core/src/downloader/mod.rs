//! Sequential tile download executor.
//!
//! Downloads a batch of tasks one file at a time on the calling thread (or on
//! the worker spawned by [`BatchRunner`]), retrying each file up to the
//! policy's attempt cap. Progress goes out as an ordered stream of
//! [`DownloadEvent`]s on an unbounded `std::sync::mpsc` channel.
//!
//! Per file: pending → attempting → succeeded | retry-pending | failed |
//! canceled. Per batch: running → finished | canceled | fatal. A canceled
//! file leaves its partial data on disk.

mod attempt;
mod batch;
mod events;
mod head;

pub use batch::{BatchHandle, BatchRunner};
pub use events::{BatchReport, BatchSummary, DownloadEvent, FileOutcome};

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::config::DownloadConfig;
use crate::control::CancelToken;
use crate::retry::{AttemptError, RetryDecision, RetryPolicy};
use crate::url_model::tile_filename;
use attempt::{run_attempt, AttemptContext, AttemptEnd};

/// One file to fetch: source URL, destination path, display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub dest: PathBuf,
    pub filename: String,
}

impl DownloadTask {
    /// Save `url` to an explicitly chosen file path.
    pub fn to_file(url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        let url = url.into();
        let dest = dest.into();
        let filename = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| tile_filename(&url));
        Self {
            url,
            dest,
            filename,
        }
    }

    /// Save `url` into `folder` under the name derived from the URL.
    pub fn into_folder(url: impl Into<String>, folder: &Path) -> Self {
        let url = url.into();
        let filename = tile_filename(&url);
        Self {
            dest: folder.join(&filename),
            url,
            filename,
        }
    }
}

/// One task per URL, each saved into `folder`.
pub fn plan_folder<'a, I>(urls: I, folder: &Path) -> Vec<DownloadTask>
where
    I: IntoIterator<Item = &'a str>,
{
    urls.into_iter()
        .map(|u| DownloadTask::into_folder(u, folder))
        .collect()
}

/// Per-attempt transfer settings and the retry policy.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub retry: RetryPolicy,
    /// Write/progress chunk size in bytes.
    pub chunk_bytes: usize,
    pub connect_timeout: Duration,
    /// Abort an attempt when no body bytes arrive for this long.
    pub read_timeout: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            chunk_bytes: 1024 * 1024,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&DownloadConfig> for DownloadOptions {
    fn from(cfg: &DownloadConfig) -> Self {
        Self {
            retry: cfg.retry_policy(),
            chunk_bytes: cfg.chunk_bytes.max(1),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            read_timeout: Duration::from_secs(cfg.read_timeout_secs),
        }
    }
}

/// The file path for a one-file batch, otherwise the first file's folder.
pub fn batch_destination(tasks: &[DownloadTask]) -> PathBuf {
    match tasks {
        [] => PathBuf::new(),
        [only] => only.dest.clone(),
        [first, ..] => first
            .dest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    }
}

/// Runs the whole batch and emits the terminal `BatchDone` event.
pub fn run_batch(
    tasks: &[DownloadTask],
    options: &DownloadOptions,
    cancel: &CancelToken,
    events: &Sender<DownloadEvent>,
) -> BatchReport {
    let report = execute(tasks, options, cancel, events);
    let _ = events.send(DownloadEvent::BatchDone(report.clone()));
    report
}

/// Batch loop without the terminal event.
fn execute(
    tasks: &[DownloadTask],
    options: &DownloadOptions,
    cancel: &CancelToken,
    events: &Sender<DownloadEvent>,
) -> BatchReport {
    let total = tasks.len();
    let mut summary = BatchSummary {
        total,
        destination: batch_destination(tasks),
        ..Default::default()
    };
    tracing::info!(files = total, dest = %summary.destination.display(), "download batch started");

    for (i, task) in tasks.iter().enumerate() {
        if cancel.is_canceled() {
            tracing::info!(done = summary.succeeded, failed = summary.failed, "download batch canceled");
            return BatchReport::Canceled(summary);
        }
        let ctx = AttemptContext {
            index: i + 1,
            total,
            task,
            options,
            cancel,
            events,
        };
        match download_file(&ctx) {
            Ok(FileOutcome::Succeeded) => summary.succeeded += 1,
            Ok(FileOutcome::Failed) => summary.failed += 1,
            Ok(FileOutcome::Canceled) => {
                tracing::info!(done = summary.succeeded, failed = summary.failed, "download batch canceled");
                return BatchReport::Canceled(summary);
            }
            Err(e) => {
                tracing::error!(url = %task.url, "download batch aborted: {}", e);
                return BatchReport::Fatal {
                    message: e.to_string(),
                    summary,
                };
            }
        }
    }

    tracing::info!(done = summary.succeeded, failed = summary.failed, "download batch finished");
    BatchReport::Finished(summary)
}

/// Attempts one file until success, exhaustion, cancellation, or a fatal error.
fn download_file(ctx: &AttemptContext<'_>) -> Result<FileOutcome, AttemptError> {
    let policy = &ctx.options.retry;
    let mut attempt = 0u32;
    loop {
        if ctx.cancel.is_canceled() {
            return Ok(FileOutcome::Canceled);
        }
        attempt += 1;
        match run_attempt(ctx) {
            Ok(AttemptEnd::Completed { bytes }) => {
                tracing::info!(url = %ctx.task.url, bytes, attempt, "tile downloaded");
                return Ok(FileOutcome::Succeeded);
            }
            Ok(AttemptEnd::Canceled) => return Ok(FileOutcome::Canceled),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                let will_retry = policy.will_retry(attempt);
                tracing::warn!(url = %ctx.task.url, attempt, will_retry, "download attempt failed: {}", e);
                let _ = ctx.events.send(DownloadEvent::FileError {
                    index: ctx.index,
                    url: ctx.task.url.clone(),
                    name: ctx.task.filename.clone(),
                    message: e.to_string(),
                    attempt,
                    max_attempts: policy.max_attempts,
                    will_retry,
                });
                match policy.decide(attempt) {
                    RetryDecision::NoRetry => return Ok(FileOutcome::Failed),
                    RetryDecision::RetryAfter(delay) => {
                        if !delay.is_zero() {
                            std::thread::sleep(delay);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_tasks_use_url_names() {
        let folder = Path::new("/data/tiles");
        let tasks = plan_folder(
            ["https://h/a/USGS_1.laz", "https://h/a/USGS_2"],
            folder,
        );
        assert_eq!(tasks[0].filename, "USGS_1.laz");
        assert_eq!(tasks[0].dest, folder.join("USGS_1.laz"));
        assert_eq!(tasks[1].filename, "USGS_2.laz");
        assert_eq!(tasks[1].dest, folder.join("USGS_2.laz"));
    }

    #[test]
    fn file_task_uses_chosen_name() {
        let t = DownloadTask::to_file("https://h/a/USGS_1.laz", "/tmp/mine.laz");
        assert_eq!(t.filename, "mine.laz");
        assert_eq!(t.dest, PathBuf::from("/tmp/mine.laz"));
    }

    #[test]
    fn destination_is_file_or_folder() {
        assert_eq!(batch_destination(&[]), PathBuf::new());
        let one = [DownloadTask::to_file("https://h/x.laz", "/out/x.laz")];
        assert_eq!(batch_destination(&one), PathBuf::from("/out/x.laz"));
        let many = plan_folder(["https://h/x.laz", "https://h/y.laz"], Path::new("/out"));
        assert_eq!(batch_destination(&many), PathBuf::from("/out"));
    }

    #[test]
    fn options_from_config() {
        let cfg = DownloadConfig::default();
        let opts = DownloadOptions::from(&cfg);
        assert_eq!(opts.retry.max_attempts, 3);
        assert_eq!(opts.chunk_bytes, 1024 * 1024);
        assert_eq!(opts.connect_timeout, Duration::from_secs(10));
        assert_eq!(opts.read_timeout, Duration::from_secs(60));
    }

    #[test]
    fn empty_batch_finishes_immediately() {
        let (tx, rx) = std::sync::mpsc::channel();
        let report = run_batch(&[], &DownloadOptions::default(), &CancelToken::new(), &tx);
        assert!(matches!(report, BatchReport::Finished(ref s) if s.succeeded == 0 && s.failed == 0));
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events, vec![DownloadEvent::BatchDone(report)]);
    }

    #[test]
    fn canceled_before_start_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = plan_folder(["http://127.0.0.1:9/a.laz"], dir.path());
        let cancel = CancelToken::new();
        cancel.cancel();
        let (tx, rx) = std::sync::mpsc::channel();
        let report = run_batch(&tasks, &DownloadOptions::default(), &cancel, &tx);
        assert!(matches!(report, BatchReport::Canceled(ref s) if s.succeeded == 0 && s.failed == 0));
        assert_eq!(rx.try_iter().count(), 1);
        assert!(!tasks[0].dest.exists());
    }
}
