//! Runs a download batch on the background worker and renders its events.

use anyhow::{bail, Result};
use std::io::Write;
use std::thread;
use std::time::Duration;

use tilefind_core::downloader::{BatchReport, BatchRunner, DownloadEvent, DownloadOptions, DownloadTask};
use tilefind_core::progress::FileProgress;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Downloads `tasks`, printing per-file progress to stderr. Ctrl-C cancels
/// the batch cooperatively. Per-file failures and cancellation are reported
/// but are not errors; a fatal batch error is.
pub fn download_with_progress(tasks: Vec<DownloadTask>, options: DownloadOptions) -> Result<()> {
    let runner = BatchRunner::new(options);
    let handle = runner.start(tasks)?;

    let token = handle.cancel_token();
    if let Err(e) = ctrlc::set_handler(move || token.cancel()) {
        tracing::warn!("could not install Ctrl-C handler: {}", e);
    }

    let mut progress = FileProgress::default();
    let mut line_open = false;
    'poll: loop {
        let mut changed = false;
        for event in handle.poll() {
            match &event {
                DownloadEvent::FileStarted { .. } => {
                    end_line(&mut line_open);
                    progress.apply(&event);
                    eprintln!("{}", file_header(&progress));
                    changed = true;
                }
                DownloadEvent::ChunkReceived { .. } => {
                    changed |= progress.apply(&event);
                }
                DownloadEvent::FileError {
                    name,
                    message,
                    attempt,
                    max_attempts,
                    will_retry,
                    ..
                } => {
                    end_line(&mut line_open);
                    let next = if *will_retry { ", retrying" } else { "" };
                    eprintln!(
                        "  {}: attempt {}/{} failed: {}{}",
                        name, attempt, max_attempts, message, next
                    );
                }
                DownloadEvent::BatchDone(_) => {
                    if changed {
                        render(&progress, &mut line_open);
                    }
                    end_line(&mut line_open);
                    break 'poll;
                }
            }
        }
        if changed {
            render(&progress, &mut line_open);
        }
        thread::sleep(POLL_INTERVAL);
    }

    let report = handle.join();
    println!("{}", batch_summary(&report));
    if let BatchReport::Fatal { message, .. } = &report {
        bail!("download batch aborted: {}", message);
    }
    Ok(())
}

fn render(progress: &FileProgress, line_open: &mut bool) {
    eprint!("\r{}", progress_line(progress));
    let _ = std::io::stderr().flush();
    *line_open = true;
}

fn end_line(line_open: &mut bool) {
    if *line_open {
        eprintln!();
        *line_open = false;
    }
}

fn mib(bytes: u64) -> f64 {
    bytes as f64 / 1_048_576.0
}

pub fn file_header(p: &FileProgress) -> String {
    let size = p
        .total_bytes
        .map(|b| format!("{:.1} MiB", mib(b)))
        .unwrap_or_else(|| "size unknown".to_string());
    format!("[{}/{}] {} ({})", p.index, p.total_files, p.name, size)
}

pub fn progress_line(p: &FileProgress) -> String {
    let rate = mib(p.bytes_per_sec() as u64);
    match (p.fraction(), p.total_bytes) {
        (Some(fraction), Some(total)) => format!(
            "  {:.1} / {:.1} MiB ({:.1}%)  {:.2} MiB/s  ",
            mib(p.downloaded),
            mib(total),
            fraction * 100.0,
            rate
        ),
        _ => format!("  {:.1} MiB  {:.2} MiB/s  ", mib(p.downloaded), rate),
    }
}

pub fn batch_summary(report: &BatchReport) -> String {
    let s = report.summary();
    let dest = s.destination.display();
    match report {
        BatchReport::Finished(_) if s.failed == 0 => {
            format!("Downloaded {} of {} tile(s) to {}", s.succeeded, s.total, dest)
        }
        BatchReport::Finished(_) => format!(
            "Downloaded {} of {} tile(s) to {}; {} failed",
            s.succeeded, s.total, dest, s.failed
        ),
        BatchReport::Canceled(_) => format!(
            "Download canceled: {} of {} tile(s) downloaded, {} failed",
            s.succeeded, s.total, s.failed
        ),
        BatchReport::Fatal { message, .. } => format!(
            "Download aborted after {} of {} tile(s): {}",
            s.succeeded, s.total, message
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tilefind_core::downloader::BatchSummary;

    fn summary(succeeded: usize, failed: usize, total: usize) -> BatchSummary {
        BatchSummary {
            succeeded,
            failed,
            total,
            destination: PathBuf::from("/data/tiles"),
        }
    }

    #[test]
    fn summary_wording() {
        assert_eq!(
            batch_summary(&BatchReport::Finished(summary(3, 0, 3))),
            "Downloaded 3 of 3 tile(s) to /data/tiles"
        );
        assert_eq!(
            batch_summary(&BatchReport::Finished(summary(2, 1, 3))),
            "Downloaded 2 of 3 tile(s) to /data/tiles; 1 failed"
        );
        assert_eq!(
            batch_summary(&BatchReport::Canceled(summary(1, 0, 3))),
            "Download canceled: 1 of 3 tile(s) downloaded, 0 failed"
        );
        let fatal = BatchReport::Fatal {
            message: "cannot create /x: Not a directory".into(),
            summary: summary(0, 0, 2),
        };
        assert_eq!(
            batch_summary(&fatal),
            "Download aborted after 0 of 2 tile(s): cannot create /x: Not a directory"
        );
    }

    #[test]
    fn header_shows_size_or_unknown() {
        let mut p = FileProgress::default();
        p.apply(&DownloadEvent::FileStarted {
            index: 1,
            total: 2,
            name: "USGS_1.laz".into(),
            total_bytes: Some(3 * 1_048_576),
        });
        assert_eq!(file_header(&p), "[1/2] USGS_1.laz (3.0 MiB)");
        p.apply(&DownloadEvent::FileStarted {
            index: 2,
            total: 2,
            name: "USGS_2.laz".into(),
            total_bytes: None,
        });
        assert_eq!(file_header(&p), "[2/2] USGS_2.laz (size unknown)");
    }

    #[test]
    fn progress_line_percent_when_total_known() {
        let mut p = FileProgress::default();
        p.apply(&DownloadEvent::FileStarted {
            index: 1,
            total: 1,
            name: "a.laz".into(),
            total_bytes: Some(4 * 1_048_576),
        });
        p.apply(&DownloadEvent::ChunkReceived { bytes: 1_048_576 });
        assert!(progress_line(&p).contains("1.0 / 4.0 MiB (25.0%)"));

        p.total_bytes = None;
        let line = progress_line(&p);
        assert!(line.contains("1.0 MiB"));
        assert!(!line.contains('%'));
    }
}
