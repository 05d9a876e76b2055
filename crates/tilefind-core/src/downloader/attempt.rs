//! One streaming GET attempt for one tile.
//!
//! Body bytes are regrouped into fixed-size chunks: each full chunk is
//! written to the destination file and reported as `ChunkReceived`. The
//! cancel token is checked on every write callback; returning a short count
//! from the callback makes libcurl abort the transfer.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Write;
use std::sync::mpsc::Sender;

use super::events::DownloadEvent;
use super::head::ResponseHead;
use super::{DownloadOptions, DownloadTask};
use crate::control::CancelToken;
use crate::retry::AttemptError;

/// How a transfer that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AttemptEnd {
    Completed { bytes: u64 },
    Canceled,
}

/// Everything an attempt needs from the batch loop.
pub(super) struct AttemptContext<'a> {
    pub(super) index: usize,
    pub(super) total: usize,
    pub(super) task: &'a DownloadTask,
    pub(super) options: &'a DownloadOptions,
    pub(super) cancel: &'a CancelToken,
    pub(super) events: &'a Sender<DownloadEvent>,
}

/// Mutable state shared by the header and write callbacks.
struct AttemptState<'a> {
    ctx: &'a AttemptContext<'a>,
    head: ResponseHead,
    file: Option<File>,
    buf: Vec<u8>,
    written: u64,
    failure: Option<AttemptError>,
    canceled: bool,
}

impl<'a> AttemptState<'a> {
    fn new(ctx: &'a AttemptContext<'a>) -> Self {
        Self {
            ctx,
            head: ResponseHead::default(),
            file: None,
            buf: Vec::with_capacity(ctx.options.chunk_bytes),
            written: 0,
            failure: None,
            canceled: false,
        }
    }

    /// Write callback body. Returns the number of bytes consumed; anything
    /// short of `data.len()` aborts the transfer.
    fn accept(&mut self, data: &[u8]) -> usize {
        if self.ctx.cancel.is_canceled() {
            self.canceled = true;
            return 0;
        }
        if self.file.is_none() {
            if let Some(code) = self.head.status().filter(|c| !(200..300).contains(c)) {
                self.failure = Some(AttemptError::Http(code));
                return 0;
            }
            if let Err(e) = self.begin() {
                self.failure = Some(e);
                return 0;
            }
        }

        let chunk = self.ctx.options.chunk_bytes.max(1);
        let mut rest = data;
        while !rest.is_empty() {
            let take = (chunk - self.buf.len()).min(rest.len());
            self.buf.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            if self.buf.len() == chunk {
                if let Err(e) = self.flush_chunk() {
                    self.failure = Some(AttemptError::Storage(e));
                    return 0;
                }
            }
        }
        data.len()
    }

    /// Response accepted: create the destination, announce the file.
    fn begin(&mut self) -> Result<(), AttemptError> {
        let ctx = self.ctx;
        let dest = &ctx.task.dest;
        if let Some(dir) = dest.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| AttemptError::Destination {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let file = File::create(dest).map_err(AttemptError::Storage)?;
        self.file = Some(file);

        let total_bytes = self.head.content_length();
        tracing::debug!(
            url = %ctx.task.url,
            dest = %dest.display(),
            total_bytes = ?total_bytes,
            "receiving tile"
        );
        let _ = ctx.events.send(DownloadEvent::FileStarted {
            index: ctx.index,
            total: ctx.total,
            name: ctx.task.filename.clone(),
            total_bytes,
        });
        Ok(())
    }

    fn flush_chunk(&mut self) -> std::io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        if let Some(file) = self.file.as_mut() {
            file.write_all(&self.buf)?;
        }
        self.written += self.buf.len() as u64;
        let _ = self.ctx.events.send(DownloadEvent::ChunkReceived {
            bytes: self.buf.len(),
        });
        self.buf.clear();
        Ok(())
    }

    /// Transfer finished cleanly: write the short tail chunk and close.
    fn finish(mut self) -> Result<u64, AttemptError> {
        if self.file.is_none() {
            // Empty body: no write callback ran.
            self.begin()?;
        }
        self.flush_chunk().map_err(AttemptError::Storage)?;
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(AttemptError::Storage)?;
        }
        Ok(self.written)
    }
}

/// Runs one GET for `ctx.task`, streaming into its destination.
pub(super) fn run_attempt(ctx: &AttemptContext<'_>) -> Result<AttemptEnd, AttemptError> {
    let state = RefCell::new(AttemptState::new(ctx));

    let mut easy = curl::easy::Easy::new();
    easy.url(&ctx.task.url).map_err(AttemptError::Curl)?;
    easy.follow_location(true).map_err(AttemptError::Curl)?;
    easy.max_redirections(10).map_err(AttemptError::Curl)?;
    easy.connect_timeout(ctx.options.connect_timeout)
        .map_err(AttemptError::Curl)?;
    // Read timeout: abort when the body stalls (under 1 B/s) for this long.
    easy.low_speed_limit(1).map_err(AttemptError::Curl)?;
    easy.low_speed_time(ctx.options.read_timeout)
        .map_err(AttemptError::Curl)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|line| {
                state.borrow_mut().head.push_line(line);
                true
            })
            .map_err(AttemptError::Curl)?;
        transfer
            .write_function(|data| Ok(state.borrow_mut().accept(data)))
            .map_err(AttemptError::Curl)?;

        if let Err(e) = transfer.perform() {
            let mut st = state.borrow_mut();
            if e.is_write_error() {
                if st.canceled {
                    return Ok(AttemptEnd::Canceled);
                }
                if let Some(failure) = st.failure.take() {
                    return Err(failure);
                }
            }
            return Err(AttemptError::Curl(e));
        }
    }

    let code = easy.response_code().map_err(AttemptError::Curl)?;
    if !(200..300).contains(&code) {
        return Err(AttemptError::Http(code));
    }

    let bytes = state.into_inner().finish()?;
    Ok(AttemptEnd::Completed { bytes })
}
