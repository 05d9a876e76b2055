//! Response header lines collected during a transfer.

/// Header lines of the most recent response block. A new status line (after
/// a redirect) discards the previous block.
#[derive(Debug, Default)]
pub(super) struct ResponseHead {
    lines: Vec<String>,
}

impl ResponseHead {
    pub(super) fn push_line(&mut self, data: &[u8]) {
        let line = String::from_utf8_lossy(data).trim_end().to_string();
        if line.starts_with("HTTP/") {
            self.lines.clear();
        }
        if !line.is_empty() {
            self.lines.push(line);
        }
    }

    /// Status code from the block's status line (`HTTP/1.1 200 OK`, `HTTP/2 404`).
    pub(super) fn status(&self) -> Option<u32> {
        let status_line = self.lines.first().filter(|l| l.starts_with("HTTP/"))?;
        status_line.split_whitespace().nth(1)?.parse().ok()
    }

    /// `Content-Length`, when present and numeric.
    pub(super) fn content_length(&self) -> Option<u64> {
        self.lines.iter().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse::<u64>().ok()
            } else {
                None
            }
        })
    }
}
