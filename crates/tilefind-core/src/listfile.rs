//! Download list artifact: one URL per line, each newline-terminated.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `urls` to `path` (created or truncated), UTF-8, no header.
pub fn write_download_list<'a, I>(urls: I, path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let file = File::create(path)
        .with_context(|| format!("failed to create download list {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let mut count = 0;
    for url in urls {
        writeln!(out, "{}", url)?;
        count += 1;
    }
    out.flush()
        .with_context(|| format!("failed to write download list {}", path.display()))?;
    tracing::info!(urls = count, path = %path.display(), "wrote download list");
    Ok(count)
}
