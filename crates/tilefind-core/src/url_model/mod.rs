//! Local filenames for downloaded tiles.
//!
//! The name comes from the last URL path segment, sanitized, with the tile
//! suffix forced when the server-side name lacks it.

mod sanitize;

pub use sanitize::sanitize_filename;

use crate::aoi::{has_tile_suffix, TILE_SUFFIX};

/// Stem used when the URL yields no usable name.
const DEFAULT_STEM: &str = "tile";

/// Last non-empty path segment of `url` (query and fragment ignored).
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Filename for saving the tile at `url`, always ending in `.laz`.
///
/// - `tile_filename("https://h/a/USGS_x1.laz")` → `"USGS_x1.laz"`
/// - `tile_filename("https://h/a/USGS_x1")` → `"USGS_x1.laz"`
pub fn tile_filename(url: &str) -> String {
    let stem = filename_from_url_path(url)
        .map(|raw| sanitize_filename(&raw))
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .unwrap_or_else(|| DEFAULT_STEM.to_string());
    if has_tile_suffix(&stem) {
        stem
    } else {
        format!("{}{}", stem, TILE_SUFFIX)
    }
}
