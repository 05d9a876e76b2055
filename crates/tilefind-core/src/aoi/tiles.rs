//! Client-side AOI filtering and tile extraction from catalog items.

use std::collections::HashSet;

use serde::Serialize;

use super::geometry::BoundingBox;
use crate::catalog::{CatalogItem, DateRecord};

/// Point-cloud tile file suffix, matched case-insensitively.
pub const TILE_SUFFIX: &str = ".laz";

/// Date labels that indicate when the data was flown.
const FLIGHT_DATE_HINTS: [&str; 3] = ["acquisition", "ground", "flight"];

/// One downloadable point-cloud file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    /// Filename of the URL without the `.laz` suffix.
    pub id: String,
    pub url: String,
    /// The declaring item's box, when the catalog gave all four values.
    pub bbox: Option<BoundingBox>,
    /// Free-text date, possibly empty.
    pub flight_date: String,
}

/// Keeps items whose declared bbox intersects `aoi`. Items without a
/// complete bbox are dropped.
pub fn filter_to_aoi(items: Vec<CatalogItem>, aoi: &BoundingBox) -> Vec<CatalogItem> {
    let before = items.len();
    let kept: Vec<CatalogItem> = items
        .into_iter()
        .filter(|item| item.bounding_box().is_some_and(|b| b.intersects(aoi)))
        .collect();
    tracing::debug!(before, after = kept.len(), "filtered catalog items to AOI");
    kept
}

/// Flattens item links into tiles: `.laz` links only, deduplicated by URL
/// (first occurrence wins), sorted by id.
pub fn extract_tiles(items: &[CatalogItem]) -> Vec<Tile> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut tiles = Vec::new();

    for item in items {
        let bbox = item.bounding_box();
        let flight_date = guess_flight_date(item.date_records());
        for uri in item.link_uris() {
            if !has_tile_suffix(uri) || !seen.insert(uri) {
                continue;
            }
            tiles.push(Tile {
                id: tile_id_from_url(uri),
                url: uri.to_string(),
                bbox,
                flight_date: flight_date.clone(),
            });
        }
    }

    tiles.sort_by(|a, b| a.id.cmp(&b.id));
    tiles
}

/// First date whose label mentions acquisition/ground/flight, else the first
/// non-empty date, else `""`.
pub fn guess_flight_date(dates: &[DateRecord]) -> String {
    let hinted = dates.iter().find_map(|d| {
        let value = d.value()?;
        let label = d.label().to_lowercase();
        FLIGHT_DATE_HINTS
            .iter()
            .any(|hint| label.contains(hint))
            .then_some(value)
    });
    hinted
        .or_else(|| dates.iter().find_map(DateRecord::value))
        .unwrap_or("")
        .to_string()
}

/// Final path segment of `url` with the tile suffix stripped.
pub fn tile_id_from_url(url: &str) -> String {
    let name = url.rsplit('/').next().unwrap_or(url);
    if has_tile_suffix(name) {
        name[..name.len() - TILE_SUFFIX.len()].to_string()
    } else {
        name.to_string()
    }
}

pub fn has_tile_suffix(s: &str) -> bool {
    s.len() >= TILE_SUFFIX.len()
        && s.is_char_boundary(s.len() - TILE_SUFFIX.len())
        && s[s.len() - TILE_SUFFIX.len()..].eq_ignore_ascii_case(TILE_SUFFIX)
}
