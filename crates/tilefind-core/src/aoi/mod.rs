//! AOI resolver: center point + square-mile area → bbox → catalog query →
//! filtered, deduplicated, sorted tile list.
//!
//! The catalog already filters by intersection server-side; the resolver
//! repeats the rectangle test on each item's declared bbox before
//! extracting tiles.

mod filter;
mod geometry;
mod tiles;

pub use filter::{build_spatial_filter, wkt_polygon};
pub use geometry::{bbox, BoundingBox, MILES_PER_DEGREE};
pub use tiles::{
    extract_tiles, filter_to_aoi, guess_flight_date, has_tile_suffix, tile_id_from_url, Tile,
    TILE_SUFFIX,
};

use std::fmt;

use crate::catalog::CatalogClient;
use crate::error::Result;

/// Result of resolving one AOI.
#[derive(Debug, Clone)]
pub struct AoiQuery {
    pub bbox: BoundingBox,
    pub tiles: Vec<Tile>,
}

impl AoiQuery {
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.tiles.iter().map(|t| t.url.as_str())
    }
}

impl fmt::Display for AoiQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AOI bbox:")?;
        writeln!(
            f,
            "  min_lon: {:.6}, min_lat: {:.6}",
            self.bbox.min_lon, self.bbox.min_lat
        )?;
        writeln!(
            f,
            "  max_lon: {:.6}, max_lat: {:.6}",
            self.bbox.max_lon, self.bbox.max_lat
        )?;
        write!(f, "Tiles found: {}", self.tiles.len())
    }
}

/// Resolves an AOI into the tiles intersecting it.
pub fn query_aoi(
    client: &CatalogClient,
    lat: f64,
    lon: f64,
    sqmi: f64,
    max_items: u32,
) -> Result<AoiQuery> {
    let aoi = bbox(lat, lon, sqmi)?;
    tracing::info!(
        lat,
        lon,
        sqmi,
        min_lon = aoi.min_lon,
        min_lat = aoi.min_lat,
        max_lon = aoi.max_lon,
        max_lat = aoi.max_lat,
        "resolving AOI"
    );

    let filter = build_spatial_filter(&aoi);
    let items = client.query(&filter, max_items)?;
    let items = filter_to_aoi(items, &aoi);
    let tiles = extract_tiles(&items);
    tracing::info!(tiles = tiles.len(), "AOI resolved");

    Ok(AoiQuery { bbox: aoi, tiles })
}
