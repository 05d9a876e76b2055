//! Spatial query filter in the catalog's ad-hoc query grammar.

use super::geometry::BoundingBox;

/// Closed rectangle as a WKT polygon, (lon lat) point order, first vertex
/// repeated as the last.
pub fn wkt_polygon(b: &BoundingBox) -> String {
    let ring = [
        (b.min_lon, b.min_lat),
        (b.min_lon, b.max_lat),
        (b.max_lon, b.max_lat),
        (b.max_lon, b.min_lat),
        (b.min_lon, b.min_lat),
    ];
    let coords: Vec<String> = ring.iter().map(|(x, y)| format!("{} {}", x, y)).collect();
    format!("POLYGON(({}))", coords.join(","))
}

/// `spatialQuery={wkt:"POLYGON((...))",relation:intersects}`
pub fn build_spatial_filter(b: &BoundingBox) -> String {
    format!(
        "spatialQuery={{wkt:\"{}\",relation:intersects}}",
        wkt_polygon(b)
    )
}
