//! Flat-earth AOI geometry: square bbox around a center point and
//! axis-aligned rectangle intersection.
//!
//! Uses ~69 miles per degree of latitude and ~69·cos(lat) miles per degree
//! of longitude. Good for small AOIs at moderate latitudes; there is no
//! correction for the poles or for boxes crossing the ±180° meridian.

use serde::{Deserialize, Serialize};

use crate::error::{AoiError, Result};

/// Miles per degree of latitude (and of longitude at the equator).
pub const MILES_PER_DEGREE: f64 = 69.0;

/// Axis-aligned rectangle in longitude/latitude degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Closed-interval intersection: boxes sharing only an edge or a corner
    /// intersect; boxes separated on either axis do not.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(self.max_lon < other.min_lon
            || self.min_lon > other.max_lon
            || self.max_lat < other.min_lat
            || self.min_lat > other.max_lat)
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Area in square miles under the same flat approximation used to build
    /// the box (longitude scaled at the center latitude).
    pub fn area_sq_miles(&self) -> f64 {
        let (lat, _) = self.center();
        let height = (self.max_lat - self.min_lat) * MILES_PER_DEGREE;
        let width = (self.max_lon - self.min_lon) * MILES_PER_DEGREE * lat.to_radians().cos();
        height * width
    }
}

/// Square bounding box of `sqmi` square miles centered at (`lat`, `lon`).
pub fn bbox(lat: f64, lon: f64, sqmi: f64) -> Result<BoundingBox> {
    if !sqmi.is_finite() || sqmi <= 0.0 {
        return Err(AoiError::InvalidArgument(format!(
            "sqmi must be > 0 (got {})",
            sqmi
        )));
    }
    if !lat.is_finite() || !lon.is_finite() {
        return Err(AoiError::InvalidArgument(format!(
            "coordinates must be finite (got lat {}, lon {})",
            lat, lon
        )));
    }
    if lat.abs() > 90.0 {
        return Err(AoiError::InvalidArgument(format!(
            "latitude must be within [-90, 90] (got {})",
            lat
        )));
    }
    if lon.abs() > 180.0 {
        return Err(AoiError::InvalidArgument(format!(
            "longitude must be within [-180, 180] (got {})",
            lon
        )));
    }

    let miles_per_deg_lon = MILES_PER_DEGREE * lat.to_radians().cos();
    // cos(90°) is ~6e-17 in floating point, not zero.
    if lat.abs() >= 90.0 || miles_per_deg_lon <= f64::EPSILON {
        return Err(AoiError::DegenerateGeometry { lat });
    }

    let half_side = sqmi.sqrt() / 2.0;
    let dlat = half_side / MILES_PER_DEGREE;
    let dlon = half_side / miles_per_deg_lon;

    Ok(BoundingBox {
        min_lon: lon - dlon,
        min_lat: lat - dlat,
        max_lon: lon + dlon,
        max_lat: lat + dlat,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dallas_example() {
        let b = bbox(32.7767, -96.7970, 6.0).unwrap();
        assert!((b.min_lon - -96.8181).abs() < 1e-4, "min_lon {}", b.min_lon);
        assert!((b.min_lat - 32.7590).abs() < 1e-4, "min_lat {}", b.min_lat);
        assert!((b.max_lon - -96.7759).abs() < 1e-4, "max_lon {}", b.max_lon);
        assert!((b.max_lat - 32.7945).abs() < 1e-4, "max_lat {}", b.max_lat);
    }

    #[test]
    fn ordered_and_area_preserved() {
        for &(lat, lon, sqmi) in &[
            (0.0, 0.0, 1.0),
            (37.1, -92.6, 6.0),
            (-45.0, 170.0, 0.25),
            (89.0, 10.0, 100.0),
            (-89.5, -179.0, 2.0),
        ] {
            let b = bbox(lat, lon, sqmi).unwrap();
            assert!(b.min_lon <= b.max_lon);
            assert!(b.min_lat <= b.max_lat);
            let area = b.area_sq_miles();
            assert!(
                (area - sqmi).abs() < 1e-6 * sqmi.max(1.0),
                "area {} != {} at lat {}",
                area,
                sqmi,
                lat
            );
        }
    }

    #[test]
    fn poles_are_degenerate() {
        assert!(matches!(
            bbox(90.0, 0.0, 1.0),
            Err(AoiError::DegenerateGeometry { .. })
        ));
        assert!(matches!(
            bbox(-90.0, 45.0, 1.0),
            Err(AoiError::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn non_positive_area_is_invalid() {
        assert!(matches!(bbox(10.0, 10.0, 0.0), Err(AoiError::InvalidArgument(_))));
        assert!(matches!(bbox(10.0, 10.0, -3.0), Err(AoiError::InvalidArgument(_))));
        assert!(matches!(bbox(90.0, 10.0, 0.0), Err(AoiError::InvalidArgument(_))));
        assert!(matches!(
            bbox(10.0, 10.0, f64::NAN),
            Err(AoiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn out_of_range_coordinates_are_invalid() {
        assert!(matches!(bbox(91.0, 0.0, 1.0), Err(AoiError::InvalidArgument(_))));
        assert!(matches!(bbox(0.0, -181.0, 1.0), Err(AoiError::InvalidArgument(_))));
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let edge = BoundingBox::new(1.0, 0.0, 2.0, 1.0);
        let corner = BoundingBox::new(1.0, 1.0, 2.0, 2.0);
        assert!(a.intersects(&edge));
        assert!(edge.intersects(&a));
        assert!(a.intersects(&corner));
    }

    #[test]
    fn separated_boxes_do_not_intersect() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(!a.intersects(&BoundingBox::new(1.5, 0.0, 2.0, 1.0)));
        assert!(!a.intersects(&BoundingBox::new(-2.0, 0.0, -0.5, 1.0)));
        assert!(!a.intersects(&BoundingBox::new(0.0, 1.01, 1.0, 2.0)));
        assert!(!a.intersects(&BoundingBox::new(0.0, -2.0, 1.0, -0.01)));
    }

    #[test]
    fn contained_box_intersects() {
        let outer = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
        let inner = BoundingBox::new(-0.1, -0.1, 0.1, 0.1);
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }
}
