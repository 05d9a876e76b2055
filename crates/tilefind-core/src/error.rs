//! Error types for AOI resolution and catalog queries.

use thiserror::Error;

/// Errors raised while turning an AOI into a tile list.
#[derive(Debug, Error)]
pub enum AoiError {
    /// Non-positive area, non-finite input, or coordinates out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Longitude scaling collapses at the given latitude (|lat| = 90).
    #[error("longitude scaling is zero at latitude {lat}; choose a latitude away from the poles")]
    DegenerateGeometry {
        /// Requested center latitude.
        lat: f64,
    },

    /// Network or HTTP failure talking to the catalog.
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// The catalog answered with something that is not an item list.
    #[error("unexpected catalog response: {0}")]
    CatalogResponseMalformed(String),
}

impl AoiError {
    /// True for errors caused by the caller's geometry input (CLI exit code 1).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AoiError::InvalidArgument(_) | AoiError::DegenerateGeometry { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AoiError>;
