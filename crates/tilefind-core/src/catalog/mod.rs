//! Catalog access: one synchronous GET against the ScienceBase item search,
//! scoped to the LiDAR Point Cloud collection.
//!
//! Uses the curl crate (libcurl). Errors are surfaced once; the caller
//! decides whether to query again.

mod schema;

pub use schema::{parse_items, CatalogItem, DateRecord, RawBoundingBox, Spatial, WebLink};

use std::time::Duration;

use crate::config::CatalogConfig;
use crate::error::{AoiError, Result};

/// ScienceBase item search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://www.sciencebase.gov/catalog/items";

/// USGS Lidar Point Cloud parent collection on ScienceBase.
pub const DEFAULT_PARENT_ID: &str = "4f70ab64e4b058caae3f8def";

/// Maximum number of items requested per query.
pub const DEFAULT_MAX_ITEMS: u32 = 1000;

/// Only the fields the resolver reads.
const FIELDS: &str = "webLinks,spatial,dates";

#[derive(Debug, Clone)]
pub struct CatalogClient {
    endpoint: String,
    parent_id: String,
    connect_timeout: Duration,
    timeout: Duration,
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_PARENT_ID)
    }
}

impl CatalogClient {
    pub fn new(endpoint: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            parent_id: parent_id.into(),
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(cfg: &CatalogConfig) -> Self {
        Self::new(cfg.endpoint.clone(), cfg.parent_id.clone()).with_timeouts(
            Duration::from_secs(cfg.connect_timeout_secs),
            Duration::from_secs(cfg.timeout_secs),
        )
    }

    pub fn with_timeouts(mut self, connect: Duration, total: Duration) -> Self {
        self.connect_timeout = connect;
        self.timeout = total;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full request URL with encoded query parameters.
    pub fn query_url(&self, spatial_filter: &str, max_items: u32) -> Result<url::Url> {
        let max = max_items.to_string();
        url::Url::parse_with_params(
            &self.endpoint,
            &[
                ("q", ""),
                ("format", "json"),
                ("parentId", self.parent_id.as_str()),
                ("filter", spatial_filter),
                ("fields", FIELDS),
                ("max", max.as_str()),
            ],
        )
        .map_err(|e| {
            AoiError::CatalogUnavailable(format!("invalid catalog endpoint {}: {}", self.endpoint, e))
        })
    }

    /// Fetches items matching `spatial_filter`.
    ///
    /// Runs in the current thread and blocks until the response is read.
    pub fn query(&self, spatial_filter: &str, max_items: u32) -> Result<Vec<CatalogItem>> {
        let url = self.query_url(spatial_filter, max_items)?;
        tracing::debug!(url = %url, "querying catalog");

        let mut body: Vec<u8> = Vec::new();
        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str()).map_err(unavailable)?;
        easy.follow_location(true).map_err(unavailable)?;
        easy.connect_timeout(self.connect_timeout).map_err(unavailable)?;
        easy.timeout(self.timeout).map_err(unavailable)?;

        let mut headers = curl::easy::List::new();
        headers.append("Accept: application/json").map_err(unavailable)?;
        easy.http_headers(headers).map_err(unavailable)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(unavailable)?;
            transfer.perform().map_err(unavailable)?;
        }

        let code = easy.response_code().map_err(unavailable)?;
        if !(200..300).contains(&code) {
            return Err(AoiError::CatalogUnavailable(format!(
                "GET {} returned HTTP {}",
                self.endpoint, code
            )));
        }

        let items = parse_items(&body)?;
        tracing::info!(items = items.len(), bytes = body.len(), "catalog query complete");
        Ok(items)
    }
}

fn unavailable(e: curl::Error) -> AoiError {
    AoiError::CatalogUnavailable(e.to_string())
}
