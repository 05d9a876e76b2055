//! Catalog response schema. Every field is optional: catalog metadata is
//! partial and items missing what we need are skipped downstream.

use serde::Deserialize;

use crate::aoi::BoundingBox;
use crate::error::{AoiError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "webLinks")]
    pub web_links: Option<Vec<WebLink>>,
    #[serde(default)]
    pub spatial: Option<Spatial>,
    #[serde(default)]
    pub dates: Option<Vec<DateRecord>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebLink {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default, rename = "type")]
    pub link_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Spatial {
    #[serde(default, rename = "boundingBox")]
    pub bounding_box: Option<RawBoundingBox>,
}

/// Bounding box as the catalog spells it (`minX` = min longitude, ...).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawBoundingBox {
    #[serde(default, rename = "minX")]
    pub min_x: Option<f64>,
    #[serde(default, rename = "minY")]
    pub min_y: Option<f64>,
    #[serde(default, rename = "maxX")]
    pub max_x: Option<f64>,
    #[serde(default, rename = "maxY")]
    pub max_y: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRecord {
    #[serde(default, rename = "dateType")]
    pub date_type: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "dateString")]
    pub date_string: Option<String>,
}

impl DateRecord {
    /// First non-empty of `dateType`, `type`, `label`.
    pub fn label(&self) -> &str {
        [&self.date_type, &self.kind, &self.label]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }

    /// Trimmed `dateString`, or `None` when absent or blank.
    pub fn value(&self) -> Option<&str> {
        self.date_string
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl CatalogItem {
    /// The item's declared box, only when all four coordinates are present.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let raw = self.spatial.as_ref()?.bounding_box?;
        Some(BoundingBox::new(raw.min_x?, raw.min_y?, raw.max_x?, raw.max_y?))
    }

    pub fn link_uris(&self) -> impl Iterator<Item = &str> {
        self.web_links
            .iter()
            .flatten()
            .filter_map(|l| l.uri.as_deref())
            .filter(|u| !u.is_empty())
    }

    pub fn date_records(&self) -> &[DateRecord] {
        self.dates.as_deref().unwrap_or(&[])
    }
}

/// Parses a catalog response body: either `{"items": [...]}` or a bare
/// array of items. Anything else is `CatalogResponseMalformed`.
pub fn parse_items(body: &[u8]) -> Result<Vec<CatalogItem>> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| AoiError::CatalogResponseMalformed(format!("invalid JSON: {}", e)))?;

    let items = match value {
        serde_json::Value::Array(arr) => serde_json::Value::Array(arr),
        serde_json::Value::Object(mut obj) => match obj.remove("items") {
            Some(items @ serde_json::Value::Array(_)) => items,
            Some(_) => {
                return Err(AoiError::CatalogResponseMalformed(
                    "'items' is not an array".to_string(),
                ))
            }
            None => {
                return Err(AoiError::CatalogResponseMalformed(
                    "no 'items' key found".to_string(),
                ))
            }
        },
        other => {
            return Err(AoiError::CatalogResponseMalformed(format!(
                "expected an object or array, got {}",
                json_kind(&other)
            )))
        }
    };

    serde_json::from_value(items)
        .map_err(|e| AoiError::CatalogResponseMalformed(format!("item schema: {}", e)))
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
