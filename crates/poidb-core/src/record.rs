//! The normalized POI record flowing from extraction to the destination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance tag stamped on every record produced by this pipeline.
pub const SOURCE_TYPE_OVERTURE: &str = "overture";

/// One row of the destination `places` table, field order matching the
/// table's column order.
///
/// Array-valued contact and category fields are `None` when the source
/// had nothing to say, never an empty vector, so "no websites known"
/// stays distinguishable from "field not fetched" in the destination.
/// `basic_category` and `brand_wikidata` only exist on the export path;
/// they are skipped during serialization when absent so import-mode
/// upsert bodies carry exactly the `places` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiRecord {
    pub id: String,
    pub name: Option<String>,
    pub confidence: f64,
    pub primary_category: Option<String>,
    pub alternate_categories: Option<Vec<String>>,
    pub brand: Option<String>,
    pub operating_status: Option<String>,
    pub websites: Option<Vec<String>>,
    pub socials: Option<Vec<String>>,
    pub phones: Option<Vec<String>>,
    pub emails: Option<Vec<String>>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub lon: f64,
    pub lat: f64,
    pub updated_at: DateTime<Utc>,
    pub source_type: String,
    pub primary_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_wikidata: Option<String>,
}
