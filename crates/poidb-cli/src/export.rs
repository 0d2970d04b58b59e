//! GeoJSON export of POIs within a bounding box.
//!
//! Shares the filter and planner with the import pipeline but projects
//! the export column set and never touches a destination store.

use std::path::PathBuf;

use clap::Args;

use poidb_core::{AppConfig, BoundingBox, PoiFilter, PoiRecord};
use poidb_overture::{build_query, fetch_page, normalize, OvertureClient, EXPORT_COLUMNS};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Bounding box: min_lon,max_lon,min_lat,max_lat (e.g., '-87.61,-87.58,41.78,41.80')
    #[arg(long)]
    pub bbox: String,
    /// Output GeoJSON file
    #[arg(long)]
    pub output: PathBuf,
    /// Limit number of POIs
    #[arg(long)]
    pub limit: Option<usize>,
    /// Filter by primary category
    #[arg(long)]
    pub category: Option<String>,
    /// Filter by state (e.g., IL)
    #[arg(long)]
    pub state: Option<String>,
}

pub(crate) fn run_export(config: &AppConfig, args: ExportArgs) -> anyhow::Result<()> {
    let bbox = BoundingBox::parse(&args.bbox)?;
    let filter = PoiFilter::new(bbox, args.category, args.state);

    println!("Exporting POIs from bounding box: {}", args.bbox);
    println!(
        "Filters: confidence >= {}, source update >= {}",
        filter.min_confidence(),
        filter.min_source_update()
    );

    let client = OvertureClient::connect(&config.overture_release, &config.s3_region)?;
    let query = build_query(
        &filter,
        EXPORT_COLUMNS,
        client.places_path(),
        args.limit,
        None,
    );

    let mut stmt = client.prepare(&query)?;
    let mut rows = stmt.query([])?;

    let mut records = Vec::new();
    loop {
        let page = fetch_page(&mut rows, EXPORT_COLUMNS.len(), config.batch_size)?;
        if page.is_empty() {
            break;
        }
        for row in &page {
            match normalize(row, EXPORT_COLUMNS) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(error = %e, "skipping unparseable row"),
            }
        }
    }

    println!("Found {} POIs", records.len());

    let collection = feature_collection(&records)?;
    std::fs::write(&args.output, serde_json::to_string_pretty(&collection)?)?;

    println!("Exported {} POIs to {}", records.len(), args.output.display());
    print_samples(&records);
    Ok(())
}

fn feature_collection(records: &[PoiRecord]) -> anyhow::Result<serde_json::Value> {
    let features = records
        .iter()
        .map(feature)
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(serde_json::json!({
        "type": "FeatureCollection",
        "features": features,
    }))
}

/// One GeoJSON feature: the coordinate pair moves into the Point
/// geometry, every other normalized field becomes a property.
fn feature(record: &PoiRecord) -> anyhow::Result<serde_json::Value> {
    let value = serde_json::to_value(record)?;
    let serde_json::Value::Object(mut properties) = value else {
        anyhow::bail!("record did not serialize to an object");
    };
    properties.remove("lon");
    properties.remove("lat");

    Ok(serde_json::json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [record.lon, record.lat],
        },
        "properties": properties,
    }))
}

fn print_samples(records: &[PoiRecord]) {
    if records.is_empty() {
        return;
    }
    println!("Sample POIs:");
    for (i, record) in records.iter().take(5).enumerate() {
        println!(
            "  {}. {} ({}) - confidence: {:.2}",
            i + 1,
            record.name.as_deref().unwrap_or("(unnamed)"),
            record.primary_category.as_deref().unwrap_or("uncategorized"),
            record.confidence
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record() -> PoiRecord {
        PoiRecord {
            id: "poi-1".to_owned(),
            name: Some("Acme Cafe".to_owned()),
            confidence: 0.91,
            primary_category: Some("cafe".to_owned()),
            alternate_categories: None,
            brand: None,
            operating_status: None,
            websites: Some(vec!["https://acme.example".to_owned()]),
            socials: None,
            phones: None,
            emails: None,
            street: None,
            city: Some("Chicago".to_owned()),
            state: Some("IL".to_owned()),
            postcode: None,
            country: Some("US".to_owned()),
            lon: -87.60,
            lat: 41.79,
            updated_at: Utc::now(),
            source_type: "overture".to_owned(),
            primary_source: None,
            basic_category: Some("eat_and_drink".to_owned()),
            brand_wikidata: None,
        }
    }

    #[test]
    fn feature_moves_coordinates_into_the_geometry() {
        let feature = feature(&record()).unwrap();

        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(
            feature["geometry"]["coordinates"],
            serde_json::json!([-87.60, 41.79])
        );

        let properties = feature["properties"].as_object().unwrap();
        assert!(!properties.contains_key("lon"));
        assert!(!properties.contains_key("lat"));
        assert_eq!(properties["name"], "Acme Cafe");
        assert_eq!(properties["basic_category"], "eat_and_drink");
        assert!(properties["socials"].is_null());
    }

    #[test]
    fn collection_wraps_features_in_the_fixed_envelope() {
        let records = vec![record(), record()];
        let collection = feature_collection(&records).unwrap();

        assert_eq!(collection["type"], "FeatureCollection");
        assert_eq!(collection["features"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn empty_export_is_still_a_valid_collection() {
        let collection = feature_collection(&[]).unwrap();
        assert_eq!(collection["type"], "FeatureCollection");
        assert_eq!(collection["features"].as_array().unwrap().len(), 0);
    }
}
