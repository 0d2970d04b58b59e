//! One-shot count of POIs matching the standing import filter.

use poidb_core::{AppConfig, PoiFilter};
use poidb_overture::{build_count_query, OvertureClient};

pub(crate) fn run_count(
    config: &AppConfig,
    category: Option<String>,
    state: Option<String>,
) -> anyhow::Result<()> {
    let filter = PoiFilter::us_mainland(category, state);
    let bbox = filter.bbox();

    println!("Counting POIs in the US mainland...");
    println!(
        "Bounding box: {} to {} (lon), {} to {} (lat)",
        bbox.min_lon(),
        bbox.max_lon(),
        bbox.min_lat(),
        bbox.max_lat()
    );
    println!(
        "Filters: confidence >= {}, source update >= {}",
        filter.min_confidence(),
        filter.min_source_update()
    );

    let client = OvertureClient::connect(&config.overture_release, &config.s3_region)?;
    let total = client.count(&build_count_query(&filter, client.places_path()))?;

    println!("Total matching POIs: {total}");
    Ok(())
}
