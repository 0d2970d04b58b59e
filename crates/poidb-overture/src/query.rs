//! Planner for places extraction and count queries.
//!
//! Both query shapes are rendered from the same WHERE-clause builder, so
//! a count and an extraction over the same [`PoiFilter`] are
//! filter-equivalent by construction. Only the optional category/region
//! constraints carry user text; they are embedded as quoted string
//! literals. Every numeric and date bound comes from the filter's own
//! typed values.

use poidb_core::PoiFilter;

use crate::columns::PoiColumn;

/// Renders the extraction query for `filter` over the parquet relation at
/// `places_path`, projecting `columns` in order.
///
/// `limit` and `offset` are appended in that order when present; DuckDB
/// applies OFFSET before LIMIT regardless of clause order, so a resumed
/// run skips `offset` rows and then takes up to `limit`.
#[must_use]
pub fn build_query(
    filter: &PoiFilter,
    columns: &[PoiColumn],
    places_path: &str,
    limit: Option<usize>,
    offset: Option<usize>,
) -> String {
    let select_list: Vec<&str> = columns.iter().map(|c| c.select_expr()).collect();

    let mut query = format!(
        "SELECT\n    {}\nFROM read_parquet({})\nWHERE {}",
        select_list.join(",\n    "),
        quote_literal(places_path),
        where_clause(filter),
    );

    if let Some(limit) = limit {
        query.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(offset) = offset {
        query.push_str(&format!(" OFFSET {offset}"));
    }

    query
}

/// Renders the count query for `filter`: same predicate, count
/// projection, no pagination.
#[must_use]
pub fn build_count_query(filter: &PoiFilter, places_path: &str) -> String {
    format!(
        "SELECT COUNT(*)\nFROM read_parquet({})\nWHERE {}",
        quote_literal(places_path),
        where_clause(filter),
    )
}

fn where_clause(filter: &PoiFilter) -> String {
    let bbox = filter.bbox();

    let mut clauses = vec![
        format!(
            "addresses[1].country = {}",
            quote_literal(filter.country())
        ),
        format!(
            "ST_X(geometry) BETWEEN {} AND {}",
            bbox.min_lon(),
            bbox.max_lon()
        ),
        format!(
            "ST_Y(geometry) BETWEEN {} AND {}",
            bbox.min_lat(),
            bbox.max_lat()
        ),
        format!("confidence >= {}", filter.min_confidence()),
        format!(
            "sources[1].update_time >= '{}'",
            filter.min_source_update().format("%Y-%m-%d")
        ),
    ];

    if let Some(category) = filter.category() {
        clauses.push(format!("categories.primary = {}", quote_literal(category)));
    }
    if let Some(region) = filter.region() {
        clauses.push(format!("addresses[1].region = {}", quote_literal(region)));
    }

    clauses.join(" AND ")
}

/// Renders `value` as a single-quoted SQL string literal, doubling any
/// embedded quotes.
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
