//! The projection contract shared by the query planner and the record
//! normalizer.
//!
//! Each [`PoiColumn`] knows both its DuckDB `SELECT` expression and its
//! output name. The planner renders the expressions in slice order and
//! the normalizer pairs row values with the same slice, so the two sides
//! agree on the column order by construction rather than by parallel
//! hard-coded lists.

/// One projected column of the places extraction query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoiColumn {
    Id,
    Name,
    Confidence,
    PrimaryCategory,
    AlternateCategories,
    Brand,
    OperatingStatus,
    Websites,
    Socials,
    Phones,
    Emails,
    Street,
    City,
    State,
    Postcode,
    Country,
    Lon,
    Lat,
    PrimarySource,
    BasicCategory,
    BrandWikidata,
}

/// Projection for the import pipeline: the `places` table columns that
/// are extracted (metadata columns are stamped by the normalizer), with
/// the primary source attribution last.
pub const IMPORT_COLUMNS: &[PoiColumn] = &[
    PoiColumn::Id,
    PoiColumn::Name,
    PoiColumn::Confidence,
    PoiColumn::PrimaryCategory,
    PoiColumn::AlternateCategories,
    PoiColumn::Brand,
    PoiColumn::OperatingStatus,
    PoiColumn::Websites,
    PoiColumn::Socials,
    PoiColumn::Phones,
    PoiColumn::Emails,
    PoiColumn::Street,
    PoiColumn::City,
    PoiColumn::State,
    PoiColumn::Postcode,
    PoiColumn::Country,
    PoiColumn::Lon,
    PoiColumn::Lat,
    PoiColumn::PrimarySource,
];

/// Projection for GeoJSON export: no source attribution, but the basic
/// category and the brand's external identifier are included for
/// visualization.
pub const EXPORT_COLUMNS: &[PoiColumn] = &[
    PoiColumn::Id,
    PoiColumn::Name,
    PoiColumn::Confidence,
    PoiColumn::PrimaryCategory,
    PoiColumn::AlternateCategories,
    PoiColumn::Brand,
    PoiColumn::OperatingStatus,
    PoiColumn::Websites,
    PoiColumn::Socials,
    PoiColumn::Phones,
    PoiColumn::Emails,
    PoiColumn::Street,
    PoiColumn::City,
    PoiColumn::State,
    PoiColumn::Postcode,
    PoiColumn::Country,
    PoiColumn::Lon,
    PoiColumn::Lat,
    PoiColumn::BasicCategory,
    PoiColumn::BrandWikidata,
];

impl PoiColumn {
    /// The `SELECT` expression projecting this column out of the raw
    /// places schema, aliased to [`PoiColumn::name`] where the two
    /// differ.
    #[must_use]
    pub const fn select_expr(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "names.primary AS name",
            Self::Confidence => "confidence",
            Self::PrimaryCategory => "categories.primary AS primary_category",
            Self::AlternateCategories => "categories.alternate AS alternate_categories",
            Self::Brand => "brand.names.primary AS brand",
            Self::OperatingStatus => "operating_status",
            Self::Websites => "websites",
            Self::Socials => "socials",
            Self::Phones => "phones",
            Self::Emails => "emails",
            Self::Street => "addresses[1].freeform AS street",
            Self::City => "addresses[1].locality AS city",
            Self::State => "addresses[1].region AS state",
            Self::Postcode => "addresses[1].postcode AS postcode",
            Self::Country => "addresses[1].country AS country",
            Self::Lon => "ST_X(geometry) AS lon",
            Self::Lat => "ST_Y(geometry) AS lat",
            Self::PrimarySource => "sources[1].dataset AS primary_source",
            Self::BasicCategory => "basic_category",
            Self::BrandWikidata => "brand.wikidata AS brand_wikidata",
        }
    }

    /// The flat output name of this column.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Confidence => "confidence",
            Self::PrimaryCategory => "primary_category",
            Self::AlternateCategories => "alternate_categories",
            Self::Brand => "brand",
            Self::OperatingStatus => "operating_status",
            Self::Websites => "websites",
            Self::Socials => "socials",
            Self::Phones => "phones",
            Self::Emails => "emails",
            Self::Street => "street",
            Self::City => "city",
            Self::State => "state",
            Self::Postcode => "postcode",
            Self::Country => "country",
            Self::Lon => "lon",
            Self::Lat => "lat",
            Self::PrimarySource => "primary_source",
            Self::BasicCategory => "basic_category",
            Self::BrandWikidata => "brand_wikidata",
        }
    }
}
