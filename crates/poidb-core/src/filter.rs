//! The standing POI filter shared by counting, extraction, and export.
//!
//! A [`PoiFilter`] is built once per invocation and immutable thereafter.
//! The query planner reads it through accessors so the axis and range
//! invariants established at construction time cannot be violated later.

use chrono::NaiveDate;
use thiserror::Error;

/// Minimum source-provided quality score for a record to be included.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.77;

/// Minimum acceptable recency of the primary source attribution.
pub const DEFAULT_MIN_SOURCE_UPDATE: NaiveDate = match NaiveDate::from_ymd_opt(2025, 1, 1) {
    Some(d) => d,
    None => panic!("valid date literal"),
};

const COUNTRY_US: &str = "US";

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("malformed bounding box '{input}': expected min_lon,max_lon,min_lat,max_lat")]
    MalformedBbox { input: String },
    #[error("bounding box minimum exceeds maximum on the {axis} axis")]
    InvertedAxis { axis: &'static str },
    #[error("confidence threshold {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),
}

/// A rectangular geographic filter: min/max longitude and latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min_lon: f64,
    max_lon: f64,
    min_lat: f64,
    max_lat: f64,
}

impl BoundingBox {
    /// Continental US, Canada/Mexico border overlap included.
    pub const US_MAINLAND: Self = Self {
        min_lon: -128.359_795,
        max_lon: -56.728_935,
        min_lat: 24.132_028,
        max_lat: 49.898_394,
    };

    /// Builds a bounding box, enforcing `min <= max` on both axes.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvertedAxis`] naming the offending axis.
    pub fn new(
        min_lon: f64,
        max_lon: f64,
        min_lat: f64,
        max_lat: f64,
    ) -> Result<Self, FilterError> {
        if min_lon > max_lon {
            return Err(FilterError::InvertedAxis { axis: "longitude" });
        }
        if min_lat > max_lat {
            return Err(FilterError::InvertedAxis { axis: "latitude" });
        }
        Ok(Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        })
    }

    /// Parses the CLI bbox format `min_lon,max_lon,min_lat,max_lat`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MalformedBbox`] when the string does not
    /// split into four floats, or [`FilterError::InvertedAxis`] when the
    /// parsed bounds are inverted.
    pub fn parse(input: &str) -> Result<Self, FilterError> {
        let malformed = || FilterError::MalformedBbox {
            input: input.to_owned(),
        };

        let parts: Vec<f64> = input
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| malformed())?;

        match parts.as_slice() {
            [min_lon, max_lon, min_lat, max_lat] => {
                Self::new(*min_lon, *max_lon, *min_lat, *max_lat)
            }
            _ => Err(malformed()),
        }
    }

    #[must_use]
    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    #[must_use]
    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    #[must_use]
    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    #[must_use]
    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }
}

/// Declarative predicate over the places theme: bounding box, country,
/// confidence and freshness thresholds, plus optional category and
/// region equality constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiFilter {
    bbox: BoundingBox,
    min_confidence: f64,
    min_source_update: NaiveDate,
    country: &'static str,
    category: Option<String>,
    region: Option<String>,
}

impl PoiFilter {
    /// Filter over an explicit bounding box with the standing quality
    /// thresholds (confidence >= 0.77, source update >= 2025-01-01,
    /// country US).
    #[must_use]
    pub fn new(bbox: BoundingBox, category: Option<String>, region: Option<String>) -> Self {
        Self {
            bbox,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            min_source_update: DEFAULT_MIN_SOURCE_UPDATE,
            country: COUNTRY_US,
            category,
            region,
        }
    }

    /// The standing import filter: US mainland bounding box plus the
    /// default thresholds.
    #[must_use]
    pub fn us_mainland(category: Option<String>, region: Option<String>) -> Self {
        Self::new(BoundingBox::US_MAINLAND, category, region)
    }

    /// Replaces the confidence threshold, keeping everything else.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::ConfidenceOutOfRange`] unless the value is
    /// within `[0, 1]`.
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Result<Self, FilterError> {
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(FilterError::ConfidenceOutOfRange(min_confidence));
        }
        self.min_confidence = min_confidence;
        Ok(self)
    }

    #[must_use]
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    #[must_use]
    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    #[must_use]
    pub fn min_source_update(&self) -> NaiveDate {
        self.min_source_update
    }

    #[must_use]
    pub fn country(&self) -> &'static str {
        self.country
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_the_cli_format() {
        let bbox = BoundingBox::parse("-87.61,-87.58,41.78,41.80").unwrap();
        assert_eq!(bbox.min_lon(), -87.61);
        assert_eq!(bbox.max_lon(), -87.58);
        assert_eq!(bbox.min_lat(), 41.78);
        assert_eq!(bbox.max_lat(), 41.80);
    }

    #[test]
    fn parse_tolerates_whitespace_between_parts() {
        let bbox = BoundingBox::parse("-122.52, -122.35, 37.70, 37.83").unwrap();
        assert_eq!(bbox.max_lat(), 37.83);
    }

    #[test]
    fn parse_rejects_wrong_arity() {
        let err = BoundingBox::parse("-87.61,-87.58,41.78").unwrap_err();
        assert!(matches!(err, FilterError::MalformedBbox { .. }));
    }

    #[test]
    fn parse_rejects_non_numeric_parts() {
        let err = BoundingBox::parse("-87.61,east,41.78,41.80").unwrap_err();
        assert!(matches!(err, FilterError::MalformedBbox { .. }));
    }

    #[test]
    fn new_rejects_inverted_longitude() {
        let err = BoundingBox::new(-56.0, -128.0, 24.0, 49.0).unwrap_err();
        assert_eq!(err, FilterError::InvertedAxis { axis: "longitude" });
    }

    #[test]
    fn new_rejects_inverted_latitude() {
        let err = BoundingBox::new(-128.0, -56.0, 49.0, 24.0).unwrap_err();
        assert_eq!(err, FilterError::InvertedAxis { axis: "latitude" });
    }

    #[test]
    fn us_mainland_carries_the_standing_thresholds() {
        let filter = PoiFilter::us_mainland(None, None);
        assert_eq!(filter.country(), "US");
        assert_eq!(filter.min_confidence(), DEFAULT_MIN_CONFIDENCE);
        assert_eq!(
            filter.min_source_update(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert!(filter.category().is_none());
        assert!(filter.region().is_none());
    }

    #[test]
    fn optional_constraints_are_kept_verbatim() {
        let filter = PoiFilter::us_mainland(Some("cafe".to_owned()), Some("IL".to_owned()));
        assert_eq!(filter.category(), Some("cafe"));
        assert_eq!(filter.region(), Some("IL"));
    }

    #[test]
    fn with_min_confidence_validates_the_range() {
        let filter = PoiFilter::us_mainland(None, None);
        assert!(filter.clone().with_min_confidence(0.9).is_ok());
        assert_eq!(
            filter.with_min_confidence(1.5).unwrap_err(),
            FilterError::ConfidenceOutOfRange(1.5)
        );
    }
}
