//! Normalization of raw places rows into [`PoiRecord`]s.

use chrono::Utc;
use duckdb::types::Value;

use poidb_core::{PoiRecord, SOURCE_TYPE_OVERTURE};

use crate::columns::PoiColumn;
use crate::error::TransformError;

/// One raw row from the extraction cursor, in projection order.
pub type RawRow = Vec<Value>;

/// Converts a raw columnar row into a [`PoiRecord`], pairing values with
/// the projection contract in `columns`.
///
/// Array-typed fields normalize to `None` when the source value is NULL
/// or an empty list, never to an empty vector. The import timestamp is
/// captured here and the source type is stamped with the constant
/// `"overture"`; apart from that capture instant the function is pure.
///
/// # Errors
///
/// Returns [`TransformError`] when the row width does not match the
/// contract, a value has an unexpected shape, or a required field
/// (identifier, coordinates, confidence) is absent.
pub fn normalize(row: &[Value], columns: &[PoiColumn]) -> Result<PoiRecord, TransformError> {
    if row.len() != columns.len() {
        return Err(TransformError::ColumnCount {
            expected: columns.len(),
            got: row.len(),
        });
    }

    let mut id = None;
    let mut name = None;
    let mut confidence = None;
    let mut primary_category = None;
    let mut alternate_categories = None;
    let mut brand = None;
    let mut operating_status = None;
    let mut websites = None;
    let mut socials = None;
    let mut phones = None;
    let mut emails = None;
    let mut street = None;
    let mut city = None;
    let mut state = None;
    let mut postcode = None;
    let mut country = None;
    let mut lon = None;
    let mut lat = None;
    let mut primary_source = None;
    let mut basic_category = None;
    let mut brand_wikidata = None;

    for (column, value) in columns.iter().zip(row) {
        match column {
            PoiColumn::Id => id = opt_text(value, *column)?,
            PoiColumn::Name => name = opt_text(value, *column)?,
            PoiColumn::Confidence => confidence = opt_f64(value, *column)?,
            PoiColumn::PrimaryCategory => primary_category = opt_text(value, *column)?,
            PoiColumn::AlternateCategories => {
                alternate_categories = opt_string_list(value, *column)?;
            }
            PoiColumn::Brand => brand = opt_text(value, *column)?,
            PoiColumn::OperatingStatus => operating_status = opt_text(value, *column)?,
            PoiColumn::Websites => websites = opt_string_list(value, *column)?,
            PoiColumn::Socials => socials = opt_string_list(value, *column)?,
            PoiColumn::Phones => phones = opt_string_list(value, *column)?,
            PoiColumn::Emails => emails = opt_string_list(value, *column)?,
            PoiColumn::Street => street = opt_text(value, *column)?,
            PoiColumn::City => city = opt_text(value, *column)?,
            PoiColumn::State => state = opt_text(value, *column)?,
            PoiColumn::Postcode => postcode = opt_text(value, *column)?,
            PoiColumn::Country => country = opt_text(value, *column)?,
            PoiColumn::Lon => lon = opt_f64(value, *column)?,
            PoiColumn::Lat => lat = opt_f64(value, *column)?,
            PoiColumn::PrimarySource => primary_source = opt_text(value, *column)?,
            PoiColumn::BasicCategory => basic_category = opt_text(value, *column)?,
            PoiColumn::BrandWikidata => brand_wikidata = opt_text(value, *column)?,
        }
    }

    Ok(PoiRecord {
        id: id.ok_or(TransformError::MissingField("id"))?,
        name,
        confidence: confidence.ok_or(TransformError::MissingField("confidence"))?,
        primary_category,
        alternate_categories,
        brand,
        operating_status,
        websites,
        socials,
        phones,
        emails,
        street,
        city,
        state,
        postcode,
        country,
        lon: lon.ok_or(TransformError::MissingField("lon"))?,
        lat: lat.ok_or(TransformError::MissingField("lat"))?,
        updated_at: Utc::now(),
        source_type: SOURCE_TYPE_OVERTURE.to_owned(),
        primary_source,
        basic_category,
        brand_wikidata,
    })
}

fn opt_text(value: &Value, column: PoiColumn) -> Result<Option<String>, TransformError> {
    match value {
        Value::Null => Ok(None),
        Value::Text(s) => Ok(Some(s.clone())),
        other => Err(unexpected(column, other)),
    }
}

fn opt_f64(value: &Value, column: PoiColumn) -> Result<Option<f64>, TransformError> {
    match value {
        Value::Null => Ok(None),
        Value::Double(f) => Ok(Some(*f)),
        Value::Float(f) => Ok(Some(f64::from(*f))),
        other => Err(unexpected(column, other)),
    }
}

fn opt_string_list(value: &Value, column: PoiColumn) -> Result<Option<Vec<String>>, TransformError> {
    match value {
        Value::Null => Ok(None),
        Value::List(items) if items.is_empty() => Ok(None),
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Text(s) => out.push(s.clone()),
                    other => return Err(unexpected(column, other)),
                }
            }
            Ok(Some(out))
        }
        other => Err(unexpected(column, other)),
    }
}

fn unexpected(column: PoiColumn, value: &Value) -> TransformError {
    TransformError::UnexpectedType {
        column: column.name(),
        found: variant_name(value),
    }
}

fn variant_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Boolean(_) => "boolean",
        Value::Text(_) => "text",
        Value::Double(_) | Value::Float(_) => "float",
        Value::List(_) => "list",
        Value::TinyInt(_)
        | Value::SmallInt(_)
        | Value::Int(_)
        | Value::BigInt(_)
        | Value::HugeInt(_)
        | Value::UTinyInt(_)
        | Value::USmallInt(_)
        | Value::UInt(_)
        | Value::UBigInt(_) => "integer",
        _ => "other",
    }
}
