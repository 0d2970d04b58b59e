//! Embedded DuckDB client for the Overture places release on S3.

use duckdb::types::Value;
use duckdb::{Connection, Rows, Statement};

use crate::error::OvertureError;
use crate::normalize::RawRow;
use crate::query::quote_literal;

const DATASET_ROOT: &str = "s3://overturemaps-us-west-2/release";

/// An in-memory DuckDB connection prepared for remote parquet queries:
/// `spatial` (geometry decomposition) and `httpfs` (S3 reads) loaded,
/// S3 region set.
pub struct OvertureClient {
    conn: Connection,
    places_path: String,
}

impl OvertureClient {
    /// Opens the engine and loads the required extensions.
    ///
    /// # Errors
    ///
    /// Returns [`OvertureError::Bootstrap`] when the extensions cannot be
    /// installed or loaded (typically no network access), or
    /// [`OvertureError::Duckdb`] for any other engine failure.
    pub fn connect(release: &str, s3_region: &str) -> Result<Self, OvertureError> {
        let conn = Connection::open_in_memory()?;

        conn.execute_batch("INSTALL spatial; INSTALL httpfs; LOAD spatial; LOAD httpfs;")
            .map_err(OvertureError::Bootstrap)?;
        conn.execute_batch(&format!("SET s3_region={};", quote_literal(s3_region)))?;

        let places_path = format!("{DATASET_ROOT}/{release}/theme=places/*/*");
        tracing::debug!(%places_path, "DuckDB ready for places queries");

        Ok(Self { conn, places_path })
    }

    /// The parquet glob for the configured release's places theme.
    #[must_use]
    pub fn places_path(&self) -> &str {
        &self.places_path
    }

    /// Runs a count query and returns its single scalar.
    ///
    /// # Errors
    ///
    /// Returns [`OvertureError::Duckdb`] if the query fails.
    pub fn count(&self, sql: &str) -> Result<i64, OvertureError> {
        let total = self.conn.query_row(sql, [], |row| row.get::<_, i64>(0))?;
        Ok(total)
    }

    /// Prepares an extraction statement. The caller drives the resulting
    /// cursor page by page via [`fetch_page`].
    ///
    /// # Errors
    ///
    /// Returns [`OvertureError::Duckdb`] if preparation fails.
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>, OvertureError> {
        let stmt = self.conn.prepare(sql)?;
        Ok(stmt)
    }
}

/// Pulls up to `limit` rows of `width` columns from a live cursor.
///
/// A page shorter than `limit` (including an empty one) means the
/// cursor is exhausted. The caller fetches the next page only after it
/// has finished processing the previous one, so at most one page of raw
/// values is resident at a time.
///
/// # Errors
///
/// Returns [`OvertureError::Duckdb`] if stepping the cursor or reading a
/// value fails.
pub fn fetch_page(
    rows: &mut Rows<'_>,
    width: usize,
    limit: usize,
) -> Result<Vec<RawRow>, OvertureError> {
    let mut page = Vec::new();
    while page.len() < limit {
        let Some(row) = rows.next()? else { break };
        let mut values = Vec::with_capacity(width);
        for idx in 0..width {
            values.push(row.get::<_, Value>(idx)?);
        }
        page.push(values);
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    // These run against a plain in-memory engine; no extensions, no
    // network.

    #[test]
    fn fetch_page_pages_through_and_then_drains() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare("SELECT i::VARCHAR FROM range(5) t(i) ORDER BY i")
            .unwrap();
        let mut rows = stmt.query([]).unwrap();

        assert_eq!(fetch_page(&mut rows, 1, 2).unwrap().len(), 2);
        assert_eq!(fetch_page(&mut rows, 1, 2).unwrap().len(), 2);
        assert_eq!(fetch_page(&mut rows, 1, 2).unwrap().len(), 1);
        assert!(fetch_page(&mut rows, 1, 2).unwrap().is_empty());
    }

    #[test]
    fn fetch_page_preserves_value_shapes() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare("SELECT 'poi-1', 0.91::DOUBLE, ['a', 'b'], NULL")
            .unwrap();
        let mut rows = stmt.query([]).unwrap();

        let page = fetch_page(&mut rows, 4, 10).unwrap();
        assert_eq!(page.len(), 1);
        let row = &page[0];
        assert_eq!(row[0], Value::Text("poi-1".to_owned()));
        assert_eq!(row[1], Value::Double(0.91));
        assert_eq!(
            row[2],
            Value::List(vec![
                Value::Text("a".to_owned()),
                Value::Text("b".to_owned())
            ])
        );
        assert_eq!(row[3], Value::Null);
    }
}
