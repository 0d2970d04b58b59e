//! Direct-connection backend: multi-row `INSERT … ON CONFLICT` upserts
//! over a sqlx Postgres pool.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use poidb_core::PoiRecord;

use crate::sink::{PoiSink, SinkError};

// Every mutable column is overwritten on conflict; only the primary key
// is left alone. Re-importing a record is a full replace, never a merge.
const ON_CONFLICT_CLAUSE: &str = " ON CONFLICT (id) DO UPDATE SET \
    name                 = EXCLUDED.name, \
    confidence           = EXCLUDED.confidence, \
    primary_category     = EXCLUDED.primary_category, \
    alternate_categories = EXCLUDED.alternate_categories, \
    brand                = EXCLUDED.brand, \
    operating_status     = EXCLUDED.operating_status, \
    websites             = EXCLUDED.websites, \
    socials              = EXCLUDED.socials, \
    phones               = EXCLUDED.phones, \
    emails               = EXCLUDED.emails, \
    street               = EXCLUDED.street, \
    city                 = EXCLUDED.city, \
    state                = EXCLUDED.state, \
    postcode             = EXCLUDED.postcode, \
    country              = EXCLUDED.country, \
    lon                  = EXCLUDED.lon, \
    lat                  = EXCLUDED.lat, \
    updated_at           = EXCLUDED.updated_at, \
    source_type          = EXCLUDED.source_type, \
    primary_source       = EXCLUDED.primary_source";

/// Sink writing straight to the `places` table.
///
/// Each batch is one multi-row INSERT statement, so a batch commits
/// atomically; nothing ties consecutive batches together, which is what
/// makes a run resumable by offset rather than transactional.
pub struct PostgresSink {
    pool: PgPool,
}

impl PostgresSink {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_rows(&self, records: &[PoiRecord]) -> Result<(), SinkError> {
        let mut builder = build_upsert(records);
        builder.build().execute(&self.pool).await?;
        Ok(())
    }
}

/// Renders the batch upsert statement with one bind per column per row.
///
/// 21 binds per row keeps the default batch size of 1000 well inside
/// Postgres's 65535-parameter ceiling.
fn build_upsert(records: &[PoiRecord]) -> QueryBuilder<'_, Postgres> {
    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
        "INSERT INTO places \
             (id, name, confidence, primary_category, alternate_categories, \
              brand, operating_status, websites, socials, phones, emails, \
              street, city, state, postcode, country, lon, lat, \
              updated_at, source_type, primary_source) ",
    );

    builder.push_values(records, |mut row, record| {
        row.push_bind(&record.id)
            .push_bind(&record.name)
            .push_bind(record.confidence)
            .push_bind(&record.primary_category)
            .push_bind(&record.alternate_categories)
            .push_bind(&record.brand)
            .push_bind(&record.operating_status)
            .push_bind(&record.websites)
            .push_bind(&record.socials)
            .push_bind(&record.phones)
            .push_bind(&record.emails)
            .push_bind(&record.street)
            .push_bind(&record.city)
            .push_bind(&record.state)
            .push_bind(&record.postcode)
            .push_bind(&record.country)
            .push_bind(record.lon)
            .push_bind(record.lat)
            .push_bind(record.updated_at)
            .push_bind(&record.source_type)
            .push_bind(&record.primary_source);
    });
    builder.push(ON_CONFLICT_CLAUSE);

    builder
}

#[async_trait]
impl PoiSink for PostgresSink {
    fn label(&self) -> &'static str {
        "postgres"
    }

    async fn try_batch(&mut self, records: &[PoiRecord]) -> Result<(), SinkError> {
        self.insert_rows(records).await
    }

    async fn try_single(&mut self, record: &PoiRecord) -> Result<(), SinkError> {
        self.insert_rows(std::slice::from_ref(record)).await
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.pool.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: &str) -> PoiRecord {
        PoiRecord {
            id: id.to_owned(),
            name: Some("Acme Cafe".to_owned()),
            confidence: 0.91,
            primary_category: Some("cafe".to_owned()),
            alternate_categories: Some(vec!["coffee_shop".to_owned()]),
            brand: None,
            operating_status: None,
            websites: None,
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
            primary_source: Some("meta".to_owned()),
            basic_category: None,
            brand_wikidata: None,
        }
    }

    #[test]
    fn upsert_statement_overwrites_every_mutable_column() {
        let records = vec![record("poi-1")];
        let mut builder = build_upsert(&records);
        let sql = builder.sql();

        assert!(sql.starts_with("INSERT INTO places"));
        assert!(sql.contains("ON CONFLICT (id) DO UPDATE SET"));
        // Full replace: every inserted column except the key is overwritten.
        for column in [
            "name", "confidence", "primary_category", "alternate_categories", "brand",
            "operating_status", "websites", "socials", "phones", "emails", "street", "city",
            "state", "postcode", "country", "lon", "lat", "updated_at", "source_type",
            "primary_source",
        ] {
            assert!(
                sql.contains(&format!("= EXCLUDED.{column}")),
                "missing overwrite for {column}"
            );
        }
        assert!(!sql.contains("id = EXCLUDED.id"));
    }

    #[test]
    fn batch_statement_binds_one_row_of_parameters_per_record() {
        let records = vec![record("poi-1"), record("poi-2"), record("poi-3")];
        let mut builder = build_upsert(&records);
        let sql = builder.sql();

        assert!(sql.contains("$21"), "first row should end at $21");
        assert!(sql.contains("$63"), "third row should end at $63");
        assert!(!sql.contains("$64"));
    }
}
