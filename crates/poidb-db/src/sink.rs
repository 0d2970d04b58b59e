//! The destination capability shared by both backends.
//!
//! A sink is chosen once at pipeline start and injected into the driver
//! as a `Box<dyn PoiSink>`; the driver never branches on which backend
//! it is talking to. The batch-then-individual fallback lives here as a
//! provided method so both backends isolate bad rows identically.

use async_trait::async_trait;
use thiserror::Error;

use poidb_core::PoiRecord;

/// Errors surfaced by a destination backend.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The destination API rejected the request.
    #[error("destination API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Database-level failure from the direct connection.
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    /// The configured destination URL could not be parsed.
    #[error("invalid destination URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Result of one [`PoiSink::upsert_batch`] call: how many records made
/// it into the destination, and a message per record that did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub upserted: u64,
    pub failures: Vec<String>,
}

/// Write capability over a destination store, keyed by record id with
/// full-replace-on-conflict semantics.
#[async_trait]
pub trait PoiSink: Send {
    /// Backend name for logs and summaries.
    fn label(&self) -> &'static str;

    /// One bulk upsert covering the whole batch.
    async fn try_batch(&mut self, records: &[PoiRecord]) -> Result<(), SinkError>;

    /// Upsert of a single record, used by the fallback pass.
    async fn try_single(&mut self, record: &PoiRecord) -> Result<(), SinkError>;

    /// Releases the destination connection. Called on every pipeline
    /// exit path.
    async fn close(&mut self) -> Result<(), SinkError>;

    /// Upserts a batch with error isolation: one bulk attempt, and on
    /// any batch-level rejection a single per-record pass so one
    /// malformed record cannot poison the rest. Record-level failures
    /// are collected, never propagated: a write error ends a record,
    /// not the run. There is no further retry beyond this one fallback.
    async fn upsert_batch(&mut self, records: &[PoiRecord]) -> BatchOutcome {
        if records.is_empty() {
            return BatchOutcome::default();
        }

        match self.try_batch(records).await {
            Ok(()) => BatchOutcome {
                upserted: u64::try_from(records.len()).unwrap_or(u64::MAX),
                failures: Vec::new(),
            },
            Err(batch_err) => {
                tracing::warn!(
                    sink = self.label(),
                    rows = records.len(),
                    error = %batch_err,
                    "batch upsert rejected; retrying rows individually"
                );

                let mut outcome = BatchOutcome::default();
                for record in records {
                    match self.try_single(record).await {
                        Ok(()) => outcome.upserted += 1,
                        Err(e) => outcome
                            .failures
                            .push(format!("insert error for {}: {e}", record.id)),
                    }
                }
                outcome
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: &str) -> PoiRecord {
        PoiRecord {
            id: id.to_owned(),
            name: None,
            confidence: 0.8,
            primary_category: None,
            alternate_categories: None,
            brand: None,
            operating_status: None,
            websites: None,
            socials: None,
            phones: None,
            emails: None,
            street: None,
            city: None,
            state: None,
            postcode: None,
            country: None,
            lon: 0.0,
            lat: 0.0,
            updated_at: Utc::now(),
            source_type: "overture".to_owned(),
            primary_source: None,
            basic_category: None,
            brand_wikidata: None,
        }
    }

    /// Scripted backend: optionally rejects the bulk call and any single
    /// record whose id is listed, recording everything it was asked to do.
    #[derive(Default)]
    struct ScriptedSink {
        reject_bulk: bool,
        reject_singles: Vec<&'static str>,
        bulk_calls: usize,
        single_ids: Vec<String>,
        closed: bool,
    }

    #[async_trait]
    impl PoiSink for ScriptedSink {
        fn label(&self) -> &'static str {
            "scripted"
        }

        async fn try_batch(&mut self, _records: &[PoiRecord]) -> Result<(), SinkError> {
            self.bulk_calls += 1;
            if self.reject_bulk {
                return Err(SinkError::Api {
                    status: 400,
                    message: "malformed row in batch".to_owned(),
                });
            }
            Ok(())
        }

        async fn try_single(&mut self, record: &PoiRecord) -> Result<(), SinkError> {
            if self.reject_singles.contains(&record.id.as_str()) {
                return Err(SinkError::Api {
                    status: 400,
                    message: "still malformed".to_owned(),
                });
            }
            self.single_ids.push(record.id.clone());
            Ok(())
        }

        async fn close(&mut self) -> Result<(), SinkError> {
            self.closed = true;
            Ok(())
        }
    }

    #[tokio::test]
    async fn happy_path_is_a_single_bulk_call() {
        let mut sink = ScriptedSink::default();
        let batch = vec![record("poi-1"), record("poi-2"), record("poi-3")];

        let outcome = sink.upsert_batch(&batch).await;

        assert_eq!(outcome.upserted, 3);
        assert!(outcome.failures.is_empty());
        assert_eq!(sink.bulk_calls, 1);
        assert!(sink.single_ids.is_empty());
    }

    #[tokio::test]
    async fn fallback_salvages_the_good_rows() {
        let mut sink = ScriptedSink {
            reject_bulk: true,
            reject_singles: vec!["poi-2"],
            ..ScriptedSink::default()
        };
        let batch = vec![record("poi-1"), record("poi-2"), record("poi-3")];

        let outcome = sink.upsert_batch(&batch).await;

        assert_eq!(outcome.upserted, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].contains("poi-2"));
        assert_eq!(sink.single_ids, ["poi-1", "poi-3"]);
    }

    #[tokio::test]
    async fn empty_batch_touches_nothing() {
        let mut sink = ScriptedSink::default();
        let outcome = sink.upsert_batch(&[]).await;

        assert_eq!(outcome, BatchOutcome::default());
        assert_eq!(sink.bulk_calls, 0);
    }
}
