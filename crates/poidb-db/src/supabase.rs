//! Client-API backend: PostgREST upserts against a Supabase project.
//!
//! Wraps `reqwest` with the headers PostgREST needs for a
//! conflict-resolving bulk insert. The call is at-least-once and
//! non-transactional; durability of a batch interrupted mid-flight is
//! the destination's business, not ours.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use poidb_core::PoiRecord;

use crate::sink::{PoiSink, SinkError};

const PLACES_TABLE: &str = "places";

/// Sink posting batches to `rest/v1/places` with
/// `Prefer: resolution=merge-duplicates` keyed on `id`.
#[derive(Debug)]
pub struct SupabaseSink {
    client: Client,
    endpoint: Url,
    service_key: String,
}

impl SupabaseSink {
    /// Creates a sink for the Supabase project at `base_url`.
    ///
    /// `base_url` is the project root (e.g. `https://proj.supabase.co`);
    /// tests point it at a mock server instead.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SinkError::InvalidUrl`] if `base_url`
    /// does not parse.
    pub fn new(base_url: &str, service_key: &str, timeout_secs: u64) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("poidb/0.1 (overture-import)")
            .build()?;

        let invalid = |reason: String| SinkError::InvalidUrl {
            url: base_url.to_owned(),
            reason,
        };

        // Normalise: ensure the base ends with exactly one slash so the
        // REST path joins under it rather than replacing a segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
        let endpoint = base
            .join(&format!("rest/v1/{PLACES_TABLE}"))
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            service_key: service_key.to_owned(),
        })
    }

    async fn upsert(&self, records: &[PoiRecord]) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&[("on_conflict", "id")])
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(records)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable response body".to_owned());
            return Err(SinkError::Api {
                status: status.as_u16(),
                message: summarize(&message),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PoiSink for SupabaseSink {
    fn label(&self) -> &'static str {
        "supabase"
    }

    async fn try_batch(&mut self, records: &[PoiRecord]) -> Result<(), SinkError> {
        self.upsert(records).await
    }

    async fn try_single(&mut self, record: &PoiRecord) -> Result<(), SinkError> {
        self.upsert(std::slice::from_ref(record)).await
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        // Stateless HTTP client; nothing to release.
        Ok(())
    }
}

/// Clips a response body to something fit for an error sample.
fn summarize(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_CHARS {
        trimmed.to_owned()
    } else {
        let mut clipped: String = trimmed.chars().take(MAX_CHARS).collect();
        clipped.push('…');
        clipped
    }
}
