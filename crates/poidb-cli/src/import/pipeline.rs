//! Page-by-page streaming: fetch, normalize, sink, account.
//!
//! The driver owns all run accounting; nothing here is shared or
//! global. Extraction is pull-based: the next page is fetched only
//! after the previous page has been normalized and dispatched, so at
//! most one page of raw rows is resident at a time.

use poidb_db::{BatchOutcome, PoiSink};
use poidb_overture::{normalize, OvertureError, PoiColumn, RawRow};

const ERROR_SAMPLE_CAP: usize = 5;

/// Counters owned by the driver for the lifetime of one run. Printed in
/// the final summary, never persisted; `next_offset` is the resume
/// cursor an operator can feed back via `--offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunState {
    pub total: u64,
    pub processed: u64,
    pub imported: u64,
    pub errors: u64,
    pub error_samples: Vec<String>,
    pub next_offset: u64,
}

impl RunState {
    pub fn new(total: u64, starting_offset: usize) -> Self {
        Self {
            total,
            processed: 0,
            imported: 0,
            errors: 0,
            error_samples: Vec::new(),
            next_offset: u64::try_from(starting_offset).unwrap_or(u64::MAX),
        }
    }

    /// Counts an error, keeping the first few messages as samples.
    pub fn record_error(&mut self, message: String) {
        self.errors += 1;
        if self.error_samples.len() < ERROR_SAMPLE_CAP {
            self.error_samples.push(message);
        }
    }

    fn absorb(&mut self, outcome: BatchOutcome) {
        self.imported += outcome.upserted;
        for failure in outcome.failures {
            self.record_error(failure);
        }
    }

    fn advance(&mut self, fetched: usize) {
        let fetched = u64::try_from(fetched).unwrap_or(u64::MAX);
        self.processed += fetched;
        self.next_offset += fetched;
    }
}

/// Pulls pages until the cursor is exhausted, normalizing each row and
/// dispatching the surviving records before the next page is fetched.
///
/// Transform failures and write failures are isolated per row and
/// recorded in `state`; only a failing page fetch aborts the run.
pub(crate) async fn drain_pages<F>(
    mut fetch: F,
    columns: &[PoiColumn],
    batch_size: usize,
    sink: &mut dyn PoiSink,
    state: &mut RunState,
) -> Result<(), OvertureError>
where
    F: FnMut(usize) -> Result<Vec<RawRow>, OvertureError>,
{
    loop {
        let rows = fetch(batch_size)?;
        if rows.is_empty() {
            break;
        }
        let fetched = rows.len();

        let mut batch = Vec::with_capacity(fetched);
        for row in &rows {
            match normalize(row, columns) {
                Ok(record) => batch.push(record),
                Err(e) => state.record_error(format!("transform error: {e}")),
            }
        }

        if !batch.is_empty() {
            let outcome = sink.upsert_batch(&batch).await;
            state.absorb(outcome);
        }

        state.advance(fetched);
        println!("  {} / {} rows processed", state.processed, state.total);
    }
    Ok(())
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
