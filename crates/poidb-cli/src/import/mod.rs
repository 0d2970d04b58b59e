//! The import pipeline: count, confirm, stream, upsert, summarize.
//!
//! The destination sink is constructed before anything else so missing
//! credentials or an unreachable store abort with a non-zero exit ahead
//! of any dataset work, and it is closed on every exit path: normal
//! completion, dry-run, declined confirmation, and streaming failure.

mod pipeline;

use std::io::Write as _;

use clap::{Args, ValueEnum};

use poidb_core::{AppConfig, PoiFilter};
use poidb_db::{connect_pool_from_config, PoiSink, PostgresSink, SupabaseSink};
use poidb_overture::{build_count_query, build_query, fetch_page, OvertureClient, IMPORT_COLUMNS};

use pipeline::{drain_pages, RunState};

/// Imports above this many expected rows require interactive
/// confirmation unless `--yes` was passed.
const CONFIRM_THRESHOLD: u64 = 10_000;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Limit number of records to import
    #[arg(long)]
    pub limit: Option<usize>,
    /// Skip N records (for resuming a failed run)
    #[arg(long)]
    pub offset: Option<usize>,
    /// Filter by primary category
    #[arg(long)]
    pub category: Option<String>,
    /// Filter by state (e.g., IL)
    #[arg(long)]
    pub state: Option<String>,
    /// Report the expected count without reading or writing anything
    #[arg(long)]
    pub dry_run: bool,
    /// Skip the confirmation prompt for large imports
    #[arg(long, short = 'y')]
    pub yes: bool,
    /// Destination backend
    #[arg(long, value_enum, default_value_t = Backend::Supabase)]
    pub backend: Backend,
}

/// The two interchangeable destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Supabase client API (PostgREST upsert)
    Supabase,
    /// Direct Postgres connection
    Postgres,
}

pub(crate) async fn run_import(config: &AppConfig, args: ImportArgs) -> anyhow::Result<()> {
    let filter = PoiFilter::us_mainland(args.category.clone(), args.state.clone());

    let mut sink = build_sink(config, args.backend).await?;

    let result = run_pipeline(config, &filter, &args, sink.as_mut()).await;

    if let Err(e) = sink.close().await {
        tracing::warn!(error = %e, "failed to close destination cleanly");
    }
    result
}

/// Constructs the selected destination, validating its credentials.
async fn build_sink(config: &AppConfig, backend: Backend) -> anyhow::Result<Box<dyn PoiSink>> {
    match backend {
        Backend::Supabase => {
            let url = config.supabase_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("SUPABASE_URL is not set; cannot use the supabase backend")
            })?;
            let key = config.supabase_service_key.as_deref().ok_or_else(|| {
                anyhow::anyhow!(
                    "SUPABASE_SERVICE_ROLE_KEY is not set; cannot use the supabase backend"
                )
            })?;
            let sink = SupabaseSink::new(url, key, config.http_timeout_secs)?;
            println!("Using Supabase destination at {url}");
            Ok(Box::new(sink))
        }
        Backend::Postgres => {
            let pool = connect_pool_from_config(config).await?;
            println!("Connected to Postgres destination");
            Ok(Box::new(PostgresSink::new(pool)))
        }
    }
}

async fn run_pipeline(
    config: &AppConfig,
    filter: &PoiFilter,
    args: &ImportArgs,
    sink: &mut dyn PoiSink,
) -> anyhow::Result<()> {
    let client = OvertureClient::connect(&config.overture_release, &config.s3_region)?;

    println!("Counting records to import...");
    let expected = client.count(&build_count_query(filter, client.places_path()))?;
    let total = clamp_total(expected, args.limit);
    println!("Records to import: {total}");

    if args.dry_run {
        println!("dry-run: no records were read or written");
        return Ok(());
    }

    if needs_confirmation(total, args.yes) && !confirm(total)? {
        println!("aborted; no records were written");
        return Ok(());
    }

    let query = build_query(
        filter,
        IMPORT_COLUMNS,
        client.places_path(),
        args.limit,
        args.offset,
    );

    println!("Importing in batches of {}...", config.batch_size);
    let mut stmt = client.prepare(&query)?;
    let mut rows = stmt.query([])?;

    let mut state = RunState::new(total, args.offset.unwrap_or(0));
    drain_pages(
        |page_size| fetch_page(&mut rows, IMPORT_COLUMNS.len(), page_size),
        IMPORT_COLUMNS,
        config.batch_size,
        sink,
        &mut state,
    )
    .await?;

    print_summary(&state, sink.label());
    Ok(())
}

/// The expected total, clamped to the requested row limit if one was
/// given.
fn clamp_total(expected: i64, limit: Option<usize>) -> u64 {
    let expected = u64::try_from(expected).unwrap_or(0);
    match limit {
        Some(limit) => expected.min(u64::try_from(limit).unwrap_or(u64::MAX)),
        None => expected,
    }
}

fn needs_confirmation(total: u64, bypass: bool) -> bool {
    total > CONFIRM_THRESHOLD && !bypass
}

/// Asks the operator to approve a large import. Anything but an
/// explicit `y` declines.
fn confirm(total: u64) -> anyhow::Result<bool> {
    print!("This will upsert {total} records. Continue? [y/N] ");
    std::io::stdout().flush()?;

    let mut reply = String::new();
    std::io::stdin().read_line(&mut reply)?;
    Ok(reply.trim().eq_ignore_ascii_case("y"))
}

fn print_summary(state: &RunState, sink_label: &str) {
    println!("Import complete ({sink_label})");
    println!("  imported/updated: {}", state.imported);
    println!("  errors: {}", state.errors);

    if !state.error_samples.is_empty() {
        println!("Sample errors:");
        for err in &state.error_samples {
            println!("  - {err}");
        }
        println!("Resume past the processed range with --offset {}", state.next_offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_total_applies_the_row_limit() {
        assert_eq!(clamp_total(42, None), 42);
        assert_eq!(clamp_total(42, Some(10)), 10);
        assert_eq!(clamp_total(5, Some(10)), 5);
        assert_eq!(clamp_total(-1, None), 0);
    }

    #[test]
    fn confirmation_triggers_only_above_the_threshold() {
        assert!(!needs_confirmation(10_000, false));
        assert!(needs_confirmation(10_001, false));
        assert!(needs_confirmation(15_000, false));
    }

    #[test]
    fn bypass_flag_skips_confirmation() {
        assert!(!needs_confirmation(15_000, true));
    }
}
