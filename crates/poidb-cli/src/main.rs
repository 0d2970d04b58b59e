//! Command line entry point for the Overture POI toolkit.
//!
//! `import` is the batch pipeline; `count` and `export` are one-shot
//! queries sharing the same filter and planner. Fatal startup problems
//! (bad config, missing credentials, unreachable destination) surface
//! as a non-zero exit; a declined confirmation is a clean exit with no
//! writes.

mod count;
mod export;
mod import;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "poidb")]
#[command(about = "Overture Maps places importer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import POIs from the Overture places theme into the destination store
    Import(import::ImportArgs),
    /// Count POIs matching the standing import filter
    Count {
        /// Filter by primary category
        #[arg(long)]
        category: Option<String>,
        /// Filter by state (e.g., IL)
        #[arg(long)]
        state: Option<String>,
    },
    /// Export POIs within a bounding box to a GeoJSON file
    Export(export::ExportArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = poidb_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Import(args) => import::run_import(&config, args).await,
        Commands::Count { category, state } => count::run_count(&config, category, state),
        Commands::Export(args) => export::run_export(&config, args),
    }
}
