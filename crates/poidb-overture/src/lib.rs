//! Source-side access to the Overture Maps places theme.
//!
//! Wraps an embedded DuckDB engine with the `spatial` and `httpfs`
//! extensions to query the partitioned parquet release on S3. The
//! column contract in [`columns`] is shared by the query planner and
//! the record normalizer so the projection order and the field mapping
//! cannot drift apart.

pub mod client;
pub mod columns;
pub mod error;
pub mod normalize;
pub mod query;

pub use client::{fetch_page, OvertureClient};
pub use columns::{PoiColumn, EXPORT_COLUMNS, IMPORT_COLUMNS};
pub use error::{OvertureError, TransformError};
pub use normalize::{normalize, RawRow};
pub use query::{build_count_query, build_query};

// Re-exported so downstream crates can hold cursors and build fixture
// rows without a direct dependency on the engine.
pub use duckdb;
