use thiserror::Error;

/// Errors from the embedded DuckDB engine.
#[derive(Debug, Error)]
pub enum OvertureError {
    /// The `spatial`/`httpfs` extensions could not be installed or loaded.
    #[error("failed to bootstrap DuckDB extensions: {0}")]
    Bootstrap(#[source] duckdb::Error),

    /// Any other engine failure: connection, preparation, or row fetch.
    #[error("DuckDB error: {0}")]
    Duckdb(#[from] duckdb::Error),
}

/// A single row failed normalization into a [`poidb_core::PoiRecord`].
///
/// These are isolated per row by the pipeline driver; they never abort
/// a batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("column count mismatch: expected {expected} values, got {got}")]
    ColumnCount { expected: usize, got: usize },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unexpected {found} value in column {column}")]
    UnexpectedType {
        column: &'static str,
        found: &'static str,
    },
}
