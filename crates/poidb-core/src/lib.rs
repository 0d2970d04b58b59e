//! Domain types and configuration shared across the poidb workspace.

use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod filter;
pub mod record;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use filter::{BoundingBox, FilterError, PoiFilter};
pub use record::{PoiRecord, SOURCE_TYPE_OVERTURE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
