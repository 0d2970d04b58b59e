use std::fmt;

/// Runtime configuration assembled from the environment.
///
/// Destination credentials are optional at load time: `count` and
/// `export` never touch a destination, and the import driver validates
/// the credentials for whichever backend was selected before any dataset
/// work begins.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_service_key: Option<String>,
    pub log_level: String,
    pub overture_release: String,
    pub s3_region: String,
    pub batch_size: usize,
    pub http_timeout_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url.as_ref().map(|_| "[redacted]"))
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_service_key",
                &self.supabase_service_key.as_ref().map(|_| "[redacted]"),
            )
            .field("log_level", &self.log_level)
            .field("overture_release", &self.overture_release)
            .field("s3_region", &self.s3_region)
            .field("batch_size", &self.batch_size)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
