//! # Connector Configuration
//!
//! Environment-driven defaults for the connector. Nothing here is required
//! at runtime — sources carry their own batch size — but embedding
//! applications usually want one place to read the database URL and a
//! deployment-wide default batch size from.

use crate::connector::descriptor::DEFAULT_BATCH_SIZE;
use crate::error::{Result, SourceError};

#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    pub database_url: String,
    pub default_batch_size: i64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://localhost/dataflow_source_development".to_string(),
            default_batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ConnectorConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(db_url) = std::env::var("DATABASE_URL") {
            config.database_url = db_url;
        }

        if let Ok(batch_size) = std::env::var("DATAFLOW_SOURCE_BATCH_SIZE") {
            config.default_batch_size = batch_size.parse().map_err(|e| {
                SourceError::configuration(format!("Invalid default_batch_size: {e}"))
            })?;
            if config.default_batch_size < 1 {
                return Err(SourceError::configuration(format!(
                    "default_batch_size must be positive, got {}",
                    config.default_batch_size
                )));
            }
        }

        Ok(config)
    }
}
