//! Environment-driven configuration for the store connection

use crate::connection::PoolConfig;
use mongo_helper_common::{MongoHelperError, Result};
use std::env;

/// Environment variable holding the MongoDB connection URI
pub const URI_VAR: &str = "MONGO_DATABASE_URI";
/// Environment variable holding the database name
pub const DATABASE_NAME_VAR: &str = "MONGO_DATABASE_NAME";
/// Optional application name reported to the server
pub const APP_NAME_VAR: &str = "MONGO_APP_NAME";
/// Optional lower bound on pooled connections
pub const MIN_POOL_SIZE_VAR: &str = "MONGO_MIN_POOL_SIZE";
/// Optional upper bound on pooled connections
pub const MAX_POOL_SIZE_VAR: &str = "MONGO_MAX_POOL_SIZE";

/// Connection settings read once at startup
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// MongoDB connection URI
    pub uri: String,
    /// Database every helper operates in
    pub database_name: String,
    /// Driver pool tuning
    pub pool: PoolConfig,
}

impl MongoConfig {
    /// Build a config with default pool settings
    pub fn new(uri: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database_name: database_name.into(),
            pool: PoolConfig::default(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if `MONGO_DATABASE_URI` or `MONGO_DATABASE_NAME`
    /// is missing, or an optional pool size is not an integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let uri = required(&lookup, URI_VAR)?;
        let database_name = required(&lookup, DATABASE_NAME_VAR)?;

        let mut pool = PoolConfig::default();
        if let Some(app_name) = lookup(APP_NAME_VAR).filter(|v| !v.is_empty()) {
            pool.app_name = Some(app_name);
        }
        if let Some(min) = parse_u32(&lookup, MIN_POOL_SIZE_VAR)? {
            pool.min_pool_size = Some(min);
        }
        if let Some(max) = parse_u32(&lookup, MAX_POOL_SIZE_VAR)? {
            pool.max_pool_size = Some(max);
        }

        Ok(Self {
            uri,
            database_name,
            pool,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(MongoHelperError::Configuration(format!(
            "Please set {} and {} in the environment ({} is missing)",
            URI_VAR, DATABASE_NAME_VAR, key
        ))),
    }
}

fn parse_u32<F>(lookup: &F, key: &str) -> Result<Option<u32>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            MongoHelperError::Configuration(format!(
                "{} must be a non-negative integer, got '{}'",
                key, raw
            ))
        }),
    }
}
