//! Error types for mongo-helper

use std::sync::Arc;
use thiserror::Error;

/// Result type alias for mongo-helper operations
pub type Result<T> = std::result::Result<T, MongoHelperError>;

/// Unified error type for all mongo-helper operations
#[derive(Error, Debug, Clone)]
pub enum MongoHelperError {
    /// Required configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller input rejected before reaching the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error reported by the MongoDB driver, kept intact
    #[error("MongoDB error: {0}")]
    MongoDB(#[source] Arc<mongodb::error::Error>),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The model factory refused a record's fields
    #[error("Mapping error: {0}")]
    Mapping(String),
}

impl MongoHelperError {
    /// Returns true if the caller's input was rejected before any store call
    pub fn is_validation(&self) -> bool {
        matches!(self, MongoHelperError::Validation(_))
    }

    /// Returns true if the error came from the store or the connection to it
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            MongoHelperError::MongoDB(_) | MongoHelperError::Connection(_)
        )
    }

    /// The driver error, when this came from the store
    pub fn store_error(&self) -> Option<&mongodb::error::Error> {
        match self {
            MongoHelperError::MongoDB(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// The driver's error kind, for matching on duplicate keys, timeouts and the like
    pub fn store_error_kind(&self) -> Option<&mongodb::error::ErrorKind> {
        self.store_error().map(|err| err.kind.as_ref())
    }
}

impl From<mongodb::error::Error> for MongoHelperError {
    fn from(err: mongodb::error::Error) -> Self {
        MongoHelperError::MongoDB(Arc::new(err))
    }
}

impl From<bson::ser::Error> for MongoHelperError {
    fn from(err: bson::ser::Error) -> Self {
        MongoHelperError::Serialization(format!("BSON serialization error: {}", err))
    }
}
