//! Common utilities for mongo-helper
//!
//! This crate provides the error type shared by the mongo-helper crates.

pub mod error;

pub use error::{MongoHelperError, Result};
