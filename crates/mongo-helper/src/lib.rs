//! Object-style helper over a single MongoDB collection
//!
//! This crate wraps the `mongodb` driver with collection-level convenience
//! methods and a paginated query that maps records onto caller models.
//!
//! # Features
//! - Explicit connection lifecycle (`Connection::connect` / `shutdown`)
//! - Environment-driven configuration
//! - Paginated queries with filter, single-field sort and projection
//! - `id` ⇄ `_id` aliasing for sorting and result mapping
//! - Schema-checked model mapping with an explicit unknown-field policy
//!
//! # Example
//!
//! ```ignore
//! use mongo_helper::{Connection, MongoConfig, MongoHelper, QueryBuilder, SortDirection, TypedFactory};
//!
//! let connection = Connection::connect(&MongoConfig::from_env()?).await?;
//! let players = MongoHelper::new(&connection, "players", TypedFactory::<Player>::new())?;
//!
//! let top = players
//!     .query(QueryBuilder::new().sort("score", SortDirection::Descending).page_size(10))
//!     .await?;
//!
//! connection.shutdown().await;
//! ```

pub mod config;
pub mod connection;
pub mod filter;
pub mod helper;
pub mod model;
pub mod query;
pub mod validation;

pub use config::MongoConfig;
pub use connection::{Connection, PoolConfig};
pub use filter::{comparison_filter, eq_filter, resolve_field_alias, Comparison, ID_FIELD, PRIMARY_KEY_FIELD};
pub use helper::MongoHelper;
pub use model::{FnFactory, Model, ModelFactory, RawDocuments, TypedFactory, UnknownFieldPolicy};
pub use mongo_helper_common::{MongoHelperError, Result};
pub use query::{map_records, FindPlan, QueryBuilder, QueryResult, SortDirection, DEFAULT_PAGE_SIZE, NATURAL_ORDER};
pub use validation::{ValidatedCollectionName, ValidatedFieldName};
