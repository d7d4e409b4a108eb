//! Mapping stored records onto application models
//!
//! Every record leaves the store with its primary key under `_id`. Before a
//! factory sees it the key is renamed to the logical `id`, so models never
//! deal with the store's alias.
//!
//! # Example
//!
//! ```ignore
//! use bson::oid::ObjectId;
//! use serde::Deserialize;
//! use mongo_helper::{Model, UnknownFieldPolicy};
//!
//! #[derive(Debug, Deserialize)]
//! struct Player {
//!     id: ObjectId,
//!     name: String,
//!     score: i32,
//! }
//!
//! impl Model for Player {
//!     fn fields() -> &'static [&'static str] {
//!         &["id", "name", "score"]
//!     }
//! }
//! ```

use crate::filter::{ID_FIELD, PRIMARY_KEY_FIELD};
use bson::Document as BsonDocument;
use mongo_helper_common::{MongoHelperError, Result};
use serde::de::DeserializeOwned;
use std::any::type_name;
use std::marker::PhantomData;

/// Constructs one application object from one record's fields
pub trait ModelFactory: Send + Sync {
    /// Type produced for every record
    type Model: Send;

    /// Build a model from a record whose primary key is already under `id`
    fn build(&self, fields: BsonDocument) -> Result<Self::Model>;
}

/// What to do with record fields a model does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFieldPolicy {
    /// Fail the mapping with a `Mapping` error
    #[default]
    Reject,
    /// Drop the field before deserializing
    Ignore,
}

/// A model with a declared field schema
pub trait Model: DeserializeOwned + Send {
    /// Every field the model accepts, including `id`
    fn fields() -> &'static [&'static str];

    /// Fields that must be present in the record
    fn required_fields() -> &'static [&'static str] {
        Self::fields()
    }

    fn unknown_fields() -> UnknownFieldPolicy {
        UnknownFieldPolicy::Reject
    }
}

/// Factory for any [`Model`]: checks the schema, then deserializes
pub struct TypedFactory<M> {
    _model: PhantomData<fn() -> M>,
}

impl<M> TypedFactory<M> {
    pub fn new() -> Self {
        Self {
            _model: PhantomData,
        }
    }
}

impl<M> Default for TypedFactory<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> std::fmt::Debug for TypedFactory<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedFactory")
            .field("model", &type_name::<M>())
            .finish()
    }
}

impl<M: Model> ModelFactory for TypedFactory<M> {
    type Model = M;

    fn build(&self, mut fields: BsonDocument) -> Result<M> {
        if let Some(missing) = M::required_fields()
            .iter()
            .find(|name| !fields.contains_key(**name))
        {
            return Err(MongoHelperError::Mapping(format!(
                "{} is missing required field '{}'",
                type_name::<M>(),
                missing
            )));
        }

        let declared = M::fields();
        let unknown: Vec<String> = fields
            .keys()
            .filter(|key| !declared.contains(&key.as_str()))
            .cloned()
            .collect();

        if !unknown.is_empty() {
            match M::unknown_fields() {
                UnknownFieldPolicy::Reject => {
                    return Err(MongoHelperError::Mapping(format!(
                        "{} got unexpected field(s): {}",
                        type_name::<M>(),
                        unknown.join(", ")
                    )));
                }
                UnknownFieldPolicy::Ignore => {
                    for key in &unknown {
                        fields.remove(key);
                    }
                }
            }
        }

        bson::from_document(fields).map_err(|e| {
            MongoHelperError::Mapping(format!("{}: {}", type_name::<M>(), e))
        })
    }
}

/// Factory backed by a closure
pub struct FnFactory<F> {
    build: F,
}

impl<F> FnFactory<F> {
    pub fn new(build: F) -> Self {
        Self { build }
    }
}

impl<F, M> ModelFactory for FnFactory<F>
where
    F: Fn(BsonDocument) -> Result<M> + Send + Sync,
    M: Send,
{
    type Model = M;

    fn build(&self, fields: BsonDocument) -> Result<M> {
        (self.build)(fields)
    }
}

/// Identity factory: hands back the renamed record untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDocuments;

impl ModelFactory for RawDocuments {
    type Model = BsonDocument;

    fn build(&self, fields: BsonDocument) -> Result<BsonDocument> {
        Ok(fields)
    }
}

/// Move the store's primary key to the logical `id` field
pub fn rename_primary_key(record: &mut BsonDocument) {
    if let Some(id) = record.remove(PRIMARY_KEY_FIELD) {
        record.insert(ID_FIELD, id);
    }
}
