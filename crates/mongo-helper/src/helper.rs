//! Object-style operations on a single collection
//!
//! `MongoHelper` pairs one collection with one [`ModelFactory`]. The single
//! field lookups, writes and counts are thin wrappers over the driver and
//! return raw documents; [`MongoHelper::query`] is the paginated read that
//! maps records onto models.

use crate::connection::Connection;
use crate::filter::{comparison_filter, eq_filter, Comparison};
use crate::model::ModelFactory;
use crate::query::{map_records, projection_document, QueryBuilder, QueryResult};
use crate::validation::ValidatedCollectionName;
use bson::{doc, Bson, Document as BsonDocument};
use futures::TryStreamExt;
use mongo_helper_common::{MongoHelperError, Result};
use mongodb::options::FindOptions;
use mongodb::results::{DeleteResult, UpdateResult};
use mongodb::Collection;
use serde::Serialize;
use tracing::{debug, instrument};

/// Helper bound to one collection and one model factory
pub struct MongoHelper<F> {
    collection: Collection<BsonDocument>,
    collection_name: ValidatedCollectionName,
    factory: F,
}

impl<F> std::fmt::Debug for MongoHelper<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoHelper")
            .field("collection", &self.collection_name.as_str())
            .finish()
    }
}

impl<F: ModelFactory> MongoHelper<F> {
    /// Bind `collection` in the connection's database
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the collection name is not acceptable.
    pub fn new(connection: &Connection, collection: &str, factory: F) -> Result<Self> {
        let collection_name = ValidatedCollectionName::new(collection)?;
        Ok(Self {
            collection: connection.get_collection(collection_name.as_str()),
            collection_name,
            factory,
        })
    }

    /// Name of the bound collection
    pub fn collection_name(&self) -> &str {
        self.collection_name.as_str()
    }

    /// Underlying driver collection
    pub fn collection(&self) -> &Collection<BsonDocument> {
        &self.collection
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Insert a document, returning the generated (or supplied) `_id`
    #[instrument(skip(self, data), fields(collection = %self.collection_name))]
    pub async fn insert(&self, data: BsonDocument) -> Result<Bson> {
        let result = self.collection.insert_one(data).await?;
        Ok(result.inserted_id)
    }

    /// Serialize `value` to BSON and insert it
    #[instrument(skip(self, value), fields(collection = %self.collection_name))]
    pub async fn insert_serialized<T: Serialize>(&self, value: &T) -> Result<Bson> {
        let data = bson::to_document(value)?;
        self.insert(data).await
    }

    /// First document where `field == value`
    #[instrument(skip(self, value), fields(collection = %self.collection_name))]
    pub async fn find_one_by(
        &self,
        field: &str,
        value: impl Into<Bson>,
    ) -> Result<Option<BsonDocument>> {
        let filter = eq_filter(field, value)?;
        Ok(self.collection.find_one(filter).await?)
    }

    /// First document where `field > value` (`>=` when `or_equal`)
    #[instrument(skip(self, value), fields(collection = %self.collection_name))]
    pub async fn find_greater_than(
        &self,
        field: &str,
        value: impl Into<Bson>,
        or_equal: bool,
    ) -> Result<Option<BsonDocument>> {
        let filter = comparison_filter(field, Comparison::greater(or_equal), value)?;
        Ok(self.collection.find_one(filter).await?)
    }

    /// First document where `field < value` (`<=` when `or_equal`)
    #[instrument(skip(self, value), fields(collection = %self.collection_name))]
    pub async fn find_less_than(
        &self,
        field: &str,
        value: impl Into<Bson>,
        or_equal: bool,
    ) -> Result<Option<BsonDocument>> {
        let filter = comparison_filter(field, Comparison::less(or_equal), value)?;
        Ok(self.collection.find_one(filter).await?)
    }

    /// Every document matching `filter` (all documents when `None`)
    #[instrument(skip(self, filter), fields(collection = %self.collection_name))]
    pub async fn find(&self, filter: Option<BsonDocument>) -> Result<Vec<BsonDocument>> {
        let cursor = self.collection.find(filter.unwrap_or_default()).await?;
        Ok(cursor.try_collect().await?)
    }

    /// First document matching `filter`
    #[instrument(skip(self, filter), fields(collection = %self.collection_name))]
    pub async fn find_one(&self, filter: BsonDocument) -> Result<Option<BsonDocument>> {
        Ok(self.collection.find_one(filter).await?)
    }

    /// Documents reduced to `selected_fields`
    ///
    /// `condition` narrows to `field == value`; `None` matches everything.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `selected_fields` is empty.
    #[instrument(skip(self, condition), fields(collection = %self.collection_name))]
    pub async fn find_specific_fields(
        &self,
        condition: Option<(&str, Bson)>,
        selected_fields: &[&str],
    ) -> Result<Vec<BsonDocument>> {
        if selected_fields.is_empty() {
            return Err(MongoHelperError::Validation(
                "selected_fields: must specify at least one field".to_string(),
            ));
        }
        let fields: Vec<String> = selected_fields.iter().map(|f| f.to_string()).collect();

        let filter = match condition {
            Some((field, value)) => eq_filter(field, value)?,
            None => BsonDocument::new(),
        };

        let mut options = FindOptions::default();
        options.projection = Some(projection_document(&fields)?);

        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// `$set` the given `changes` on the first document where `field == value`
    #[instrument(skip(self, value, changes), fields(collection = %self.collection_name))]
    pub async fn update_one_doc(
        &self,
        field: &str,
        value: impl Into<Bson>,
        changes: BsonDocument,
    ) -> Result<UpdateResult> {
        let filter = eq_filter(field, value)?;
        let result = self
            .collection
            .update_one(filter, doc! { "$set": changes })
            .await?;
        debug!(
            matched = result.matched_count,
            modified = result.modified_count,
            "Update complete"
        );
        Ok(result)
    }

    /// `$set` the given `changes` on every document where `field == value`
    #[instrument(skip(self, value, changes), fields(collection = %self.collection_name))]
    pub async fn update_many_doc(
        &self,
        field: &str,
        value: impl Into<Bson>,
        changes: BsonDocument,
    ) -> Result<UpdateResult> {
        let filter = eq_filter(field, value)?;
        let result = self
            .collection
            .update_many(filter, doc! { "$set": changes })
            .await?;
        debug!(
            matched = result.matched_count,
            modified = result.modified_count,
            "Update complete"
        );
        Ok(result)
    }

    /// Delete the first document where `field == value`
    #[instrument(skip(self, value), fields(collection = %self.collection_name))]
    pub async fn delete_one_doc(&self, field: &str, value: impl Into<Bson>) -> Result<DeleteResult> {
        let filter = eq_filter(field, value)?;
        let result = self.collection.delete_one(filter).await?;
        debug!(deleted = result.deleted_count, "Delete complete");
        Ok(result)
    }

    /// Drop the whole collection
    #[instrument(skip(self), fields(collection = %self.collection_name))]
    pub async fn drop_collection(&self) -> Result<()> {
        self.collection.drop().await?;
        Ok(())
    }

    /// Run a paginated query and map every record through the factory
    ///
    /// Returns [`QueryResult::NoResults`] when nothing matched, a single
    /// model when `first_record` was requested, and the page otherwise.
    #[instrument(skip(self, query), fields(collection = %self.collection_name))]
    pub async fn query(&self, query: QueryBuilder) -> Result<QueryResult<F::Model>> {
        let plan = query.build()?;

        let cursor = self
            .collection
            .find(plan.filter.unwrap_or_default())
            .with_options(plan.options)
            .await?;
        let records: Vec<BsonDocument> = cursor.try_collect().await?;

        debug!(records = records.len(), "Query returned");
        map_records(records, &self.factory, plan.first_record)
    }

    /// Total number of documents in the collection
    #[instrument(skip(self), fields(collection = %self.collection_name))]
    pub async fn get_document_count(&self) -> Result<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}
