//! Paginated query builder and result mapping
//!
//! A [`QueryBuilder`] captures the logical query (filter, sort, projection,
//! page window). [`QueryBuilder::build`] turns it into a [`FindPlan`] holding
//! exactly the driver options the caller asked for, and [`map_records`]
//! turns the retrieved records into a [`QueryResult`].
//!
//! ```ignore
//! let query = QueryBuilder::new()
//!     .filter(doc! { "active": true })
//!     .sort("score", SortDirection::Descending)
//!     .page(2)
//!     .page_size(20);
//! let players = helper.query(query).await?;
//! ```

use crate::filter::resolve_field_alias;
use crate::model::{rename_primary_key, ModelFactory};
use crate::validation::ValidatedFieldName;
use bson::Document as BsonDocument;
use mongo_helper_common::{MongoHelperError, Result};
use mongodb::options::FindOptions;
use tracing::debug;

/// Default number of records per page
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Sort key for the store's natural (insertion) order
pub const NATURAL_ORDER: &str = "$natural";

/// Sort direction for the single sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending (1)
    #[default]
    Ascending,
    /// Descending (-1)
    Descending,
}

impl SortDirection {
    /// Returns the direction value understood by the store.
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// Logical description of one paginated read
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    filter: Option<BsonDocument>,
    sort: Option<(String, SortDirection)>,
    returned_fields: Option<Vec<String>>,
    no_cursor_timeout: bool,
    first_record: bool,
    page_number: u64,
    page_size: u64,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    /// Match everything, store order, first page of 100
    pub fn new() -> Self {
        Self {
            filter: None,
            sort: None,
            returned_fields: None,
            no_cursor_timeout: false,
            first_record: false,
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the filter document
    pub fn filter(mut self, filter: BsonDocument) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sort by a single field; `"id"` sorts by the primary key
    ///
    /// Field names starting with `$` are rejected by [`QueryBuilder::build`],
    /// except [`NATURAL_ORDER`].
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some((field.into(), direction));
        self
    }

    /// Only return these fields (the primary key is always included by the store)
    pub fn returned_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returned_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Keep the server cursor alive past the idle timeout
    pub fn no_cursor_timeout(mut self, enabled: bool) -> Self {
        self.no_cursor_timeout = enabled;
        self
    }

    /// Return only the first mapped record instead of a list
    pub fn first_record(mut self, enabled: bool) -> Self {
        self.first_record = enabled;
        self
    }

    /// 1-based page number
    pub fn page(mut self, page_number: u64) -> Self {
        self.page_number = page_number;
        self
    }

    /// Records per page
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Get the filter document
    pub fn get_filter(&self) -> Option<&BsonDocument> {
        self.filter.as_ref()
    }

    /// Get the sort field and direction
    pub fn get_sort(&self) -> Option<(&str, SortDirection)> {
        self.sort.as_ref().map(|(field, dir)| (field.as_str(), *dir))
    }

    pub fn get_page_number(&self) -> u64 {
        self.page_number
    }

    pub fn get_page_size(&self) -> u64 {
        self.page_size
    }

    pub fn is_first_record(&self) -> bool {
        self.first_record
    }

    /// Records skipped before this page: (page - 1) * page_size
    pub fn skip_count(&self) -> Result<u64> {
        if self.page_number == 0 {
            return Err(MongoHelperError::Validation(
                "page_number must be at least 1".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(MongoHelperError::Validation(
                "page_size must be at least 1".to_string(),
            ));
        }
        (self.page_number - 1)
            .checked_mul(self.page_size)
            .ok_or_else(|| {
                MongoHelperError::Validation(format!(
                    "page_number {} with page_size {} overflows the skip offset",
                    self.page_number, self.page_size
                ))
            })
    }

    /// Translate into driver parameters
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `returned_fields` was given but is empty, a
    /// sort or projection field name is invalid, or the page window is out
    /// of range.
    pub fn build(&self) -> Result<FindPlan> {
        let skip = self.skip_count()?;
        // The driver sends skip as a signed 64-bit integer
        if i64::try_from(skip).is_err() {
            return Err(MongoHelperError::Validation(format!(
                "page_number {} with page_size {} skips past the maximum offset",
                self.page_number, self.page_size
            )));
        }
        let limit = i64::try_from(self.page_size).map_err(|_| {
            MongoHelperError::Validation(format!(
                "page_size {} exceeds the maximum limit",
                self.page_size
            ))
        })?;

        let mut options = FindOptions::default();

        if let Some(fields) = &self.returned_fields {
            options.projection = Some(projection_document(fields)?);
        }

        if self.no_cursor_timeout {
            options.no_cursor_timeout = Some(true);
        }

        if let Some((field, direction)) = &self.sort {
            let key = if field == NATURAL_ORDER {
                NATURAL_ORDER.to_string()
            } else {
                ValidatedFieldName::new(resolve_field_alias(field))?.into_string()
            };
            let mut sort = BsonDocument::new();
            sort.insert(key, direction.as_i32());
            options.sort = Some(sort);
        }

        options.skip = Some(skip);
        options.limit = Some(limit);

        debug!(
            filter = ?self.filter,
            sort = ?options.sort,
            projection = ?options.projection,
            skip,
            limit,
            "Built paginated query"
        );

        Ok(FindPlan {
            filter: self.filter.clone(),
            options,
            first_record: self.first_record,
        })
    }
}

/// `{field: 1, ...}` for the requested fields; `"id"` maps to the primary key
pub fn projection_document(fields: &[String]) -> Result<BsonDocument> {
    if fields.is_empty() {
        return Err(MongoHelperError::Validation(
            "returned_fields: must specify at least one field if projection requested"
                .to_string(),
        ));
    }

    let mut projection = BsonDocument::new();
    for field in fields {
        let field = ValidatedFieldName::new(resolve_field_alias(field))?;
        projection.insert(field.into_string(), 1);
    }
    Ok(projection)
}

/// Driver-ready form of a [`QueryBuilder`]
#[derive(Debug, Clone)]
pub struct FindPlan {
    /// `None` matches every document
    pub filter: Option<BsonDocument>,
    /// Only the options the caller supplied, plus skip/limit
    pub options: FindOptions,
    pub first_record: bool,
}

/// Outcome of a paginated query
///
/// `NoResults` is deliberately distinct from an empty `Records` list: the
/// query never yields `Records(vec![])`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult<M> {
    /// Nothing matched
    NoResults,
    /// First record only, as requested
    First(M),
    /// Every record on the page, in store order
    Records(Vec<M>),
}

impl<M> QueryResult<M> {
    pub fn is_empty(&self) -> bool {
        matches!(self, QueryResult::NoResults)
    }

    /// Number of mapped records carried
    pub fn len(&self) -> usize {
        match self {
            QueryResult::NoResults => 0,
            QueryResult::First(_) => 1,
            QueryResult::Records(records) => records.len(),
        }
    }

    /// Flatten into a list, losing the no-results distinction
    pub fn into_vec(self) -> Vec<M> {
        match self {
            QueryResult::NoResults => Vec::new(),
            QueryResult::First(model) => vec![model],
            QueryResult::Records(records) => records,
        }
    }

    /// Flatten into `None` / `Some(list)`
    pub fn into_option(self) -> Option<Vec<M>> {
        match self {
            QueryResult::NoResults => None,
            other => Some(other.into_vec()),
        }
    }
}

/// Rename the primary key on every record and run it through `factory`
///
/// Mapping errors propagate untouched; no record is skipped.
pub fn map_records<F: ModelFactory>(
    records: Vec<BsonDocument>,
    factory: &F,
    first_record: bool,
) -> Result<QueryResult<F::Model>> {
    let mut mapped = Vec::with_capacity(records.len());
    for mut record in records {
        rename_primary_key(&mut record);
        mapped.push(factory.build(record)?);
    }

    if first_record {
        return Ok(mapped
            .into_iter()
            .next()
            .map_or(QueryResult::NoResults, QueryResult::First));
    }

    if mapped.is_empty() {
        Ok(QueryResult::NoResults)
    } else {
        Ok(QueryResult::Records(mapped))
    }
}
