//! Single-field filter documents used by the lookup helpers

use crate::validation::ValidatedFieldName;
use bson::{Bson, Document as BsonDocument};
use mongo_helper_common::Result;

/// Logical identifier field exposed to models
pub const ID_FIELD: &str = "id";

/// Store's reserved primary-key field
pub const PRIMARY_KEY_FIELD: &str = "_id";

/// Map the logical `id` onto the store's primary key; other names pass through
pub fn resolve_field_alias(field: &str) -> &str {
    if field == ID_FIELD {
        PRIMARY_KEY_FIELD
    } else {
        field
    }
}

/// Range comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Greater than ($gt)
    Gt,
    /// Greater than or equal ($gte)
    Gte,
    /// Less than ($lt)
    Lt,
    /// Less than or equal ($lte)
    Lte,
}

impl Comparison {
    /// `$gte` when `or_equal`, otherwise `$gt`
    pub fn greater(or_equal: bool) -> Self {
        if or_equal {
            Comparison::Gte
        } else {
            Comparison::Gt
        }
    }

    /// `$lte` when `or_equal`, otherwise `$lt`
    pub fn less(or_equal: bool) -> Self {
        if or_equal {
            Comparison::Lte
        } else {
            Comparison::Lt
        }
    }

    /// Returns the query operator string.
    pub fn as_operator(&self) -> &'static str {
        match self {
            Comparison::Gt => "$gt",
            Comparison::Gte => "$gte",
            Comparison::Lt => "$lt",
            Comparison::Lte => "$lte",
        }
    }
}

/// `{field: value}`
pub fn eq_filter(field: &str, value: impl Into<Bson>) -> Result<BsonDocument> {
    let field = ValidatedFieldName::new(field)?;
    let mut filter = BsonDocument::new();
    filter.insert(field.into_string(), value);
    Ok(filter)
}

/// `{field: {op: value}}`
pub fn comparison_filter(
    field: &str,
    comparison: Comparison,
    value: impl Into<Bson>,
) -> Result<BsonDocument> {
    let field = ValidatedFieldName::new(field)?;
    let mut condition = BsonDocument::new();
    condition.insert(comparison.as_operator(), value);

    let mut filter = BsonDocument::new();
    filter.insert(field.into_string(), condition);
    Ok(filter)
}
