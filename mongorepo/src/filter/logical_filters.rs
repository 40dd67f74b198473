use bson::{Bson, Document};
use std::{any::Any, fmt::Display};

use crate::{
    common::util::create_document,
    common::{OP_AND, OP_NOR, OP_OR},
    errors::RepositoryResult,
};

use super::{Filter, FilterProvider};

fn join_filters(filters: &[Filter], separator: &str) -> String {
    filters
        .iter()
        .map(|filter| filter.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

fn query_array(filters: &[Filter]) -> RepositoryResult<Bson> {
    let mut queries = Vec::with_capacity(filters.len());
    for filter in filters {
        queries.push(Bson::Document(filter.to_query()?));
    }
    Ok(Bson::Array(queries))
}

/// A filter that applies logical AND operation on multiple filters.
///
/// Evaluation short-circuits at the first filter that fails.
/// An empty AND matches everything.
pub(crate) struct AndFilter {
    filters: Vec<Filter>,
}

impl AndFilter {
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        AndFilter { filters }
    }
}

impl Display for AndFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", join_filters(&self.filters, " && "))
    }
}

impl FilterProvider for AndFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> RepositoryResult<bool> {
        for filter in &self.filters {
            if !filter.apply(entry)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn to_query(&self) -> RepositoryResult<Document> {
        // the server rejects an empty $and
        if self.filters.is_empty() {
            return Ok(Document::new());
        }
        Ok(create_document(OP_AND, query_array(&self.filters)?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A filter that applies logical OR operation on multiple filters.
///
/// Evaluation short-circuits at the first filter that succeeds.
/// An empty OR matches nothing.
pub(crate) struct OrFilter {
    filters: Vec<Filter>,
}

impl OrFilter {
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        OrFilter { filters }
    }
}

impl Display for OrFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", join_filters(&self.filters, " || "))
    }
}

impl FilterProvider for OrFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> RepositoryResult<bool> {
        for filter in &self.filters {
            if filter.apply(entry)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn to_query(&self) -> RepositoryResult<Document> {
        if self.filters.is_empty() {
            // matches nothing
            return Ok(create_document(OP_NOR, Bson::Array(vec![Bson::Document(Document::new())])));
        }
        Ok(create_document(OP_OR, query_array(&self.filters)?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A filter that negates another filter.
///
/// Translates to `$nor` with a single clause, which also negates compound filters.
pub(crate) struct NotFilter {
    filter: Filter,
}

impl NotFilter {
    pub(crate) fn new(filter: Filter) -> Self {
        NotFilter { filter }
    }
}

impl Display for NotFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "!({})", self.filter)
    }
}

impl FilterProvider for NotFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> RepositoryResult<bool> {
        Ok(!self.filter.apply(entry)?)
    }

    fn to_query(&self) -> RepositoryResult<Document> {
        Ok(create_document(
            OP_NOR,
            Bson::Array(vec![Bson::Document(self.filter.to_query()?)]),
        ))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
