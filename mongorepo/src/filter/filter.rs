use bson::Document;
use std::any::Any;
use std::fmt::Display;
use std::ops::Deref;
use std::sync::Arc;

use crate::common::DOC_ID;
use crate::errors::RepositoryResult;
use crate::repository::{id_value, Entity};

use super::AllFilter;
use super::AndFilter;
use super::EqualsFilter;
use super::NotFilter;
use super::OrFilter;

/// Trait for implementing custom filters.
///
/// A `FilterProvider` defines how a filter condition is evaluated against a document
/// in memory and how it is expressed as a native MongoDB query document, so the same
/// filter gives the same answer on both repository backends.
pub trait FilterProvider: Any + Send + Sync + Display {
    /// Applies the filter to a document and returns whether it matches.
    ///
    /// # Arguments
    ///
    /// * `entry` - The document to evaluate
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the document matches the filter, `Ok(false)` otherwise
    fn apply(&self, entry: &Document) -> RepositoryResult<bool>;

    /// Translates the filter into a MongoDB query document.
    fn to_query(&self) -> RepositoryResult<Document>;

    fn as_any(&self) -> &dyn Any;
}

/// A query filter over the serialized form of an entity.
///
/// `Filter` encapsulates filter logic through a provider pattern. Filters are passed to
/// repository methods such as `find`, `exists` and `delete_where`, and are the predicate
/// shape that both backends understand.
///
/// # Filter Composition
///
/// Filters can be composed using logical operators:
/// - `and(other)` - Combines with another filter using logical AND
/// - `or(other)` - Combines with another filter using logical OR
/// - `not()` - Negates the filter using logical NOT
#[derive(Clone)]
pub struct Filter {
    inner: Arc<dyn FilterProvider>,
}

impl Filter {
    /// Creates a new filter from a filter provider implementation.
    pub fn new<T: FilterProvider + 'static>(inner: T) -> Self {
        Filter {
            inner: Arc::new(inner),
        }
    }

    /// Combines this filter with another using logical AND.
    pub fn and(&self, filter: Filter) -> Self {
        Filter::new(AndFilter::new(vec![self.clone(), filter]))
    }

    /// Combines this filter with another using logical OR.
    pub fn or(&self, filter: Filter) -> Self {
        Filter::new(OrFilter::new(vec![self.clone(), filter]))
    }

    /// Negates this filter using logical NOT.
    pub fn not(&self) -> Self {
        Filter::new(NotFilter::new(self.clone()))
    }
}

impl Display for Filter {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter{}", self.inner)
    }
}

impl Deref for Filter {
    type Target = Arc<dyn FilterProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Creates a filter that matches all entities.
pub fn all() -> Filter {
    Filter::new(AllFilter)
}

/// Creates a filter that matches an entity by its identifier.
///
/// The identifier is converted the same way the repository stores it, so a text id
/// of a legacy object-id entity matches the stored 12-byte value.
///
/// # Errors
///
/// Returns `InvalidId` when a legacy object id is not valid hexadecimal.
pub fn by_id<T: Entity>(id: &T::Id) -> RepositoryResult<Filter> {
    Ok(Filter::new(EqualsFilter::new(
        DOC_ID.to_string(),
        id_value::<T>(id)?,
    )))
}

/// Combines multiple filters using logical AND.
pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::new(AndFilter::new(filters))
}

/// Combines multiple filters using logical OR.
pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::new(OrFilter::new(filters))
}

/// Negates a filter using logical NOT.
pub fn not(filter: Filter) -> Filter {
    Filter::new(NotFilter::new(filter))
}
