use bson::Document;
use serde::Serialize;

use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};

use super::{Filter, FilterProvider};

/// A condition over one entity, accepted by every querying repository method.
///
/// # Purpose
/// Narrow capability passed across the repository boundary instead of an arbitrary
/// expression tree. The in-memory backend calls [`Predicate::matches`] for each entity;
/// the MongoDB backend calls [`Predicate::to_query`] and sends the result to the server.
///
/// # Supported shapes
/// - [`Filter`] values built with [`crate::filter::field`] and the logical combinators
///   work on both backends
/// - closures `Fn(&T) -> bool` are evaluated in memory only; the MongoDB backend
///   rejects them with `UnsupportedPredicate`
///
/// # Usage
/// ```ignore
/// repository.delete_where(field("price").gte(3))?;
/// repository.exists(|customer: &Customer| customer.name.starts_with("Client"))?;
/// ```
pub trait Predicate<T>: Send + Sync {
    /// Evaluates the predicate against one entity.
    fn matches(&self, entity: &T) -> RepositoryResult<bool>;

    /// Returns the equivalent MongoDB query document.
    fn to_query(&self) -> RepositoryResult<Document> {
        log::error!("Predicate cannot be translated to a MongoDB query");
        Err(RepositoryError::new(
            "Predicate cannot be translated to a MongoDB query, use a Filter instead",
            ErrorKind::UnsupportedPredicate,
        ))
    }
}

impl<T, F> Predicate<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    #[inline]
    fn matches(&self, entity: &T) -> RepositoryResult<bool> {
        Ok(self(entity))
    }
}

impl<T: Serialize> Predicate<T> for Filter {
    fn matches(&self, entity: &T) -> RepositoryResult<bool> {
        let document = bson::to_document(entity)?;
        FilterProvider::apply(&***self, &document)
    }

    fn to_query(&self) -> RepositoryResult<Document> {
        FilterProvider::to_query(&***self)
    }
}
