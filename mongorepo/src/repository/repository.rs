use async_trait::async_trait;

use crate::errors::RepositoryResult;
use crate::filter::Predicate;

use super::{require_id, Entity, EntityCursor, EntityStream};

/// A trait for blocking data access over one collection of entities.
///
/// # Purpose
///
/// `Repository` is the uniform CRUD and query surface shared by the in-memory and the
/// MongoDB backends. Application code written against it can swap the backing store
/// without changes.
///
/// # Characteristics
///
/// - **Identifier assignment**: `add` assigns a generated identifier to text-keyed
///   entities that have none; other key types must be supplied by the caller
/// - **Whole-entity writes**: `update` replaces the stored entity, there is no partial patch
/// - **Silent no-ops**: deleting or updating an absent identifier succeeds without effect
/// - **Exclusive mutation**: writes take `&mut self`; sharing a repository between
///   threads requires external synchronization
/// - **Predicates**: querying methods accept any [`Predicate`], either a
///   [`crate::filter::Filter`] (both backends) or a closure (in-memory only)
///
/// # Usage
///
/// ```ignore
/// let mut repository = InMemoryRepository::<Customer>::new();
/// let customer = repository.add(Customer::new("Bob"))?;
/// let loaded = repository.get_by_id(customer.id().unwrap())?;
/// repository.delete_where(field("name").starts_with("Client"))?;
/// ```
pub trait Repository<T: Entity> {
    /// Returns the single entity with the given identifier.
    ///
    /// # Errors
    ///
    /// `NotFound` when nothing matches, `NotUnique` when more than one entity matches.
    fn get_by_id(&self, id: &T::Id) -> RepositoryResult<T>;

    /// Adds an entity, assigning a generated identifier when it has none.
    ///
    /// # Returns
    ///
    /// The entity as stored, with its identifier populated.
    fn add(&mut self, entity: T) -> RepositoryResult<T>;

    /// Adds entities as one batch. Identifiers are assigned before anything is written.
    fn add_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>>;

    /// Adds the entity when it has no identifier, otherwise upserts it by identifier.
    fn add_or_update(&mut self, entity: T) -> RepositoryResult<T>;

    fn add_or_update_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>> {
        let mut result = Vec::with_capacity(entities.len());
        for entity in entities {
            result.push(self.add_or_update(entity)?);
        }
        Ok(result)
    }

    /// Replaces the stored entity with the same identifier.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the entity has no identifier. An identifier that is not
    /// stored is not an error; nothing is written.
    fn update(&mut self, entity: T) -> RepositoryResult<T>;

    /// Replaces each entity by identifier. Every entity is checked for an identifier
    /// before the first write.
    fn update_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>> {
        for entity in &entities {
            require_id(entity)?;
        }

        let mut result = Vec::with_capacity(entities.len());
        for entity in entities {
            result.push(self.update(entity)?);
        }
        Ok(result)
    }

    /// Removes the entity with the given identifier, if present.
    fn delete_by_id(&mut self, id: &T::Id) -> RepositoryResult<()>;

    /// Removes the given entity by its identifier.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the entity has no identifier.
    fn delete(&mut self, entity: &T) -> RepositoryResult<()> {
        let id = require_id(entity)?.clone();
        self.delete_by_id(&id)
    }

    /// Removes every entity matching the predicate and returns how many were removed.
    fn delete_where<P: Predicate<T>>(&mut self, predicate: P) -> RepositoryResult<u64>;

    /// Removes every entity and returns how many were removed.
    fn delete_all(&mut self) -> RepositoryResult<u64>;

    fn count(&self) -> RepositoryResult<u64>;

    /// Counts the entities matching the predicate.
    fn count_where<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<u64>;

    /// Returns true when at least one entity matches the predicate.
    fn exists<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<bool>;

    /// Returns a lazy cursor over the entities matching the predicate.
    fn find<'a, P: Predicate<T> + 'a>(&'a self, predicate: P)
        -> RepositoryResult<EntityCursor<'a, T>>;

    /// Returns a lazy cursor over every entity. Each call starts a fresh scan.
    fn find_all(&self) -> RepositoryResult<EntityCursor<'_, T>>;

    /// Name of the collection this repository reads and writes.
    fn collection_name(&self) -> &str;
}

/// Asynchronous counterpart of [`Repository`].
///
/// Operations have the same semantics as their blocking versions. Backends that do no
/// I/O complete without suspending; the MongoDB backend suspends on the network round
/// trip. Query results are returned as owned streams.
#[async_trait]
pub trait AsyncRepository<T: Entity>: Send + Sync {
    async fn get_by_id(&self, id: &T::Id) -> RepositoryResult<T>;

    async fn add(&mut self, entity: T) -> RepositoryResult<T>;

    async fn add_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>>;

    async fn add_or_update(&mut self, entity: T) -> RepositoryResult<T>;

    async fn add_or_update_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>> {
        let mut result = Vec::with_capacity(entities.len());
        for entity in entities {
            result.push(self.add_or_update(entity).await?);
        }
        Ok(result)
    }

    async fn update(&mut self, entity: T) -> RepositoryResult<T>;

    async fn update_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>> {
        for entity in &entities {
            require_id(entity)?;
        }

        let mut result = Vec::with_capacity(entities.len());
        for entity in entities {
            result.push(self.update(entity).await?);
        }
        Ok(result)
    }

    async fn delete_by_id(&mut self, id: &T::Id) -> RepositoryResult<()>;

    async fn delete(&mut self, entity: &T) -> RepositoryResult<()> {
        let id = require_id(entity)?.clone();
        self.delete_by_id(&id).await
    }

    async fn delete_where<P: Predicate<T>>(&mut self, predicate: P) -> RepositoryResult<u64>;

    async fn delete_all(&mut self) -> RepositoryResult<u64>;

    async fn count(&self) -> RepositoryResult<u64>;

    async fn count_where<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<u64>;

    async fn exists<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<bool>;

    async fn find<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<EntityStream<T>>;

    async fn find_all(&self) -> RepositoryResult<EntityStream<T>>;

    fn collection_name(&self) -> &str;
}
