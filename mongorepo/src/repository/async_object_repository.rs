use async_trait::async_trait;

use crate::errors::RepositoryResult;
use crate::filter::Predicate;

use super::{AsyncMongoRepository, AsyncRepository, Entity, EntityStream, InMemoryRepository};

macro_rules! dispatch {
    ($self:ident, $repository:ident => $call:expr) => {
        match $self {
            AsyncObjectRepository::InMemory($repository) => $call,
            AsyncObjectRepository::MongoDb($repository) => $call,
        }
    };
}

/// Asynchronous counterpart of [`super::ObjectRepository`].
pub enum AsyncObjectRepository<T: Entity> {
    InMemory(InMemoryRepository<T>),
    MongoDb(AsyncMongoRepository<T>),
}

impl<T: Entity> AsyncObjectRepository<T> {
    pub fn is_in_memory(&self) -> bool {
        matches!(self, AsyncObjectRepository::InMemory(_))
    }
}

impl<T: Entity> From<InMemoryRepository<T>> for AsyncObjectRepository<T> {
    fn from(repository: InMemoryRepository<T>) -> Self {
        AsyncObjectRepository::InMemory(repository)
    }
}

impl<T: Entity> From<AsyncMongoRepository<T>> for AsyncObjectRepository<T> {
    fn from(repository: AsyncMongoRepository<T>) -> Self {
        AsyncObjectRepository::MongoDb(repository)
    }
}

#[async_trait]
impl<T: Entity> AsyncRepository<T> for AsyncObjectRepository<T> {
    async fn get_by_id(&self, id: &T::Id) -> RepositoryResult<T> {
        dispatch!(self, repository => repository.get_by_id(id).await)
    }

    async fn add(&mut self, entity: T) -> RepositoryResult<T> {
        dispatch!(self, repository => repository.add(entity).await)
    }

    async fn add_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>> {
        dispatch!(self, repository => repository.add_many(entities).await)
    }

    async fn add_or_update(&mut self, entity: T) -> RepositoryResult<T> {
        dispatch!(self, repository => repository.add_or_update(entity).await)
    }

    async fn add_or_update_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>> {
        dispatch!(self, repository => repository.add_or_update_many(entities).await)
    }

    async fn update(&mut self, entity: T) -> RepositoryResult<T> {
        dispatch!(self, repository => repository.update(entity).await)
    }

    async fn update_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>> {
        dispatch!(self, repository => repository.update_many(entities).await)
    }

    async fn delete_by_id(&mut self, id: &T::Id) -> RepositoryResult<()> {
        dispatch!(self, repository => repository.delete_by_id(id).await)
    }

    async fn delete(&mut self, entity: &T) -> RepositoryResult<()> {
        dispatch!(self, repository => repository.delete(entity).await)
    }

    async fn delete_where<P: Predicate<T>>(&mut self, predicate: P) -> RepositoryResult<u64> {
        dispatch!(self, repository => repository.delete_where(predicate).await)
    }

    async fn delete_all(&mut self) -> RepositoryResult<u64> {
        dispatch!(self, repository => repository.delete_all().await)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        dispatch!(self, repository => repository.count().await)
    }

    async fn count_where<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<u64> {
        dispatch!(self, repository => repository.count_where(predicate).await)
    }

    async fn exists<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<bool> {
        dispatch!(self, repository => repository.exists(predicate).await)
    }

    async fn find<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<EntityStream<T>> {
        dispatch!(self, repository => repository.find(predicate).await)
    }

    async fn find_all(&self) -> RepositoryResult<EntityStream<T>> {
        dispatch!(self, repository => repository.find_all().await)
    }

    fn collection_name(&self) -> &str {
        dispatch!(self, repository => repository.collection_name())
    }
}
