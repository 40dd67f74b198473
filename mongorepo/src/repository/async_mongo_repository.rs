use async_trait::async_trait;
use bson::Document;
use futures::stream::{StreamExt, TryStreamExt};
use mongodb::{Client, Collection, Database};

use crate::errors::RepositoryResult;
use crate::filter::Predicate;

use super::mongo_repository::{
    backend_error, default_connection_string, missing_database, not_found, not_unique,
};
use super::{
    collection_name, ensure_id, id_filter, normalize_id, require_id, AsyncRepository, Entity,
    EntityStream,
};

/// Repository backed by a MongoDB collection, using the driver's async API.
///
/// Same semantics as [`super::MongoRepository`]; every operation suspends on the
/// network round trip. Query results are streamed from a server cursor.
pub struct AsyncMongoRepository<T: Entity> {
    collection: Collection<T>,
}

impl<T: Entity> AsyncMongoRepository<T> {
    /// Connects using the connection string in the `MONGO_SERVER_SETTINGS` environment
    /// variable.
    pub async fn new() -> RepositoryResult<Self> {
        let connection_string = default_connection_string()?;
        Self::with_connection_string(&connection_string).await
    }

    pub async fn with_connection_string(connection_string: &str) -> RepositoryResult<Self> {
        Self::with_collection_name(connection_string, &collection_name::<T>()).await
    }

    pub async fn with_collection_name(
        connection_string: &str,
        collection_name: &str,
    ) -> RepositoryResult<Self> {
        let client = Client::with_uri_str(connection_string)
            .await
            .map_err(|err| backend_error("Connect", "<none>", err))?;
        let database = client
            .default_database()
            .ok_or_else(|| missing_database(connection_string))?;
        Ok(Self::from_database_with_name(&database, collection_name))
    }

    pub fn from_database(database: &Database) -> Self {
        Self::from_database_with_name(database, &collection_name::<T>())
    }

    pub fn from_database_with_name(database: &Database, collection_name: &str) -> Self {
        log::debug!(
            "Opening collection {} in database {}",
            collection_name,
            database.name()
        );
        AsyncMongoRepository {
            collection: database.collection::<T>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    fn name(&self) -> &str {
        self.collection.name()
    }

    async fn replace(&self, entity: &T, upsert: bool) -> RepositoryResult<()> {
        let id = require_id(entity)?;
        let filter = id_filter::<T>(id)?;
        let result = self
            .collection
            .replace_one(filter, entity)
            .upsert(upsert)
            .await
            .map_err(|err| backend_error("Replace", self.name(), err))?;
        log::debug!(
            "Replaced entity {:?} in {} (matched {}, upserted {})",
            id,
            self.name(),
            result.matched_count,
            result.upserted_id.is_some()
        );
        Ok(())
    }

    async fn find_query(&self, query: Document) -> RepositoryResult<EntityStream<T>> {
        let cursor = self
            .collection
            .find(query)
            .await
            .map_err(|err| backend_error("Find", self.name(), err))?;
        let name = self.name().to_string();
        Ok(cursor
            .map_err(move |err| backend_error("Read", &name, err))
            .boxed())
    }
}

#[async_trait]
impl<T: Entity> AsyncRepository<T> for AsyncMongoRepository<T> {
    async fn get_by_id(&self, id: &T::Id) -> RepositoryResult<T> {
        let filter = id_filter::<T>(id)?;
        let matches: Vec<T> = self
            .collection
            .find(filter)
            .limit(2)
            .await
            .map_err(|err| backend_error("Find", self.name(), err))?
            .try_collect()
            .await
            .map_err(|err| backend_error("Find", self.name(), err))?;

        let mut matches = matches.into_iter();
        match (matches.next(), matches.next()) {
            (Some(entity), None) => Ok(entity),
            (None, _) => Err(not_found::<T>(id, self.name())),
            (Some(_), Some(_)) => Err(not_unique::<T>(id, self.name())),
        }
    }

    async fn add(&mut self, mut entity: T) -> RepositoryResult<T> {
        ensure_id(&mut entity)?;
        self.collection
            .insert_one(&entity)
            .await
            .map_err(|err| backend_error("Insert", self.name(), err))?;
        log::debug!("Added entity {:?} to {}", entity.id(), self.name());
        Ok(entity)
    }

    async fn add_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>> {
        let mut prepared = Vec::with_capacity(entities.len());
        for mut entity in entities {
            ensure_id(&mut entity)?;
            prepared.push(entity);
        }

        if prepared.is_empty() {
            return Ok(prepared);
        }

        self.collection
            .insert_many(&prepared)
            .await
            .map_err(|err| backend_error("Insert many", self.name(), err))?;
        log::debug!("Added {} entities to {}", prepared.len(), self.name());
        Ok(prepared)
    }

    async fn add_or_update(&mut self, mut entity: T) -> RepositoryResult<T> {
        if entity.id().is_none() {
            return AsyncRepository::add(self, entity).await;
        }
        normalize_id(&mut entity)?;
        self.replace(&entity, true).await?;
        Ok(entity)
    }

    async fn update(&mut self, mut entity: T) -> RepositoryResult<T> {
        normalize_id(&mut entity)?;
        self.replace(&entity, false).await?;
        Ok(entity)
    }

    async fn delete_by_id(&mut self, id: &T::Id) -> RepositoryResult<()> {
        let filter = id_filter::<T>(id)?;
        let result = self
            .collection
            .delete_one(filter)
            .await
            .map_err(|err| backend_error("Delete", self.name(), err))?;
        log::debug!(
            "Deleted {} entity with id {:?} from {}",
            result.deleted_count,
            id,
            self.name()
        );
        Ok(())
    }

    async fn delete_where<P: Predicate<T>>(&mut self, predicate: P) -> RepositoryResult<u64> {
        let query = predicate.to_query()?;
        let result = self
            .collection
            .delete_many(query)
            .await
            .map_err(|err| backend_error("Delete many", self.name(), err))?;
        log::debug!("Deleted {} entities from {}", result.deleted_count, self.name());
        Ok(result.deleted_count)
    }

    async fn delete_all(&mut self) -> RepositoryResult<u64> {
        let result = self
            .collection
            .delete_many(Document::new())
            .await
            .map_err(|err| backend_error("Delete all", self.name(), err))?;
        log::debug!("Deleted all {} entities from {}", result.deleted_count, self.name());
        Ok(result.deleted_count)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        self.collection
            .count_documents(Document::new())
            .await
            .map_err(|err| backend_error("Count", self.name(), err))
    }

    async fn count_where<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<u64> {
        let query = predicate.to_query()?;
        self.collection
            .count_documents(query)
            .await
            .map_err(|err| backend_error("Count", self.name(), err))
    }

    async fn exists<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<bool> {
        let query = predicate.to_query()?;
        let count = self
            .collection
            .count_documents(query)
            .limit(1)
            .await
            .map_err(|err| backend_error("Exists", self.name(), err))?;
        Ok(count > 0)
    }

    async fn find<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<EntityStream<T>> {
        let query = predicate.to_query()?;
        self.find_query(query).await
    }

    async fn find_all(&self) -> RepositoryResult<EntityStream<T>> {
        self.find_query(Document::new()).await
    }

    fn collection_name(&self) -> &str {
        self.name()
    }
}
