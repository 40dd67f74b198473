use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};
use crate::filter::Predicate;

use super::{
    collection_name, ensure_id, normalize_id, require_id, same_id, AsyncRepository, Entity,
    EntityCursor, EntityStream, Repository,
};

/// Repository backed by an in-process, ordered `Vec`.
///
/// # Purpose
///
/// Test double for [`super::MongoRepository`] with the same observable behavior:
/// generated identifiers, unique identifiers, replace-by-id updates that ignore absent
/// identifiers, and the same predicate results for [`crate::filter::Filter`]s.
///
/// # Characteristics
///
/// - Insertion order is preserved; `update` replaces in place
/// - No internal locking: writes take `&mut self`
/// - Nothing is persisted beyond the lifetime of the value
/// - Async methods complete without suspending
pub struct InMemoryRepository<T: Entity> {
    entities: Vec<T>,
    collection_name: String,
}

impl<T: Entity> InMemoryRepository<T> {
    /// Creates an empty repository named after the collection resolved for `T`.
    pub fn new() -> Self {
        InMemoryRepository {
            entities: Vec::new(),
            collection_name: collection_name::<T>(),
        }
    }

    /// Creates an empty repository with an explicit collection name.
    pub fn with_collection_name(collection_name: &str) -> Self {
        InMemoryRepository {
            entities: Vec::new(),
            collection_name: collection_name.to_string(),
        }
    }

    fn position(&self, id: &T::Id) -> Option<usize> {
        self.entities
            .iter()
            .position(|entity| entity.id().is_some_and(|stored| same_id::<T>(stored, id)))
    }

    fn contains_id(&self, id: &T::Id) -> bool {
        self.position(id).is_some()
    }

    fn duplicate_key(&self, id: &T::Id) -> RepositoryError {
        log::error!(
            "Entity with id {:?} already exists in {}",
            id,
            self.collection_name
        );
        RepositoryError::new(
            &format!(
                "Entity with id {:?} already exists in collection {}",
                id, self.collection_name
            ),
            ErrorKind::DuplicateKey,
        )
    }

    fn prepare_insert(&self, mut entity: T) -> RepositoryResult<T> {
        ensure_id(&mut entity)?;
        let id = require_id(&entity)?;
        if self.contains_id(id) {
            return Err(self.duplicate_key(id));
        }
        Ok(entity)
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        InMemoryRepository::new()
    }
}

impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    fn get_by_id(&self, id: &T::Id) -> RepositoryResult<T> {
        let mut matches = self
            .entities
            .iter()
            .filter(|entity| entity.id().is_some_and(|stored| same_id::<T>(stored, id)));

        match (matches.next(), matches.next()) {
            (Some(entity), None) => Ok(entity.clone()),
            (None, _) => {
                log::error!("No entity with id {:?} in {}", id, self.collection_name);
                Err(RepositoryError::new(
                    &format!("No entity with id {:?} in collection {}", id, self.collection_name),
                    ErrorKind::NotFound,
                ))
            }
            (Some(_), Some(_)) => {
                log::error!("More than one entity with id {:?} in {}", id, self.collection_name);
                Err(RepositoryError::new(
                    &format!(
                        "More than one entity with id {:?} in collection {}",
                        id, self.collection_name
                    ),
                    ErrorKind::NotUnique,
                ))
            }
        }
    }

    fn add(&mut self, entity: T) -> RepositoryResult<T> {
        let entity = self.prepare_insert(entity)?;
        self.entities.push(entity.clone());
        log::debug!("Added entity {:?} to {}", entity.id(), self.collection_name);
        Ok(entity)
    }

    fn add_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>> {
        let mut prepared: Vec<T> = Vec::with_capacity(entities.len());
        for entity in entities {
            let entity = self.prepare_insert(entity)?;
            let id = require_id(&entity)?;
            if prepared
                .iter()
                .any(|other| other.id().is_some_and(|stored| same_id::<T>(stored, id)))
            {
                return Err(self.duplicate_key(id));
            }
            prepared.push(entity);
        }

        self.entities.extend(prepared.iter().cloned());
        log::debug!("Added {} entities to {}", prepared.len(), self.collection_name);
        Ok(prepared)
    }

    fn add_or_update(&mut self, mut entity: T) -> RepositoryResult<T> {
        normalize_id(&mut entity)?;
        let position = entity.id().and_then(|id| self.position(id));
        match position {
            Some(index) => {
                self.entities[index] = entity.clone();
                log::debug!("Replaced entity {:?} in {}", entity.id(), self.collection_name);
                Ok(entity)
            }
            None => Repository::add(self, entity),
        }
    }

    fn update(&mut self, mut entity: T) -> RepositoryResult<T> {
        normalize_id(&mut entity)?;
        let id = require_id(&entity)?;
        match self.position(id) {
            Some(index) => {
                log::debug!("Replaced entity {:?} in {}", id, self.collection_name);
                self.entities[index] = entity.clone();
            }
            None => {
                log::debug!("No entity {:?} to update in {}", id, self.collection_name);
            }
        }
        Ok(entity)
    }

    fn delete_by_id(&mut self, id: &T::Id) -> RepositoryResult<()> {
        if let Some(index) = self.position(id) {
            self.entities.remove(index);
            log::debug!("Deleted entity {:?} from {}", id, self.collection_name);
        }
        Ok(())
    }

    fn delete_where<P: Predicate<T>>(&mut self, predicate: P) -> RepositoryResult<u64> {
        // evaluate first so a failing predicate leaves the collection untouched
        let mut keep = Vec::with_capacity(self.entities.len());
        for entity in &self.entities {
            keep.push(!predicate.matches(entity)?);
        }

        let before = self.entities.len();
        let mut flags = keep.into_iter();
        self.entities.retain(|_| flags.next().unwrap_or(true));
        let removed = (before - self.entities.len()) as u64;
        log::debug!("Deleted {} entities from {}", removed, self.collection_name);
        Ok(removed)
    }

    fn delete_all(&mut self) -> RepositoryResult<u64> {
        let removed = self.entities.len() as u64;
        self.entities.clear();
        log::debug!("Deleted all {} entities from {}", removed, self.collection_name);
        Ok(removed)
    }

    fn count(&self) -> RepositoryResult<u64> {
        Ok(self.entities.len() as u64)
    }

    fn count_where<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<u64> {
        let mut count = 0;
        for entity in &self.entities {
            if predicate.matches(entity)? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn exists<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<bool> {
        for entity in &self.entities {
            if predicate.matches(entity)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn find<'a, P: Predicate<T> + 'a>(
        &'a self,
        predicate: P,
    ) -> RepositoryResult<EntityCursor<'a, T>> {
        let iter = self
            .entities
            .iter()
            .filter_map(move |entity| match predicate.matches(entity) {
                Ok(true) => Some(Ok(entity.clone())),
                Ok(false) => None,
                Err(err) => Some(Err(err)),
            });
        Ok(EntityCursor::new(iter))
    }

    fn find_all(&self) -> RepositoryResult<EntityCursor<'_, T>> {
        Ok(EntityCursor::new(self.entities.iter().cloned().map(Ok)))
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }
}

#[async_trait]
impl<T: Entity> AsyncRepository<T> for InMemoryRepository<T> {
    async fn get_by_id(&self, id: &T::Id) -> RepositoryResult<T> {
        Repository::get_by_id(self, id)
    }

    async fn add(&mut self, entity: T) -> RepositoryResult<T> {
        Repository::add(self, entity)
    }

    async fn add_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>> {
        Repository::add_many(self, entities)
    }

    async fn add_or_update(&mut self, entity: T) -> RepositoryResult<T> {
        Repository::add_or_update(self, entity)
    }

    async fn update(&mut self, entity: T) -> RepositoryResult<T> {
        Repository::update(self, entity)
    }

    async fn delete_by_id(&mut self, id: &T::Id) -> RepositoryResult<()> {
        Repository::delete_by_id(self, id)
    }

    async fn delete_where<P: Predicate<T>>(&mut self, predicate: P) -> RepositoryResult<u64> {
        Repository::delete_where(self, predicate)
    }

    async fn delete_all(&mut self) -> RepositoryResult<u64> {
        Repository::delete_all(self)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Repository::count(self)
    }

    async fn count_where<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<u64> {
        Repository::count_where(self, predicate)
    }

    async fn exists<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<bool> {
        Repository::exists(self, predicate)
    }

    async fn find<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<EntityStream<T>> {
        // snapshot, the stream must not borrow the repository
        let matches: Vec<RepositoryResult<T>> = Repository::find(self, predicate)?.collect();
        Ok(stream::iter(matches).boxed())
    }

    async fn find_all(&self) -> RepositoryResult<EntityStream<T>> {
        let snapshot: Vec<RepositoryResult<T>> = self.entities.iter().cloned().map(Ok).collect();
        Ok(stream::iter(snapshot).boxed())
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryRepository;
    use crate::errors::ErrorKind;
    use crate::filter::field;
    use crate::repository::{Entity, EntityType, Repository};
    use serde::{Deserialize, Serialize};
    use std::any::TypeId;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Product {
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        price: i32,
    }

    impl Entity for Product {
        type Id = String;

        fn entity_type() -> &'static EntityType {
            static ENTITY_TYPE: EntityType = EntityType::new("Product", TypeId::of::<Product>);
            &ENTITY_TYPE
        }

        fn id(&self) -> Option<&String> {
            self.id.as_ref()
        }

        fn set_id(&mut self, id: String) {
            self.id = Some(id);
        }
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<i32>,
        value: i64,
    }

    impl Entity for Counter {
        type Id = i32;

        fn entity_type() -> &'static EntityType {
            static ENTITY_TYPE: EntityType = EntityType::new("Counter", TypeId::of::<Counter>)
                .with_collection_name("Counters");
            &ENTITY_TYPE
        }

        fn id(&self) -> Option<&i32> {
            self.id.as_ref()
        }

        fn set_id(&mut self, id: i32) {
            self.id = Some(id);
        }
    }

    fn product(name: &str, price: i32) -> Product {
        Product {
            id: None,
            name: name.to_string(),
            price,
        }
    }

    fn seeded() -> InMemoryRepository<Product> {
        let mut repository = InMemoryRepository::new();
        for price in 1..=5 {
            repository.add(product(&format!("p{}", price), price)).unwrap();
        }
        repository
    }

    #[test]
    fn test_collection_name_is_resolved() {
        assert_eq!(Repository::collection_name(&InMemoryRepository::<Product>::new()), "Product");
        assert_eq!(Repository::collection_name(&InMemoryRepository::<Counter>::new()), "Counters");
        assert_eq!(
            Repository::collection_name(&InMemoryRepository::<Product>::with_collection_name("x")),
            "x"
        );
    }

    #[test]
    fn test_add_assigns_id_and_round_trips() {
        let mut repository = InMemoryRepository::new();
        let added = repository.add(product("a", 1)).unwrap();
        let id = added.id.clone().unwrap();
        assert_eq!(id.len(), 24);
        assert_eq!(repository.count().unwrap(), 1);
        assert_eq!(Repository::get_by_id(&repository, &id).unwrap(), added);
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut repository = InMemoryRepository::new();
        let added = repository.add(product("a", 1)).unwrap();
        let err = repository.add(added).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DuplicateKey);
        assert_eq!(repository.count().unwrap(), 1);
    }

    #[test]
    fn test_add_requires_non_generated_key() {
        let mut repository = InMemoryRepository::<Counter>::new();
        let err = repository.add(Counter::default()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);

        let added = repository.add(Counter { id: Some(7), value: 1 }).unwrap();
        assert_eq!(Repository::get_by_id(&repository, &7).unwrap(), added);
    }

    #[test]
    fn test_add_many_is_all_or_nothing() {
        let mut repository = InMemoryRepository::<Counter>::new();
        let err = repository
            .add_many(vec![
                Counter { id: Some(1), value: 1 },
                Counter { id: Some(1), value: 2 },
            ])
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DuplicateKey);
        assert_eq!(repository.count().unwrap(), 0);

        let added = repository
            .add_many(vec![Counter { id: Some(1), value: 1 }, Counter { id: Some(2), value: 2 }])
            .unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(repository.count().unwrap(), 2);
    }

    #[test]
    fn test_get_by_id_not_found() {
        let repository = seeded();
        let err = Repository::get_by_id(&repository, &"missing".to_string()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotFound);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut repository = seeded();
        let mut second = repository.find_all().unwrap().nth(1).unwrap().unwrap();
        second.name = "renamed".to_string();
        repository.update(second.clone()).unwrap();

        let names: Vec<String> = repository
            .find_all()
            .unwrap()
            .map(|p| p.unwrap().name)
            .collect();
        assert_eq!(names, vec!["p1", "renamed", "p3", "p4", "p5"]);
    }

    #[test]
    fn test_update_without_id_fails() {
        let mut repository = seeded();
        let err = repository.update(product("x", 9)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_update_absent_id_is_noop() {
        let mut repository = seeded();
        let mut ghost = product("ghost", 9);
        ghost.id = Some("000000000000000000000000".to_string());
        repository.update(ghost).unwrap();
        assert_eq!(repository.count().unwrap(), 5);
        assert!(!repository.exists(field("name").eq("ghost")).unwrap());
    }

    #[test]
    fn test_add_or_update() {
        let mut repository = InMemoryRepository::new();
        let mut added = repository.add_or_update(product("a", 1)).unwrap();
        assert!(added.id.is_some());

        added.price = 10;
        repository.add_or_update(added.clone()).unwrap();
        assert_eq!(repository.count().unwrap(), 1);

        let mut fresh = product("b", 2);
        fresh.id = Some("b".to_string());
        repository.add_or_update(fresh).unwrap();
        assert_eq!(repository.count().unwrap(), 2);
        assert_eq!(Repository::get_by_id(&repository, &"b".to_string()).unwrap().price, 2);
    }

    #[test]
    fn test_delete_by_id_is_idempotent() {
        let mut repository = seeded();
        let first = repository.find_all().unwrap().first().unwrap().unwrap();
        let id = first.id.clone().unwrap();

        repository.delete_by_id(&id).unwrap();
        assert_eq!(repository.count().unwrap(), 4);
        repository.delete_by_id(&id).unwrap();
        assert_eq!(repository.count().unwrap(), 4);
    }

    #[test]
    fn test_delete_entity_without_id_fails() {
        let mut repository = seeded();
        let err = repository.delete(&product("x", 1)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_delete_where_filter() {
        let mut repository = seeded();
        let removed = repository.delete_where(field("price").gte(3)).unwrap();
        assert_eq!(removed, 3);

        let prices: Vec<i32> = repository.find_all().unwrap().map(|p| p.unwrap().price).collect();
        assert_eq!(prices, vec![1, 2]);
    }

    #[test]
    fn test_delete_where_closure() {
        let mut repository = seeded();
        let removed = repository.delete_where(|p: &Product| p.price % 2 == 0).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(repository.count().unwrap(), 3);
    }

    #[test]
    fn test_delete_where_failing_predicate_keeps_entities() {
        let mut repository = seeded();
        let err = repository.delete_where(field("name").regex("(")).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FilterError);
        assert_eq!(repository.count().unwrap(), 5);
    }

    #[test]
    fn test_count_exists_and_find() {
        let mut repository = seeded();
        assert_eq!(repository.count_where(field("price").lt(3)).unwrap(), 2);
        assert!(repository.exists(field("name").eq("p4")).unwrap());
        assert!(!repository.exists(|p: &Product| p.price > 5).unwrap());

        let found = repository.find(field("price").between(2, 3)).unwrap().to_vec().unwrap();
        assert_eq!(found.len(), 2);

        assert_eq!(repository.delete_all().unwrap(), 5);
        assert_eq!(repository.count().unwrap(), 0);
        assert_eq!(repository.find_all().unwrap().count(), 0);
    }

    mod async_repository {
        use super::{product, Product};
        use crate::filter::field;
        use crate::repository::{AsyncRepository, InMemoryRepository};
        use futures::executor::block_on;
        use futures::TryStreamExt;

        #[test]
        fn test_async_variants() {
            block_on(async {
                let mut repository = InMemoryRepository::<Product>::new();
                let added = AsyncRepository::add(&mut repository, product("a", 1)).await.unwrap();
                AsyncRepository::add(&mut repository, product("b", 4)).await.unwrap();

                let id = added.id.clone().unwrap();
                let loaded = AsyncRepository::get_by_id(&repository, &id).await.unwrap();
                assert_eq!(loaded, added);

                let cheap: Vec<Product> = AsyncRepository::find(&repository, field("price").lt(2))
                    .await
                    .unwrap()
                    .try_collect()
                    .await
                    .unwrap();
                assert_eq!(cheap, vec![added]);

                let removed = AsyncRepository::delete_where(&mut repository, field("price").gte(3))
                    .await
                    .unwrap();
                assert_eq!(removed, 1);
                assert_eq!(AsyncRepository::count(&repository).await.unwrap(), 1);
            });
        }
    }
}
