use crate::errors::RepositoryResult;
use crate::filter::Predicate;

use super::{Entity, EntityCursor, InMemoryRepository, MongoRepository, Repository};

macro_rules! dispatch {
    ($self:ident, $repository:ident => $call:expr) => {
        match $self {
            ObjectRepository::InMemory($repository) => $call,
            ObjectRepository::MongoDb($repository) => $call,
        }
    };
}

/// A repository whose backend is chosen by configuration.
///
/// # Purpose
///
/// Lets application code hold one concrete type while the backend is selected at
/// construction time, typically in-memory for tests and MongoDB in production. Every
/// [`Repository`] call is forwarded to the selected backend unchanged.
///
/// # Usage
///
/// ```ignore
/// let config = RepositoryConfig::in_memory();
/// let mut customers: ObjectRepository<Customer> = config.open()?;
/// customers.add(Customer::new("Bob"))?;
/// ```
pub enum ObjectRepository<T: Entity> {
    InMemory(InMemoryRepository<T>),
    MongoDb(MongoRepository<T>),
}

impl<T: Entity> ObjectRepository<T> {
    pub fn is_in_memory(&self) -> bool {
        matches!(self, ObjectRepository::InMemory(_))
    }
}

impl<T: Entity> From<InMemoryRepository<T>> for ObjectRepository<T> {
    fn from(repository: InMemoryRepository<T>) -> Self {
        ObjectRepository::InMemory(repository)
    }
}

impl<T: Entity> From<MongoRepository<T>> for ObjectRepository<T> {
    fn from(repository: MongoRepository<T>) -> Self {
        ObjectRepository::MongoDb(repository)
    }
}

impl<T: Entity> Repository<T> for ObjectRepository<T> {
    fn get_by_id(&self, id: &T::Id) -> RepositoryResult<T> {
        dispatch!(self, repository => repository.get_by_id(id))
    }

    fn add(&mut self, entity: T) -> RepositoryResult<T> {
        dispatch!(self, repository => repository.add(entity))
    }

    fn add_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>> {
        dispatch!(self, repository => repository.add_many(entities))
    }

    fn add_or_update(&mut self, entity: T) -> RepositoryResult<T> {
        dispatch!(self, repository => repository.add_or_update(entity))
    }

    fn add_or_update_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>> {
        dispatch!(self, repository => repository.add_or_update_many(entities))
    }

    fn update(&mut self, entity: T) -> RepositoryResult<T> {
        dispatch!(self, repository => repository.update(entity))
    }

    fn update_many(&mut self, entities: Vec<T>) -> RepositoryResult<Vec<T>> {
        dispatch!(self, repository => repository.update_many(entities))
    }

    fn delete_by_id(&mut self, id: &T::Id) -> RepositoryResult<()> {
        dispatch!(self, repository => repository.delete_by_id(id))
    }

    fn delete(&mut self, entity: &T) -> RepositoryResult<()> {
        dispatch!(self, repository => repository.delete(entity))
    }

    fn delete_where<P: Predicate<T>>(&mut self, predicate: P) -> RepositoryResult<u64> {
        dispatch!(self, repository => repository.delete_where(predicate))
    }

    fn delete_all(&mut self) -> RepositoryResult<u64> {
        dispatch!(self, repository => repository.delete_all())
    }

    fn count(&self) -> RepositoryResult<u64> {
        dispatch!(self, repository => repository.count())
    }

    fn count_where<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<u64> {
        dispatch!(self, repository => repository.count_where(predicate))
    }

    fn exists<P: Predicate<T>>(&self, predicate: P) -> RepositoryResult<bool> {
        dispatch!(self, repository => repository.exists(predicate))
    }

    fn find<'a, P: Predicate<T> + 'a>(
        &'a self,
        predicate: P,
    ) -> RepositoryResult<EntityCursor<'a, T>> {
        dispatch!(self, repository => repository.find(predicate))
    }

    fn find_all(&self) -> RepositoryResult<EntityCursor<'_, T>> {
        dispatch!(self, repository => repository.find_all())
    }

    fn collection_name(&self) -> &str {
        dispatch!(self, repository => repository.collection_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::field;
    use crate::repository::EntityType;
    use serde::{Deserialize, Serialize};
    use std::any::TypeId;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        text: String,
    }

    impl Entity for Note {
        type Id = String;

        fn entity_type() -> &'static EntityType {
            static ENTITY_TYPE: EntityType =
                EntityType::new("Note", TypeId::of::<Note>).with_collection_name("Notes");
            &ENTITY_TYPE
        }

        fn id(&self) -> Option<&String> {
            self.id.as_ref()
        }

        fn set_id(&mut self, id: String) {
            self.id = Some(id);
        }
    }

    #[test]
    fn test_in_memory_variant_forwards_calls() {
        let mut repository: ObjectRepository<Note> = InMemoryRepository::new().into();
        assert!(repository.is_in_memory());
        assert_eq!(repository.collection_name(), "Notes");

        let note = repository
            .add(Note {
                id: None,
                text: "hello".to_string(),
            })
            .unwrap();
        let id = note.id.clone().unwrap();
        assert_eq!(repository.get_by_id(&id).unwrap(), note);
        assert!(repository.exists(field("text").eq("hello")).unwrap());

        repository.delete(&note).unwrap();
        assert_eq!(repository.count().unwrap(), 0);
    }
}
