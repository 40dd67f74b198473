use futures::stream::{BoxStream, StreamExt};
use std::future;

use crate::errors::RepositoryResult;

use super::Entity;

/// Owned stream of entities returned by [`super::AsyncRepository`] queries.
pub type EntityStream<T> = BoxStream<'static, RepositoryResult<T>>;

/// Lazy cursor over entities returned by [`super::Repository`] queries.
///
/// Entities are read from the backend as the cursor advances. A MongoDB cursor fetches
/// further batches from the server on demand; an in-memory cursor borrows the backing
/// sequence, so the repository cannot be mutated while the cursor is alive.
///
/// Each item is a `RepositoryResult` because reading the next entity can fail
/// (network error, malformed document).
pub struct EntityCursor<'a, T> {
    inner: Box<dyn Iterator<Item = RepositoryResult<T>> + 'a>,
}

impl<'a, T: Entity> EntityCursor<'a, T> {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = RepositoryResult<T>> + 'a,
    {
        EntityCursor {
            inner: Box::new(iter),
        }
    }

    /// Keeps only entities whose runtime type is `U` or one of its subtypes.
    ///
    /// Errors are passed through so they are never silently dropped.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let all = repository.find_all()?.count();
    /// let only_b = repository.find_all()?.of_type::<ClassB>().count();
    /// ```
    pub fn of_type<U: Entity>(self) -> EntityCursor<'a, T> {
        let target = U::entity_type();
        EntityCursor::new(self.inner.filter(move |item| match item {
            Ok(entity) => entity.runtime_type().is_a(target),
            Err(_) => true,
        }))
    }

    /// Returns the first entity, consuming the cursor.
    pub fn first(mut self) -> Option<RepositoryResult<T>> {
        self.inner.next()
    }

    /// Collects every entity, stopping at the first error.
    pub fn to_vec(self) -> RepositoryResult<Vec<T>> {
        self.inner.collect()
    }
}

impl<T> Iterator for EntityCursor<'_, T> {
    type Item = RepositoryResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Keeps only entities of an [`EntityStream`] whose runtime type is `U` or one of its
/// subtypes. The stream counterpart of [`EntityCursor::of_type`].
pub fn stream_of_type<T: Entity, U: Entity>(stream: EntityStream<T>) -> EntityStream<T> {
    let target = U::entity_type();
    stream
        .filter(move |item| {
            let keep = match item {
                Ok(entity) => entity.runtime_type().is_a(target),
                Err(_) => true,
            };
            future::ready(keep)
        })
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, RepositoryError};
    use crate::repository::EntityType;
    use futures::executor::block_on;
    use futures::TryStreamExt;
    use serde::{Deserialize, Serialize};
    use std::any::TypeId;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "_t")]
    enum Shape {
        Circle { id: Option<String> },
        Square { id: Option<String> },
    }

    // standalone view of the circle variant
    #[derive(Clone, Serialize, Deserialize)]
    struct Circle {
        id: Option<String>,
    }

    impl Entity for Circle {
        type Id = String;

        fn entity_type() -> &'static EntityType {
            circle_type()
        }

        fn id(&self) -> Option<&String> {
            self.id.as_ref()
        }

        fn set_id(&mut self, id: String) {
            self.id = Some(id);
        }
    }

    struct Square;

    fn circle_type() -> &'static EntityType {
        static ENTITY_TYPE: EntityType =
            EntityType::new("Circle", TypeId::of::<Circle>).with_parent(Shape::entity_type);
        &ENTITY_TYPE
    }

    fn square_type() -> &'static EntityType {
        static ENTITY_TYPE: EntityType =
            EntityType::new("Square", TypeId::of::<Square>).with_parent(Shape::entity_type);
        &ENTITY_TYPE
    }

    impl Entity for Shape {
        type Id = String;

        fn entity_type() -> &'static EntityType {
            static ENTITY_TYPE: EntityType = EntityType::new("Shape", TypeId::of::<Shape>);
            &ENTITY_TYPE
        }

        fn id(&self) -> Option<&String> {
            match self {
                Shape::Circle { id } | Shape::Square { id } => id.as_ref(),
            }
        }

        fn set_id(&mut self, new_id: String) {
            match self {
                Shape::Circle { id } | Shape::Square { id } => *id = Some(new_id),
            }
        }

        fn runtime_type(&self) -> &'static EntityType {
            match self {
                Shape::Circle { .. } => circle_type(),
                Shape::Square { .. } => square_type(),
            }
        }
    }

    fn shapes() -> Vec<Shape> {
        vec![
            Shape::Circle { id: None },
            Shape::Square { id: None },
            Shape::Circle { id: None },
        ]
    }

    #[test]
    fn test_of_type_filters_by_runtime_type() {
        let cursor = EntityCursor::new(shapes().into_iter().map(Ok));
        assert_eq!(cursor.of_type::<Shape>().count(), 3);

        let cursor = EntityCursor::new(shapes().into_iter().map(Ok));
        assert_eq!(cursor.of_type::<Circle>().count(), 2);
    }

    #[test]
    fn test_of_type_keeps_errors() {
        let items: Vec<RepositoryResult<Shape>> = vec![
            Ok(Shape::Square { id: None }),
            Err(RepositoryError::new("boom", ErrorKind::BackendError)),
        ];
        let cursor = EntityCursor::new(items.into_iter());
        let result = cursor.to_vec();
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::BackendError);
    }

    #[test]
    fn test_first() {
        let cursor = EntityCursor::new(shapes().into_iter().map(Ok));
        assert_eq!(cursor.first().unwrap().unwrap(), Shape::Circle { id: None });

        let empty = EntityCursor::<Shape>::new(std::iter::empty());
        assert!(empty.first().is_none());
    }

    #[test]
    fn test_stream_of_type() {
        let stream = futures::stream::iter(shapes().into_iter().map(Ok)).boxed();
        let circles: Vec<Shape> =
            block_on(stream_of_type::<Shape, Circle>(stream).try_collect()).unwrap();
        assert_eq!(circles.len(), 2);
    }
}
