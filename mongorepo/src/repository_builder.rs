use crate::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AsyncObjectRepository, Entity, ObjectRepository};
use crate::repository_config::{
    validate_collection_name, validate_connection_string, RepositoryBackend, RepositoryConfig,
};

/// Builder for repository configurations.
///
/// `RepositoryBuilder` provides a fluent API for choosing a backend before opening
/// repositories. Errors raised by a setter are captured and returned by
/// [`RepositoryBuilder::build`] or the `open` methods; setters called after the first
/// error are ignored.
///
/// # Examples
///
/// ```rust,ignore
/// // In-memory repository, e.g. for unit tests
/// let mut customers = RepositoryBuilder::new().open::<Customer>()?;
///
/// // MongoDB repository with an explicit collection
/// let mut customers = RepositoryBuilder::new()
///     .mongodb("mongodb://localhost:27017/shop")
///     .collection_name("Customers")
///     .open::<Customer>()?;
/// ```
#[derive(Default)]
pub struct RepositoryBuilder {
    error: Option<RepositoryError>,
    backend: Option<RepositoryBackend>,
    collection_name: Option<String>,
}

impl RepositoryBuilder {
    /// Creates a builder for the in-memory backend.
    pub fn new() -> Self {
        RepositoryBuilder {
            error: None,
            backend: None,
            collection_name: None,
        }
    }

    /// Selects the in-memory backend.
    pub fn in_memory(mut self) -> Self {
        if self.error.is_none() {
            self.backend = Some(RepositoryBackend::InMemory);
        }
        self
    }

    /// Selects a MongoDB deployment.
    ///
    /// The connection string must use the `mongodb://` or `mongodb+srv://` scheme and
    /// should name the database, e.g. `mongodb://localhost:27017/shop`.
    pub fn mongodb(mut self, connection_string: &str) -> Self {
        if self.error.is_none() {
            match validate_connection_string(connection_string) {
                Ok(()) => {
                    self.backend = Some(RepositoryBackend::MongoDb {
                        connection_string: Some(connection_string.to_string()),
                    })
                }
                Err(e) => self.error = Some(e),
            }
        }
        self
    }

    /// Selects the MongoDB deployment named by the `MONGO_SERVER_SETTINGS` environment
    /// variable.
    pub fn mongodb_from_env(mut self) -> Self {
        if self.error.is_none() {
            self.backend = Some(RepositoryBackend::MongoDb {
                connection_string: None,
            });
        }
        self
    }

    /// Overrides the collection name resolved from the entity type.
    ///
    /// An empty name, or one containing `$`, is a configuration error.
    pub fn collection_name(mut self, collection_name: &str) -> Self {
        if self.error.is_none() {
            match validate_collection_name(collection_name) {
                Ok(()) => self.collection_name = Some(collection_name.to_string()),
                Err(e) => self.error = Some(e),
            }
        }
        self
    }

    /// Finishes the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error captured by a setter.
    pub fn build(self) -> RepositoryResult<RepositoryConfig> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let backend = self.backend.unwrap_or(RepositoryBackend::InMemory);
        log::debug!("Configured repository backend {:?}", backend);
        Ok(RepositoryConfig::new(backend, self.collection_name))
    }

    /// Builds the configuration and opens a blocking repository for `T`.
    pub fn open<T: Entity>(self) -> RepositoryResult<ObjectRepository<T>> {
        self.build()?.open::<T>()
    }

    /// Builds the configuration and opens an async repository for `T`.
    pub async fn open_async<T: Entity>(self) -> RepositoryResult<AsyncObjectRepository<T>> {
        let config = self.build()?;
        config.open_async::<T>().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::repository::{AsyncRepository, EntityType};
    use serde::{Deserialize, Serialize};
    use std::any::TypeId;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Invoice {
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        amount: i64,
    }

    impl Entity for Invoice {
        type Id = String;

        fn entity_type() -> &'static EntityType {
            static ENTITY_TYPE: EntityType =
                EntityType::new("Invoice", TypeId::of::<Invoice>).with_collection_name("Invoices");
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
    fn test_default_builds_in_memory() {
        let config = RepositoryBuilder::new().build().unwrap();
        assert!(config.is_in_memory());
    }

    #[test]
    fn test_mongodb_backend() {
        let config = RepositoryBuilder::new()
            .mongodb("mongodb://localhost:27017/shop")
            .collection_name("Bills")
            .build()
            .unwrap();
        assert_eq!(
            config.backend(),
            &RepositoryBackend::MongoDb {
                connection_string: Some("mongodb://localhost:27017/shop".to_string())
            }
        );
        assert_eq!(config.collection_name(), Some("Bills"));
    }

    #[test]
    fn test_mongodb_from_env_defers_lookup() {
        let config = RepositoryBuilder::new().mongodb_from_env().build().unwrap();
        assert_eq!(
            config.backend(),
            &RepositoryBackend::MongoDb {
                connection_string: None
            }
        );
    }

    #[test]
    fn test_last_backend_wins() {
        let config = RepositoryBuilder::new()
            .mongodb("mongodb://localhost/shop")
            .in_memory()
            .build()
            .unwrap();
        assert!(config.is_in_memory());
    }

    #[test]
    fn test_first_error_is_kept() {
        let err = RepositoryBuilder::new()
            .collection_name("")
            .mongodb("http://localhost")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
        assert!(err.message().contains("Collection name"));
    }

    #[test]
    fn test_invalid_connection_string_fails_open() {
        let result = RepositoryBuilder::new()
            .mongodb("localhost:27017")
            .open::<Invoice>();
        assert_eq!(
            result.err().map(|e| e.kind().clone()),
            Some(ErrorKind::ConfigurationError)
        );
    }

    #[test]
    fn test_setters_ignored_after_error() {
        let builder = RepositoryBuilder::new()
            .collection_name("$bad")
            .collection_name("Good");
        assert!(builder.collection_name.is_none());
        assert!(builder.error.is_some());
    }

    #[test]
    fn test_open_async_in_memory() {
        futures::executor::block_on(async {
            let mut repository = RepositoryBuilder::new()
                .collection_name("Receipts")
                .open_async::<Invoice>()
                .await
                .unwrap();
            assert!(repository.is_in_memory());
            assert_eq!(repository.collection_name(), "Receipts");

            repository
                .add(Invoice {
                    id: None,
                    amount: 12,
                })
                .await
                .unwrap();
            assert_eq!(repository.count().await.unwrap(), 1);
        });
    }
}
