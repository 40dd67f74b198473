//! Typed repositories over entity collections.
//!
//! This module provides the [`Repository`] and [`AsyncRepository`] traits and their
//! backends:
//!
//! - [`InMemoryRepository`] keeps entities in a vector, useful for tests and prototypes
//! - [`MongoRepository`] and [`AsyncMongoRepository`] store entities in a MongoDB
//!   collection through the official driver
//! - [`ObjectRepository`] and [`AsyncObjectRepository`] pick one of the above from a
//!   [`crate::RepositoryConfig`]
//!
//! # Entities
//!
//! Every stored type implements [`Entity`], usually through `#[derive(Entity)]`. The
//! entity descriptor decides the collection name (see [`CollectionResolver`]) and how
//! the identifier is generated and stored.
//!
//! ```rust,ignore
//! use mongorepo::repository::{InMemoryRepository, Repository};
//! use mongorepo::filter::field;
//!
//! let mut customers = InMemoryRepository::<Customer>::new();
//! customers.add(Customer::new("Bob", 42))?;
//!
//! let seniors = customers.find(field("age").gt(40))?.to_vec()?;
//! ```

mod async_mongo_repository;
mod async_object_repository;
mod collection_resolver;
mod cursor;
mod entity;
mod id_policy;
mod memory_repository;
mod mongo_repository;
mod object_repository;
mod repository;

pub use async_mongo_repository::*;
pub use async_object_repository::*;
pub use collection_resolver::*;
pub use cursor::*;
pub use entity::*;
pub use id_policy::{generate_id, id_filter, id_value, legacy_object_id, needs_legacy_conversion};
pub(crate) use id_policy::{ensure_id, normalize_id, require_id, same_id};
pub use memory_repository::*;
pub use mongo_repository::MongoRepository;
pub(crate) use mongo_repository::default_connection_string;
pub use object_repository::*;
pub use repository::*;
