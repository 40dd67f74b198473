//! # mongorepo
//!
//! A generic, strongly typed repository over MongoDB collections, with an
//! interchangeable in-memory backend for tests.
//!
//! ## Key Features
//!
//! - **Typed**: entities are plain serde structs implementing [`repository::Entity`]
//! - **Two backends**: MongoDB (blocking and async driver APIs) and in-memory
//! - **Hierarchies**: subtypes share their base type's collection unless they declare
//!   their own, and queries can be narrowed to a subtype
//! - **Filters**: one filter value evaluates in memory and translates to a MongoDB query
//! - **Legacy ids**: text identifiers can be stored as 12-byte object ids
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mongorepo::filter::field;
//! use mongorepo::repository::Repository;
//! use mongorepo::RepositoryBuilder;
//!
//! # fn main() -> mongorepo::errors::RepositoryResult<()> {
//! let mut customers = RepositoryBuilder::new()
//!     .mongodb("mongodb://localhost:27017/shop")
//!     .open::<Customer>()?;
//!
//! let bob = customers.add(Customer::new("Bob", 42))?;
//! let found = customers.get_by_id(bob.id.as_ref().unwrap())?;
//!
//! let seniors = customers.count_where(field("age").gte(40))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Constants and document helpers
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - Query filters and predicates
//! - [`repository`] - Entities, repository traits and backends
//! - [`repository_builder`] - Fluent configuration
//! - [`repository_config`] - Backend selection

extern crate self as mongorepo;

pub mod common;
pub mod errors;
pub mod filter;
pub mod repository;
pub mod repository_builder;
pub mod repository_config;

pub use repository_builder::RepositoryBuilder;
pub use repository_config::{RepositoryBackend, RepositoryConfig};

#[cfg(test)]
#[ctor::ctor]
fn init() {
    colog::init();
}
