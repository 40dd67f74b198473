//! Query filters and predicates for selecting entities.
//!
//! A filter is evaluated against the document form of an entity, so the same filter
//! selects the same entities in memory and on a MongoDB server, where it is sent as a
//! native query document.
//!
//! # Creating Filters
//!
//! - `field("age").gt(30)` - comparison operators
//! - `field("name").eq("Alice")` - equality checks
//! - `field("name").starts_with("Client")` - literal prefix match
//! - `all()` - match all entities
//! - `by_id::<Customer>(&id)` - match by identifier
//! - `field("name").eq("Bob").and(field("age").gt(30))` - logical AND
//!
//! # Examples
//!
//! ```rust,ignore
//! use mongorepo::filter::{field, all};
//!
//! let filter = field("price").gte(3).or(field("name").regex("^Client"));
//! let removed = repository.delete_where(filter)?;
//! ```
//!
//! # Supported Operators
//!
//! - **Equality**: `eq`, `ne`
//! - **Comparison**: `gt`, `gte`, `lt`, `lte`, `between`
//! - **Pattern**: `regex`, `starts_with`, `ends_with`
//! - **Array**: `is_in`, `not_in`
//! - **Logical**: `and`, `or`, `not`
//! - **Special**: `all` (match all), `by_id` (match by identifier)
//!
//! Closures `Fn(&T) -> bool` are also accepted as [`Predicate`]s but only the
//! in-memory backend can evaluate them.

mod filter;
mod fluent;
mod predicate;

mod basic_filters;
mod logical_filters;
mod pattern_filters;
mod range_filters;

pub(crate) use basic_filters::*;
pub use filter::*;
pub use fluent::*;
pub(crate) use logical_filters::*;
pub(crate) use pattern_filters::*;
pub use predicate::*;
pub(crate) use range_filters::*;
