#![recursion_limit = "128"]
//! # mongorepo Derive Macros
//!
//! This crate provides the `Entity` derive macro for the `mongorepo` crate.
//!
//! ## `Entity`
//!
//! Implements `mongorepo::repository::Entity` for a struct with named fields. The
//! identifier field must be declared as `Option<K>`; `K` becomes the entity key type.
//!
//! - `#[entity(collection = "...")]` stores the type and its subtypes in the named
//!   collection
//! - `#[entity(parent = Type)]` declares the base type in an entity hierarchy
//! - `#[entity(id(field = "..."))]` names the identifier field (default `id`)
//! - `#[entity(id(object_id))]` stores a text identifier as a 12-byte object id; the
//!   field must carry `#[serde(with = "mongorepo::repository::legacy_object_id")]`
//!
//! The identifier field must be stored as `_id` through `#[serde(rename = "_id")]`.
//!
//! # Examples
//!
//! ```rust,ignore
//! use mongorepo_derive::Entity;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Entity, Clone, Serialize, Deserialize)]
//! #[entity(collection = "AnimalsTest")]
//! pub struct Animal {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<String>,
//!     pub name: String,
//! }
//!
//! #[derive(Entity, Clone, Serialize, Deserialize)]
//! #[entity(parent = Animal)]
//! pub struct Dog {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<String>,
//!     pub name: String,
//! }
//! ```
//!
//! Enums grouping several entity types in one collection implement the trait by hand,
//! overriding `runtime_type` per variant.

extern crate proc_macro;
mod entity;

use crate::entity::generate_entity_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives the `Entity` trait for repository persistence.
///
/// # Errors
///
/// Returns a compile error if:
/// - Applied to an enum, a union, a tuple struct or a generic struct
/// - The identifier field is missing or not an `Option<_>`
/// - The identifier field is not renamed to `_id` with `#[serde(rename = "_id")]`
/// - `object_id` is used with a non-text identifier, or without the
///   `legacy_object_id` serde helper on the field
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_entity_for_struct(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => {
                let error = syn::Error::new(
                    e.span(),
                    format!(
                        "Failed to derive Entity for struct '{}': {}.\n\
                         Example: #[derive(Entity)] pub struct MyEntity {{ id: Option<String> }}",
                        ast.ident, e
                    ),
                );
                error.to_compile_error().into()
            }
        },
        Data::Enum(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive Entity for enums. Implement mongorepo::repository::Entity by hand \
                 and override runtime_type for each variant.",
            );
            error.to_compile_error().into()
        }
        Data::Union(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive Entity for unions. Only structs are supported.",
            );
            error.to_compile_error().into()
        }
    }
}
