use bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::TypeId;
use std::fmt::{Debug, Display, Formatter};

use crate::common::DOC_ID;

/// Trait that describes a persistable entity.
///
/// # Purpose
/// Binds a Rust type to its static [`EntityType`] descriptor and exposes the identifier
/// field. Implemented automatically by the `Entity` derive macro, or by hand for types
/// the macro cannot handle (for example an enum that groups several entity types stored
/// in one collection).
///
/// # Characteristics
/// - The identifier is an `Option<Self::Id>`; `None` means "not assigned yet"
/// - The identifier is persisted in the `_id` document field
/// - `runtime_type()` reports the concrete type of a value, which differs from
///   `entity_type()` only for polymorphic wrappers
///
/// # Usage
/// ```ignore
/// #[derive(Entity, Clone, Serialize, Deserialize)]
/// #[entity(collection = "AnimalsTest")]
/// pub struct Animal {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     id: Option<String>,
///     name: String,
/// }
///
/// #[derive(Entity, Clone, Serialize, Deserialize)]
/// #[entity(parent = Animal)]
/// pub struct Dog {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     id: Option<String>,
///     name: String,
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    /// Key type of the identifier field.
    type Id: EntityKey;

    /// Static descriptor of this type, including its ancestor chain.
    fn entity_type() -> &'static EntityType;

    /// Returns the identifier, or `None` when it has not been assigned.
    fn id(&self) -> Option<&Self::Id>;

    /// Assigns the identifier.
    fn set_id(&mut self, id: Self::Id);

    /// Returns the descriptor of the concrete value.
    fn runtime_type(&self) -> &'static EntityType {
        Self::entity_type()
    }
}

/// Key types usable as entity identifiers.
///
/// Only text keys are generated by the repository; every other key type must be
/// supplied by the caller before the entity is added.
pub trait EntityKey:
    Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
    /// True for text keys, the only keys the repository generates.
    const IS_TEXT: bool = false;

    /// Creates a new key, or `None` when the caller must supply one.
    fn generate() -> Option<Self> {
        None
    }

    /// Returns the textual form of a text key.
    fn as_text(&self) -> Option<&str> {
        None
    }

    /// Builds a text key from its textual form.
    fn from_text(_text: String) -> Option<Self> {
        None
    }
}

impl EntityKey for String {
    const IS_TEXT: bool = true;

    fn generate() -> Option<Self> {
        Some(ObjectId::new().to_hex())
    }

    fn as_text(&self) -> Option<&str> {
        Some(self.as_str())
    }

    fn from_text(text: String) -> Option<Self> {
        Some(text)
    }
}

impl EntityKey for i32 {}

impl EntityKey for i64 {}

impl EntityKey for ObjectId {}

/// Static description of an entity type.
///
/// # Purpose
/// Replaces runtime reflection over a class hierarchy: each entity type owns one
/// `'static` descriptor naming the type, its optional collection override, its optional
/// parent and its identifier configuration. The collection resolver walks the parent
/// links to decide which collection a type lives in.
///
/// # Characteristics
/// - Built in `const` context, usually inside a `static` generated by the derive macro
/// - Parents are referenced through function pointers so descriptors can point at each
///   other without initialization order concerns
/// - Identity is the Rust `TypeId` of the described type
///
/// # Usage
/// ```ignore
/// impl Entity for Shape {
///     type Id = String;
///
///     fn entity_type() -> &'static EntityType {
///         static ENTITY_TYPE: EntityType = EntityType::new("Shape", TypeId::of::<Shape>)
///             .with_collection_name("Shapes");
///         &ENTITY_TYPE
///     }
///     // ...
/// }
/// ```
pub struct EntityType {
    name: &'static str,
    type_id: fn() -> TypeId,
    collection_name: Option<&'static str>,
    parent: Option<fn() -> &'static EntityType>,
    id_field: &'static str,
    legacy_object_id: bool,
}

impl EntityType {
    /// Creates a descriptor with no parent, no override and `id` as identifier field.
    ///
    /// # Arguments
    /// * `name` - Simple type name (e.g. "Dog")
    /// * `type_id` - Function returning the `TypeId` of the described type
    pub const fn new(name: &'static str, type_id: fn() -> TypeId) -> Self {
        EntityType {
            name,
            type_id,
            collection_name: None,
            parent: None,
            id_field: "id",
            legacy_object_id: false,
        }
    }

    /// Declares an explicit collection name for this type and its subtree.
    pub const fn with_collection_name(mut self, collection_name: &'static str) -> Self {
        self.collection_name = Some(collection_name);
        self
    }

    /// Declares the parent type in the entity hierarchy.
    pub const fn with_parent(mut self, parent: fn() -> &'static EntityType) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Names the Rust field holding the identifier.
    pub const fn with_id_field(mut self, id_field: &'static str) -> Self {
        self.id_field = id_field;
        self
    }

    /// Marks the text identifier as physically stored as a 12-byte object id.
    pub const fn with_legacy_object_id(mut self, legacy_object_id: bool) -> Self {
        self.legacy_object_id = legacy_object_id;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    pub fn collection_name(&self) -> Option<&'static str> {
        self.collection_name
    }

    pub fn parent(&self) -> Option<&'static EntityType> {
        self.parent.map(|parent| parent())
    }

    pub fn id_field(&self) -> &'static str {
        self.id_field
    }

    /// Name of the document field the identifier is stored in.
    pub fn stored_id_field(&self) -> &'static str {
        DOC_ID
    }

    pub fn is_legacy_object_id(&self) -> bool {
        self.legacy_object_id
    }

    /// Iterates over this type followed by its ancestors, nearest first.
    ///
    /// A cyclic chain stops before revisiting a type.
    pub fn lineage(&self) -> Lineage<'_> {
        Lineage {
            next: Some(self),
            visited: Vec::new(),
        }
    }

    /// Returns true when `self` is `other` or one of its descendants.
    pub fn is_a(&self, other: &EntityType) -> bool {
        let target = other.type_id();
        self.lineage().any(|entity_type| entity_type.type_id() == target)
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id() == other.type_id()
    }
}

impl Eq for EntityType {}

impl Debug for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("collection_name", &self.collection_name)
            .field("parent", &self.parent().map(|p| p.name))
            .field("id_field", &self.id_field)
            .field("legacy_object_id", &self.legacy_object_id)
            .finish()
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Iterator over an entity type and its ancestors.
pub struct Lineage<'a> {
    next: Option<&'a EntityType>,
    visited: Vec<TypeId>,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = &'a EntityType;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let type_id = current.type_id();
        if self.visited.contains(&type_id) {
            log::warn!("Entity hierarchy of {} contains a cycle", current.name);
            return None;
        }
        self.visited.push(type_id);
        self.next = current.parent();
        Some(current)
    }
}
