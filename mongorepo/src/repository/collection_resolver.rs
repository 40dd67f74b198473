use dashmap::DashMap;
use std::any::TypeId;
use std::sync::LazyLock;

use super::{Entity, EntityType};

static RESOLVER: LazyLock<CollectionResolver> = LazyLock::new(CollectionResolver::new);

/// Returns the collection name for an entity type using the process-wide resolver.
///
/// # Examples
///
/// ```rust,ignore
/// assert_eq!(collection_name::<Dog>(), "AnimalsTest");
/// ```
pub fn collection_name<T: Entity>() -> String {
    RESOLVER.resolve(T::entity_type())
}

/// Maps entity types to collection names.
///
/// # Purpose
/// Decides which collection an entity type is stored in, independent of the backend.
///
/// # Resolution rules
/// Walking from the type towards its root:
/// - the nearest type carrying an explicit collection name wins
/// - without any override, the simple name of the highest ancestor is used
/// - a type without ancestors resolves to its own name
///
/// Subtypes of a common base therefore share a collection unless a subtree declares
/// its own name. Resolution never fails.
///
/// # Characteristics
/// - Results are cached in a table keyed by `TypeId`
/// - Thread-safe; the table can be pre-filled at startup with [`CollectionResolver::with_types`]
pub struct CollectionResolver {
    names: DashMap<TypeId, String>,
}

impl CollectionResolver {
    pub fn new() -> Self {
        CollectionResolver {
            names: DashMap::new(),
        }
    }

    /// Creates a resolver with the given hierarchy already resolved.
    pub fn with_types(entity_types: &[&EntityType]) -> Self {
        let resolver = CollectionResolver::new();
        for entity_type in entity_types {
            resolver.resolve(entity_type);
        }
        resolver
    }

    /// Returns the collection name for the given entity type.
    pub fn resolve(&self, entity_type: &EntityType) -> String {
        let type_id = entity_type.type_id();
        if let Some(name) = self.names.get(&type_id) {
            return name.value().clone();
        }

        let name = resolve_name(entity_type);
        log::debug!("Resolved collection {} for entity type {}", name, entity_type);
        self.names.insert(type_id, name.clone());
        name
    }

    /// Number of entity types resolved so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for CollectionResolver {
    fn default() -> Self {
        CollectionResolver::new()
    }
}

fn resolve_name(entity_type: &EntityType) -> String {
    let mut root = entity_type;
    for ancestor in entity_type.lineage() {
        if let Some(name) = ancestor.collection_name() {
            return name.to_string();
        }
        root = ancestor;
    }
    root.name().to_string()
}
