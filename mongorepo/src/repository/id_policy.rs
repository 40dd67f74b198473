use bson::oid::ObjectId;
use bson::{Bson, Document};

use crate::common::util::create_document;
use crate::common::DOC_ID;
use crate::errors::{ErrorKind, RepositoryError, RepositoryResult};

use super::{Entity, EntityKey};

/// Creates a new identifier for key type `K`.
///
/// Text keys get a random 24 character hexadecimal token. Every other key type
/// returns `None`, meaning the caller must supply the identifier.
pub fn generate_id<K: EntityKey>() -> Option<K> {
    K::generate()
}

/// Returns true when identifiers of `T` are text exposed to callers but stored as a
/// 12-byte object id, so lookups must convert the text before matching.
pub fn needs_legacy_conversion<T: Entity>() -> bool {
    T::entity_type().is_legacy_object_id() && <T::Id as EntityKey>::IS_TEXT
}

fn parse_legacy_id<T: Entity>(id: &T::Id) -> RepositoryResult<ObjectId> {
    let text = id.as_text().ok_or_else(|| {
        log::error!("Legacy object id of {} is not text", T::entity_type());
        RepositoryError::new("Legacy object id must be text", ErrorKind::InvalidId)
    })?;
    ObjectId::parse_str(text).map_err(|err| {
        log::error!("Cannot convert {} to an object id: {}", text, err);
        RepositoryError::new_with_cause(
            &format!("Identifier '{}' is not a valid object id", text),
            ErrorKind::InvalidId,
            err,
        )
    })
}

/// Converts an identifier into the value stored in the `_id` field.
pub fn id_value<T: Entity>(id: &T::Id) -> RepositoryResult<Bson> {
    if needs_legacy_conversion::<T>() {
        Ok(Bson::ObjectId(parse_legacy_id::<T>(id)?))
    } else {
        Ok(bson::to_bson(id)?)
    }
}

/// Returns true when both identifiers address the same stored document.
///
/// Legacy object ids are hex, so they compare without regard to case.
pub(crate) fn same_id<T: Entity>(stored: &T::Id, id: &T::Id) -> bool {
    if needs_legacy_conversion::<T>() {
        match (stored.as_text(), id.as_text()) {
            (Some(left), Some(right)) => left.eq_ignore_ascii_case(right),
            _ => stored == id,
        }
    } else {
        stored == id
    }
}

/// Rewrites a supplied legacy object id in the lowercase form it is read back as.
///
/// Fails with `InvalidId` when the id is not valid hex. Other identifiers are left
/// untouched.
pub(crate) fn normalize_id<T: Entity>(entity: &mut T) -> RepositoryResult<()> {
    if !needs_legacy_conversion::<T>() {
        return Ok(());
    }

    let normalized = match entity.id() {
        Some(id) => {
            let hex = parse_legacy_id::<T>(id)?.to_hex();
            if id.as_text() == Some(hex.as_str()) {
                None
            } else {
                <T::Id as EntityKey>::from_text(hex)
            }
        }
        None => None,
    };

    if let Some(id) = normalized {
        entity.set_id(id);
    }
    Ok(())
}

/// Builds the equality filter `{ "_id": <stored id> }`.
pub fn id_filter<T: Entity>(id: &T::Id) -> RepositoryResult<Document> {
    Ok(create_document(DOC_ID, id_value::<T>(id)?))
}

/// Assigns a generated identifier when the entity has none.
///
/// Fails with `InvalidArgument` when the key type is not generated and the caller did
/// not supply one, and with `InvalidId` when a supplied legacy id is not valid hex.
pub(crate) fn ensure_id<T: Entity>(entity: &mut T) -> RepositoryResult<()> {
    match entity.id() {
        Some(_) => normalize_id(entity),
        None => match generate_id::<T::Id>() {
            Some(id) => {
                entity.set_id(id);
                Ok(())
            }
            None => {
                log::error!("Entity of type {} requires a caller supplied id", T::entity_type());
                Err(RepositoryError::new(
                    &format!("An id must be supplied for entities of type {}", T::entity_type()),
                    ErrorKind::InvalidArgument,
                ))
            }
        },
    }
}

/// Returns the identifier or fails with `InvalidArgument`.
pub(crate) fn require_id<T: Entity>(entity: &T) -> RepositoryResult<&T::Id> {
    entity.id().ok_or_else(|| {
        log::error!("Entity of type {} has no id", T::entity_type());
        RepositoryError::new(
            &format!("Entity of type {} has no id", T::entity_type()),
            ErrorKind::InvalidArgument,
        )
    })
}

/// Serde helper storing an optional text identifier as an object id.
///
/// # Usage
/// ```ignore
/// #[derive(Entity, Clone, Serialize, Deserialize)]
/// #[entity(id(field = "id", object_id))]
/// pub struct Customer {
///     #[serde(
///         rename = "_id",
///         with = "mongorepo::repository::legacy_object_id",
///         skip_serializing_if = "Option::is_none",
///         default
///     )]
///     id: Option<String>,
/// }
/// ```
pub mod legacy_object_id {
    use bson::oid::ObjectId;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(id: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match id {
            Some(text) => {
                let object_id = ObjectId::parse_str(text).map_err(serde::ser::Error::custom)?;
                object_id.serialize(serializer)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object_id = Option::<ObjectId>::deserialize(deserializer)?;
        Ok(object_id.map(|id| id.to_hex()))
    }
}
