use bson::{Bson, Document};

use crate::common::FIELD_SEPARATOR;

/// Looks up a possibly nested field using dot notation.
///
/// `"home_address.city"` descends into embedded documents; a numeric segment such as
/// `"orders.0"` indexes into an array. Returns `None` when any segment is missing.
pub fn get_field<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split(FIELD_SEPARATOR);
    let first = segments.next()?;
    let mut current = document.get(first)?;

    for segment in segments {
        current = match current {
            Bson::Document(embedded) => embedded.get(segment)?,
            Bson::Array(array) => {
                let index = segment.parse::<usize>().ok()?;
                array.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Creates a document with a single key-value pair.
pub fn create_document(key: &str, value: Bson) -> Document {
    let mut doc = Document::new();
    doc.insert(key, value);
    doc
}
