use bson::{Bson, Document};
use std::{any::Any, fmt::Display};

use crate::{
    common::util::{create_document, get_field, values_equal},
    common::{OP_EQ, OP_IN, OP_NE, OP_NIN},
    errors::RepositoryResult,
};

use super::FilterProvider;

/// A filter that matches all documents.
///
/// Translates to the empty query `{}`.
pub(crate) struct AllFilter;

impl FilterProvider for AllFilter {
    fn apply(&self, _entry: &Document) -> RepositoryResult<bool> {
        Ok(true)
    }

    fn to_query(&self) -> RepositoryResult<Document> {
        Ok(Document::new())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for AllFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AllFilter")
    }
}

/// Matches a field value the way the query engine does for `$eq`.
///
/// An array field matches when any of its elements equals the value; a missing field
/// matches only `null`.
fn field_equals(value: Option<&Bson>, target: &Bson) -> bool {
    match value {
        None => matches!(target, Bson::Null),
        Some(Bson::Array(items)) if !matches!(target, Bson::Array(_)) => {
            items.iter().any(|item| values_equal(item, target))
        }
        Some(value) => values_equal(value, target),
    }
}

/// A filter that matches documents where a field equals a specific value.
///
/// # Responsibilities
///
/// * **Equality Matching**: Evaluates whether a field equals a target value
/// * **Query Translation**: Produces `{ field: { "$eq": value } }`
pub(crate) struct EqualsFilter {
    field_name: String,
    field_value: Bson,
}

impl EqualsFilter {
    /// Creates a new equality filter for the specified field and value.
    ///
    /// # Arguments
    ///
    /// * `field_name` - The name of the field to filter on, dotted for embedded fields
    /// * `field_value` - The value to match against
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Bson) -> Self {
        EqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl Display for EqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} == {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for EqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> RepositoryResult<bool> {
        let value = get_field(entry, &self.field_name);
        Ok(field_equals(value, &self.field_value))
    }

    fn to_query(&self) -> RepositoryResult<Document> {
        Ok(create_document(
            &self.field_name,
            Bson::Document(create_document(OP_EQ, self.field_value.clone())),
        ))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A filter that matches documents where a field does not equal a specific value.
///
/// Documents without the field match, as they do for `$ne`.
pub(crate) struct NotEqualsFilter {
    field_name: String,
    field_value: Bson,
}

impl NotEqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Bson) -> Self {
        NotEqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl Display for NotEqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} != {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for NotEqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> RepositoryResult<bool> {
        let value = get_field(entry, &self.field_name);
        Ok(!field_equals(value, &self.field_value))
    }

    fn to_query(&self) -> RepositoryResult<Document> {
        Ok(create_document(
            &self.field_name,
            Bson::Document(create_document(OP_NE, self.field_value.clone())),
        ))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn format_values(values: &[Bson]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A filter that matches documents whose field equals any of the given values.
pub(crate) struct InFilter {
    field_name: String,
    field_values: Vec<Bson>,
}

impl InFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_values: Vec<Bson>) -> Self {
        InFilter {
            field_name,
            field_values,
        }
    }
}

impl Display for InFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} in [{}])", self.field_name, format_values(&self.field_values))
    }
}

impl FilterProvider for InFilter {
    fn apply(&self, entry: &Document) -> RepositoryResult<bool> {
        let value = get_field(entry, &self.field_name);
        Ok(self
            .field_values
            .iter()
            .any(|target| field_equals(value, target)))
    }

    fn to_query(&self) -> RepositoryResult<Document> {
        Ok(create_document(
            &self.field_name,
            Bson::Document(create_document(OP_IN, Bson::Array(self.field_values.clone()))),
        ))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A filter that matches documents whose field equals none of the given values.
pub(crate) struct NotInFilter {
    field_name: String,
    field_values: Vec<Bson>,
}

impl NotInFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_values: Vec<Bson>) -> Self {
        NotInFilter {
            field_name,
            field_values,
        }
    }
}

impl Display for NotInFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} not in [{}])", self.field_name, format_values(&self.field_values))
    }
}

impl FilterProvider for NotInFilter {
    fn apply(&self, entry: &Document) -> RepositoryResult<bool> {
        let value = get_field(entry, &self.field_name);
        Ok(!self
            .field_values
            .iter()
            .any(|target| field_equals(value, target)))
    }

    fn to_query(&self) -> RepositoryResult<Document> {
        Ok(create_document(
            &self.field_name,
            Bson::Document(create_document(OP_NIN, Bson::Array(self.field_values.clone()))),
        ))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_equals_filter_apply() {
        let filter = EqualsFilter::new("name".to_string(), Bson::String("Bob".into()));
        assert!(filter.apply(&doc! { "name": "Bob" }).unwrap());
        assert!(!filter.apply(&doc! { "name": "Alice" }).unwrap());
        assert!(!filter.apply(&doc! {}).unwrap());
    }

    #[test]
    fn test_equals_filter_widens_numbers() {
        let filter = EqualsFilter::new("price".to_string(), Bson::Int32(3));
        assert!(filter.apply(&doc! { "price": 3.0 }).unwrap());
        assert!(filter.apply(&doc! { "price": 3_i64 }).unwrap());
    }

    #[test]
    fn test_equals_null_matches_missing_field() {
        let filter = EqualsFilter::new("email".to_string(), Bson::Null);
        assert!(filter.apply(&doc! {}).unwrap());
        assert!(filter.apply(&doc! { "email": null }).unwrap());
        assert!(!filter.apply(&doc! { "email": "a@b.c" }).unwrap());
    }

    #[test]
    fn test_equals_matches_array_element() {
        let filter = EqualsFilter::new("tags".to_string(), Bson::String("red".into()));
        assert!(filter.apply(&doc! { "tags": ["blue", "red"] }).unwrap());
        assert!(!filter.apply(&doc! { "tags": ["blue"] }).unwrap());
    }

    #[test]
    fn test_equals_on_nested_field() {
        let filter = EqualsFilter::new("address.city".to_string(), Bson::String("Oslo".into()));
        assert!(filter.apply(&doc! { "address": { "city": "Oslo" } }).unwrap());
    }

    #[test]
    fn test_equals_filter_query() {
        let filter = EqualsFilter::new("name".to_string(), Bson::String("Bob".into()));
        assert_eq!(filter.to_query().unwrap(), doc! { "name": { "$eq": "Bob" } });
    }

    #[test]
    fn test_not_equals_filter() {
        let filter = NotEqualsFilter::new("name".to_string(), Bson::String("Bob".into()));
        assert!(!filter.apply(&doc! { "name": "Bob" }).unwrap());
        assert!(filter.apply(&doc! { "name": "Alice" }).unwrap());
        assert!(filter.apply(&doc! {}).unwrap());
        assert_eq!(filter.to_query().unwrap(), doc! { "name": { "$ne": "Bob" } });
    }

    #[test]
    fn test_in_filter() {
        let filter = InFilter::new("age".to_string(), vec![Bson::Int32(1), Bson::Int32(2)]);
        assert!(filter.apply(&doc! { "age": 2 }).unwrap());
        assert!(!filter.apply(&doc! { "age": 3 }).unwrap());
        assert!(!filter.apply(&doc! {}).unwrap());
        assert_eq!(filter.to_query().unwrap(), doc! { "age": { "$in": [1, 2] } });
    }

    #[test]
    fn test_not_in_filter() {
        let filter = NotInFilter::new("age".to_string(), vec![Bson::Int32(1), Bson::Int32(2)]);
        assert!(!filter.apply(&doc! { "age": 2 }).unwrap());
        assert!(filter.apply(&doc! { "age": 3 }).unwrap());
        assert!(filter.apply(&doc! {}).unwrap());
        assert_eq!(filter.to_query().unwrap(), doc! { "age": { "$nin": [1, 2] } });
    }

    #[test]
    fn test_in_filter_display_with_multiple_values() {
        let filter = InFilter::new("age".to_string(), vec![Bson::Int32(1), Bson::Int32(2)]);
        assert_eq!(filter.to_string(), "(age in [1, 2])");
    }
}
