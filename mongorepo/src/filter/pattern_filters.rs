use bson::{Bson, Document};
use regex::Regex;
use std::{any::Any, fmt::Display};

use crate::{
    common::util::{create_document, get_field},
    common::OP_REGEX,
    errors::{ErrorKind, RepositoryError, RepositoryResult},
};

use super::FilterProvider;

/// A filter that matches string fields against a regular expression.
///
/// The pattern is compiled once when the filter is built. It is sent to the server
/// unchanged as `$regex`, so it should stay within the syntax both engines share
/// (anchors, classes, quantifiers, alternation).
///
/// An array field matches when one of its string elements does. Other non-string and
/// missing fields do not match. An invalid pattern is logged at
/// construction and reported as `FilterError` when the filter is used.
pub(crate) struct RegexFilter {
    field_name: String,
    field_value: String,
    pattern: Option<Regex>,
}

impl RegexFilter {
    /// Creates a new regex filter with the specified field name and pattern.
    pub(crate) fn new(field_name: String, field_value: String) -> Self {
        let pattern = match Regex::new(&field_value) {
            Ok(regex) => Some(regex),
            Err(err) => {
                log::error!("Invalid regex pattern '{}': {}", field_value, err);
                None
            }
        };

        RegexFilter {
            field_name,
            field_value,
            pattern,
        }
    }

    fn invalid_pattern(&self) -> RepositoryError {
        log::error!("Invalid regex pattern for filter {}", self);
        RepositoryError::new(
            &format!("Invalid regex pattern '{}'", self.field_value),
            ErrorKind::FilterError,
        )
    }
}

impl Display for RegexFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} =~ {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for RegexFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> RepositoryResult<bool> {
        let pattern = self.pattern.as_ref().ok_or_else(|| self.invalid_pattern())?;
        let matched = match get_field(entry, &self.field_name) {
            Some(Bson::String(value)) => pattern.is_match(value),
            Some(Bson::Array(items)) => items
                .iter()
                .any(|item| matches!(item, Bson::String(value) if pattern.is_match(value))),
            _ => false,
        };
        Ok(matched)
    }

    fn to_query(&self) -> RepositoryResult<Document> {
        if self.pattern.is_none() {
            return Err(self.invalid_pattern());
        }
        Ok(create_document(
            &self.field_name,
            Bson::Document(create_document(OP_REGEX, Bson::String(self.field_value.clone()))),
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
    fn test_regex_filter_apply() {
        let filter = RegexFilter::new("name".to_string(), "^Client".to_string());
        assert!(filter.apply(&doc! { "name": "Client 1" }).unwrap());
        assert!(!filter.apply(&doc! { "name": "Customer" }).unwrap());
    }

    #[test]
    fn test_regex_filter_non_string_field() {
        let filter = RegexFilter::new("age".to_string(), "4.*".to_string());
        assert!(!filter.apply(&doc! { "age": 42 }).unwrap());
        assert!(!filter.apply(&doc! {}).unwrap());
    }

    #[test]
    fn test_regex_filter_matches_array_elements() {
        let filter = RegexFilter::new("words".to_string(), "^app".to_string());
        assert!(filter.apply(&doc! { "words": ["pear", "apple"] }).unwrap());
        assert!(!filter.apply(&doc! { "words": ["pear", 1] }).unwrap());
        assert!(!filter.apply(&doc! { "words": [] }).unwrap());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let filter = RegexFilter::new("name".to_string(), "(unclosed".to_string());
        let err = filter.apply(&doc! { "name": "x" }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FilterError);
        assert_eq!(filter.to_query().unwrap_err().kind(), &ErrorKind::FilterError);
    }

    #[test]
    fn test_regex_filter_query() {
        let filter = RegexFilter::new("name".to_string(), "^Client".to_string());
        assert_eq!(filter.to_query().unwrap(), doc! { "name": { "$regex": "^Client" } });
        assert_eq!(filter.to_string(), "(name =~ ^Client)");
    }
}
