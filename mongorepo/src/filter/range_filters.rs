use bson::{Bson, Document};
use std::cmp::Ordering;
use std::{any::Any, fmt::Display};

use crate::{
    common::util::{compare_values, create_document, get_field},
    common::{OP_GT, OP_GTE, OP_LT, OP_LTE},
    errors::RepositoryResult,
};

use super::FilterProvider;

/// Comparison modes for range-based field comparisons.
///
/// Created through the comparison methods of the fluent builder:
/// - `Greater` from `gt()`
/// - `GreaterEqual` from `gte()`
/// - `Lesser` from `lt()`
/// - `LesserEqual` from `lte()`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ComparisonMode {
    Greater,
    GreaterEqual,
    Lesser,
    LesserEqual,
}

impl ComparisonMode {
    fn operator(&self) -> &'static str {
        match self {
            ComparisonMode::Greater => OP_GT,
            ComparisonMode::GreaterEqual => OP_GTE,
            ComparisonMode::Lesser => OP_LT,
            ComparisonMode::LesserEqual => OP_LTE,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            ComparisonMode::Greater => ">",
            ComparisonMode::GreaterEqual => ">=",
            ComparisonMode::Lesser => "<",
            ComparisonMode::LesserEqual => "<=",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            ComparisonMode::Greater => ordering == Ordering::Greater,
            ComparisonMode::GreaterEqual => ordering != Ordering::Less,
            ComparisonMode::Lesser => ordering == Ordering::Less,
            ComparisonMode::LesserEqual => ordering != Ordering::Greater,
        }
    }
}

// array fields match when any element satisfies the comparison
fn field_compares(value: &Bson, threshold: &Bson, mode: ComparisonMode) -> bool {
    let accepts = |item: &Bson| {
        compare_values(item, threshold).is_some_and(|ordering| mode.accepts(ordering))
    };
    match value {
        Bson::Array(items) if !matches!(threshold, Bson::Array(_)) => items.iter().any(accepts),
        _ => accepts(value),
    }
}

/// Compares a field value against a threshold.
///
/// A document matches only when the field exists and is comparable with the threshold;
/// a missing field or a value of an unrelated type never matches. An array field
/// matches when one of its elements does.
pub(crate) struct ComparisonFilter {
    field_name: String,
    field_value: Bson,
    mode: ComparisonMode,
}

impl ComparisonFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Bson, mode: ComparisonMode) -> Self {
        ComparisonFilter {
            field_name,
            field_value,
            mode,
        }
    }
}

impl Display for ComparisonFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.field_name, self.mode.symbol(), self.field_value)
    }
}

impl FilterProvider for ComparisonFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> RepositoryResult<bool> {
        let matched = get_field(entry, &self.field_name)
            .is_some_and(|value| field_compares(value, &self.field_value, self.mode));
        Ok(matched)
    }

    fn to_query(&self) -> RepositoryResult<Document> {
        Ok(create_document(
            &self.field_name,
            Bson::Document(create_document(self.mode.operator(), self.field_value.clone())),
        ))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Lower and upper bounds of a `between` filter.
pub(crate) struct Bound {
    lower_bound: Bson,
    upper_bound: Bson,
    lower_inclusive: bool,
    upper_inclusive: bool,
}

impl Bound {
    pub(crate) fn inclusive(lower_bound: Bson, upper_bound: Bson) -> Self {
        Bound::new(lower_bound, upper_bound, true, true)
    }

    pub(crate) fn new(
        lower_bound: Bson,
        upper_bound: Bson,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Self {
        Bound {
            lower_bound,
            upper_bound,
            lower_inclusive,
            upper_inclusive,
        }
    }

    fn lower_mode(&self) -> ComparisonMode {
        if self.lower_inclusive {
            ComparisonMode::GreaterEqual
        } else {
            ComparisonMode::Greater
        }
    }

    fn upper_mode(&self) -> ComparisonMode {
        if self.upper_inclusive {
            ComparisonMode::LesserEqual
        } else {
            ComparisonMode::Lesser
        }
    }
}

/// Matches documents whose field lies within a range.
///
/// Translates to a single field condition carrying both operators, for example
/// `{ "price": { "$gte": 1, "$lt": 5 } }`.
pub(crate) struct BetweenFilter {
    field_name: String,
    bound: Bound,
}

impl BetweenFilter {
    pub(crate) fn new(field_name: String, bound: Bound) -> Self {
        BetweenFilter { field_name, bound }
    }
}

impl Display for BetweenFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({} {} {} and {} {} {})",
            self.field_name,
            self.bound.lower_mode().symbol(),
            self.bound.lower_bound,
            self.field_name,
            self.bound.upper_mode().symbol(),
            self.bound.upper_bound
        )
    }
}

impl FilterProvider for BetweenFilter {
    fn apply(&self, entry: &Document) -> RepositoryResult<bool> {
        let value = match get_field(entry, &self.field_name) {
            Some(value) => value,
            None => return Ok(false),
        };

        // each bound is checked on its own, as the server does for array fields
        let lower = field_compares(value, &self.bound.lower_bound, self.bound.lower_mode());
        let upper = field_compares(value, &self.bound.upper_bound, self.bound.upper_mode());
        Ok(lower && upper)
    }

    fn to_query(&self) -> RepositoryResult<Document> {
        let mut condition = Document::new();
        condition.insert(self.bound.lower_mode().operator(), self.bound.lower_bound.clone());
        condition.insert(self.bound.upper_mode().operator(), self.bound.upper_bound.clone());
        Ok(create_document(&self.field_name, Bson::Document(condition)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
