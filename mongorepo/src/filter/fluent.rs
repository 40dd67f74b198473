use bson::Bson;

use super::{
    BetweenFilter, Bound, ComparisonFilter, ComparisonMode, EqualsFilter, Filter, InFilter,
    NotEqualsFilter, NotInFilter, RegexFilter,
};

/// Creates a fluent filter builder for the specified field name.
///
/// Nested fields use dot notation (`"address.city"`); array elements can be addressed
/// by index (`"orders.0.quantity"`).
///
/// # Examples
///
/// ```rust,ignore
/// use mongorepo::filter::field;
///
/// let cheap = field("price").lt(3);
/// let clients = field("name").starts_with("Client");
/// let either = cheap.or(clients);
/// ```
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder for constructing filters on a specific field.
///
/// Each method returns a `Filter` that can be passed to a repository directly or
/// combined with other filters.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Matches documents where the field equals the value.
    #[inline]
    pub fn eq<T: Into<Bson>>(self, value: T) -> Filter {
        Filter::new(EqualsFilter::new(self.field_name, value.into()))
    }

    /// Matches documents where the field does not equal the value, including documents
    /// without the field.
    #[inline]
    pub fn ne<T: Into<Bson>>(self, value: T) -> Filter {
        Filter::new(NotEqualsFilter::new(self.field_name, value.into()))
    }

    #[inline]
    pub fn gt<T: Into<Bson>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::Greater,
        ))
    }

    #[inline]
    pub fn gte<T: Into<Bson>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::GreaterEqual,
        ))
    }

    #[inline]
    pub fn lt<T: Into<Bson>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::Lesser,
        ))
    }

    #[inline]
    pub fn lte<T: Into<Bson>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::LesserEqual,
        ))
    }

    /// Matches documents where the field lies between both bounds, inclusive.
    pub fn between<T: Into<Bson>>(self, lower_bound: T, upper_bound: T) -> Filter {
        Filter::new(BetweenFilter::new(
            self.field_name,
            Bound::inclusive(lower_bound.into(), upper_bound.into()),
        ))
    }

    /// Matches documents where the field lies between the bounds, with separate control
    /// over whether each bound is included.
    pub fn between_bounds<T: Into<Bson>>(
        self,
        lower_bound: T,
        upper_bound: T,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Filter {
        Filter::new(BetweenFilter::new(
            self.field_name,
            Bound::new(
                lower_bound.into(),
                upper_bound.into(),
                lower_inclusive,
                upper_inclusive,
            ),
        ))
    }

    /// Matches documents where the field equals any of the values.
    pub fn is_in<T: Into<Bson>>(self, values: Vec<T>) -> Filter {
        Filter::new(InFilter::new(
            self.field_name,
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// Matches documents where the field equals none of the values.
    pub fn not_in<T: Into<Bson>>(self, values: Vec<T>) -> Filter {
        Filter::new(NotInFilter::new(
            self.field_name,
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// Matches string fields against a regular expression.
    pub fn regex(self, pattern: &str) -> Filter {
        Filter::new(RegexFilter::new(self.field_name, pattern.to_string()))
    }

    /// Matches string fields beginning with the literal prefix.
    pub fn starts_with(self, prefix: &str) -> Filter {
        let pattern = format!("^{}", regex::escape(prefix));
        Filter::new(RegexFilter::new(self.field_name, pattern))
    }

    /// Matches string fields ending with the literal suffix.
    pub fn ends_with(self, suffix: &str) -> Filter {
        let pattern = format!("{}$", regex::escape(suffix));
        Filter::new(RegexFilter::new(self.field_name, pattern))
    }
}
