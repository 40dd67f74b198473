use bson::Bson;
use std::cmp::Ordering;

/// Compares two floats for a range query.
///
/// NaN equals NaN and is not comparable with any other number, so `$gt`/`$lt` never
/// match it while `$gte`/`$lte` against NaN do.
#[inline]
fn num_cmp_float(a: f64, b: f64) -> Option<Ordering> {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Some(Ordering::Equal),
        (false, false) => a.partial_cmp(&b),
        _ => None,
    }
}

#[inline]
fn as_integer(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(*v as i64),
        Bson::Int64(v) => Some(*v),
        _ => None,
    }
}

#[inline]
fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Compares two bson values the way the query engine orders them.
///
/// Numbers compare across `Int32`, `Int64` and `Double`. Values of unrelated types are
/// not comparable and yield `None`, so range filters never match across types. The same
/// holds for NaN against any number other than NaN.
pub fn compare_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_integer(a), as_integer(b)) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return num_cmp_float(x, y);
    }

    match (a, b) {
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::Timestamp(x), Bson::Timestamp(y)) => Some((x.time, x.increment).cmp(&(y.time, y.increment))),
        _ => None,
    }
}

/// Equality with numeric widening, so `Int32(3)` equals `Double(3.0)`.
pub fn values_equal(a: &Bson, b: &Bson) -> bool {
    if let (Some(_), Some(_)) = (as_number(a), as_number(b)) {
        return compare_values(a, b) == Some(Ordering::Equal);
    }
    match (a, b) {
        (Bson::Array(x), Bson::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(l, r)| values_equal(l, r))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;

    #[test]
    fn test_cross_numeric_comparison() {
        assert_eq!(compare_values(&Bson::Int32(3), &Bson::Double(2.5)), Some(Ordering::Greater));
        assert_eq!(compare_values(&Bson::Int64(3), &Bson::Int32(3)), Some(Ordering::Equal));
        assert_eq!(compare_values(&Bson::Double(1.0), &Bson::Int64(2)), Some(Ordering::Less));
    }

    #[test]
    fn test_unrelated_types_are_not_comparable() {
        assert_eq!(compare_values(&Bson::String("3".into()), &Bson::Int32(3)), None);
        assert_eq!(compare_values(&Bson::Boolean(true), &Bson::Null), None);
    }

    #[test]
    fn test_nan_only_compares_with_nan() {
        assert_eq!(compare_values(&Bson::Double(f64::NAN), &Bson::Double(1.0)), None);
        assert_eq!(compare_values(&Bson::Int32(1), &Bson::Double(f64::NAN)), None);
        assert_eq!(
            compare_values(&Bson::Double(f64::NAN), &Bson::Double(f64::NAN)),
            Some(Ordering::Equal)
        );
        assert!(values_equal(&Bson::Double(f64::NAN), &Bson::Double(f64::NAN)));
    }

    #[test]
    fn test_values_equal_widens_numbers() {
        assert!(values_equal(&Bson::Int32(3), &Bson::Double(3.0)));
        assert!(!values_equal(&Bson::Int32(3), &Bson::String("3".into())));
    }

    #[test]
    fn test_object_ids_compare_by_bytes() {
        let a = ObjectId::parse_str("000000000000000000000001").unwrap();
        let b = ObjectId::parse_str("000000000000000000000002").unwrap();
        assert_eq!(compare_values(&Bson::ObjectId(a), &Bson::ObjectId(b)), Some(Ordering::Less));
        assert!(values_equal(&Bson::ObjectId(a), &Bson::ObjectId(a)));
    }
}
