//! Numeric utilities: safe and centralized integer conversions.
//!
//! Guidelines
//! - Prefer fallible conversions (returning Option<T>) when a value out of range should reject the input (e.g., a `skip` value from a query string).
//! - Prefer saturating conversions when clamping is acceptable (e.g., rendering a page size into a document).

#[inline]
#[must_use]
pub fn u64_to_usize(v: u64) -> Option<usize> {
    usize::try_from(v).ok()
}

#[inline]
#[must_use]
pub fn usize_to_i64_saturating(v: usize) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Reads a count out of an aggregation result, whichever integer width the store produced.
#[must_use]
pub fn bson_to_i64(v: &bson::Bson) -> Option<i64> {
    match v {
        bson::Bson::Int32(i) => Some(i64::from(*i)),
        bson::Bson::Int64(i) => Some(*i),
        #[allow(clippy::cast_possible_truncation)]
        bson::Bson::Double(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
        _ => None,
    }
}
