use bson::Bson;

use crate::errors::ForumError;
use crate::params::{QueryParams, QueryValue};

use super::key::{FilterOp, ParsedKey};
use super::types::{
    Condition, DEFAULT_LIMIT, ID_FIELD, MAX_IN_SET, MAX_LIMIT, MAX_SORT_FIELDS, Order, Predicate,
    QuerySpec, SortSpec,
};

/// Paging knobs applied while translating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslateOptions {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self { default_limit: DEFAULT_LIMIT, max_limit: MAX_LIMIT }
    }
}

/// Translates query-string parameters into a [`QuerySpec`].
///
/// Keys outside the `action_field[_operator]` grammar are ignored. Values that
/// cannot be coerced (non-numeric comparison operands, bad sort directions,
/// negative or fractional paging values) reject the whole request.
///
/// # Errors
/// Returns `ForumError::InvalidQueryValue` naming the offending key.
pub fn translate(params: &QueryParams, opts: &TranslateOptions) -> Result<QuerySpec, ForumError> {
    let mut spec = QuerySpec { limit: opts.default_limit.clamp(1, opts.max_limit.max(1)), ..QuerySpec::default() };
    let mut user_sort: Vec<SortSpec> = Vec::new();
    let mut sorted = false;

    for (key, value) in params.iter() {
        let Some(parsed) = ParsedKey::parse(key) else {
            log::debug!("ignoring query key '{key}'");
            continue;
        };
        match parsed {
            ParsedKey::Sort { field } => {
                let order = parse_direction(key, value.last())?;
                sorted = true;
                if field == ID_FIELD {
                    log::debug!("'{key}' ignored, {ID_FIELD} is always the ascending tiebreaker");
                } else if let Some(s) = user_sort.iter_mut().find(|s| s.field == field) {
                    s.order = order;
                } else {
                    user_sort.push(SortSpec { field, order });
                }
            }
            ParsedKey::Skip => spec.skip = parse_count(key, value.last())?,
            ParsedKey::Limit => {
                let n = parse_count(key, value.last())?;
                if n == 0 {
                    return Err(ForumError::invalid_value(key, value.last(), "limit must be positive"));
                }
                if n > opts.max_limit {
                    log::debug!("clamping limit {n} to {}", opts.max_limit);
                }
                spec.limit = n.min(opts.max_limit);
            }
            ParsedKey::Filter { field, operator: None } => {
                spec.filter.set(field, plain_predicate(value));
            }
            ParsedKey::Filter { field, operator: Some(FilterOp::Cmp(op)) } => {
                let raw = value.last();
                let number = parse_number(raw)
                    .ok_or_else(|| ForumError::invalid_value(key, raw, "expected a number"))?;
                spec.filter.merge_condition(field, Condition::Cmp { op, value: number });
            }
            ParsedKey::Filter { field, operator: Some(FilterOp::Set(op)) } => {
                spec.filter.merge_condition(field, Condition::Set { op, values: split_list(value) });
            }
        }
    }

    if sorted {
        if user_sort.len() > MAX_SORT_FIELDS {
            log::warn!("sort spec too long: {}", user_sort.len());
            user_sort.truncate(MAX_SORT_FIELDS);
        }
        user_sort.push(SortSpec::new(ID_FIELD, Order::Asc));
        spec.sort = user_sort;
    }
    Ok(spec)
}

/// `filter_<field>=<v>`: a `true`/`false`-prefixed value is a boolean equality, anything else a
/// case-insensitive substring match. A repeated key becomes set membership, with the
/// same boolean coercion per item.
fn plain_predicate(value: &QueryValue) -> Predicate {
    match value {
        QueryValue::Single(s) => match parse_bool(s) {
            Some(b) => Predicate::Equals(Bson::Boolean(b)),
            None => Predicate::contains(s),
        },
        QueryValue::Many(vs) => Predicate::is_in(
            vs.iter()
                .take(MAX_IN_SET)
                .map(|v| parse_bool(v).map_or_else(|| Bson::String(v.clone()), Bson::Boolean))
                .collect(),
        ),
    }
}

/// `v1_v2_v3` lists. Every raw value of a repeated key contributes; empty items are dropped.
fn split_list(value: &QueryValue) -> Vec<Bson> {
    value
        .all()
        .into_iter()
        .flat_map(|raw| raw.split('_'))
        .filter(|item| !item.is_empty())
        .take(MAX_IN_SET)
        .map(|item| Bson::String(item.to_string()))
        .collect()
}

/// A plain filter value starting with `true` or `false` (any case) is a boolean.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    let starts = |p: &str| raw.get(..p.len()).is_some_and(|h| h.eq_ignore_ascii_case(p));
    if starts("true") {
        Some(true)
    } else if starts("false") {
        Some(false)
    } else {
        None
    }
}

/// Integer literals become `Int32` (or `Int64` when they do not fit), other finite
/// decimals become `Double`.
#[must_use]
pub fn parse_number(raw: &str) -> Option<Bson> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    if let Ok(i) = t.parse::<i64>() {
        return Some(i32::try_from(i).map_or(Bson::Int64(i), Bson::Int32));
    }
    // f64 parsing accepts "inf"/"NaN"; those are not usable comparison operands.
    t.parse::<f64>().ok().filter(|f| f.is_finite()).map(Bson::Double)
}

fn parse_direction(key: &str, raw: &str) -> Result<Order, ForumError> {
    let t = raw.trim();
    match t {
        "1" | "+1" => Ok(Order::Asc),
        "-1" => Ok(Order::Desc),
        _ if t.eq_ignore_ascii_case("asc") => Ok(Order::Asc),
        _ if t.eq_ignore_ascii_case("desc") => Ok(Order::Desc),
        _ => Err(ForumError::invalid_value(key, raw, "sort direction must be 1 or -1")),
    }
}

fn parse_count(key: &str, raw: &str) -> Result<usize, ForumError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(crate::utils::num::u64_to_usize)
        .ok_or_else(|| ForumError::invalid_value(key, raw, "expected a non-negative integer"))
}
