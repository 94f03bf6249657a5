use bson::{Bson, Document as BsonDocument};
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;

use crate::errors::ForumError;

use super::types::{
    CmpOp, Condition, FilterSpec, MAX_IN_SET, MAX_PATH_DEPTH, MAX_SORT_FIELDS, Order, Predicate,
    SetOp, SortSpec,
};

enum Compiled<'a> {
    Equals(&'a Bson),
    Compound(Vec<CompiledCondition<'a>>),
}

enum CompiledCondition<'a> {
    Regex(Regex),
    Plain(&'a Condition),
}

fn build_regex(path: &str, pattern: &str, case_insensitive: bool) -> Result<Regex, ForumError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| ForumError::Validation(format!("bad pattern for '{path}': {e}")))
}

/// A [`FilterSpec`] with its patterns compiled once, for evaluating many documents.
pub struct FilterMatcher<'a> {
    fields: Vec<(&'a str, Compiled<'a>)>,
}

impl<'a> FilterMatcher<'a> {
    /// # Errors
    /// Returns `ForumError::Validation` if a pattern does not compile.
    pub fn new(filter: &'a FilterSpec) -> Result<Self, ForumError> {
        let mut fields = Vec::with_capacity(filter.len());
        for (path, pred) in filter.iter() {
            let compiled = match pred {
                Predicate::Equals(v) => Compiled::Equals(v),
                Predicate::Compound(conds) => Compiled::Compound(
                    conds
                        .iter()
                        .map(|c| match c {
                            Condition::Regex { pattern, case_insensitive } => {
                                build_regex(path, pattern, *case_insensitive).map(CompiledCondition::Regex)
                            }
                            other => Ok(CompiledCondition::Plain(other)),
                        })
                        .collect::<Result<_, _>>()?,
                ),
            };
            fields.push((path, compiled));
        }
        Ok(Self { fields })
    }

    #[must_use]
    pub fn matches(&self, doc: &BsonDocument) -> bool {
        self.fields.iter().all(|(path, c)| {
            let v = get_path(doc, path);
            match c {
                Compiled::Equals(want) => v.is_some_and(|v| equals(v, want)),
                Compiled::Compound(conds) => conds.iter().all(|c| match c {
                    CompiledCondition::Regex(re) => v.is_some_and(|v| any_value(v, |x| regex_match(re, x))),
                    CompiledCondition::Plain(cond) => eval_condition(v, cond),
                }),
            }
        })
    }
}

/// Evaluates `filter` against a single document.
///
/// # Errors
/// Returns an error if a pattern in the filter does not compile.
pub fn eval_filter(doc: &BsonDocument, filter: &FilterSpec) -> Result<bool, ForumError> {
    Ok(FilterMatcher::new(filter)?.matches(doc))
}

/// Array fields match when the array itself or any element matches.
fn any_value(v: &Bson, pred: impl Fn(&Bson) -> bool) -> bool {
    if pred(v) {
        return true;
    }
    match v {
        Bson::Array(items) => items.iter().any(pred),
        _ => false,
    }
}

fn equals(v: &Bson, want: &Bson) -> bool {
    any_value(v, |x| compare_bson(x, want) == Ordering::Equal && same_kind(x, want))
}

fn regex_match(re: &Regex, v: &Bson) -> bool {
    matches!(v, Bson::String(s) if re.is_match(s))
}

fn is_in_set(v: &Bson, set: &[Bson]) -> bool {
    set.iter().take(MAX_IN_SET).any(|x| equals(v, x))
}

fn eval_condition(v: Option<&Bson>, cond: &Condition) -> bool {
    match cond {
        Condition::Cmp { op: CmpOp::Ne, value } => !v.is_some_and(|v| equals(v, value)),
        Condition::Cmp { op: CmpOp::Eq, value } => v.is_some_and(|v| equals(v, value)),
        Condition::Cmp { op, value } => {
            let accept: fn(Ordering) -> bool = match op {
                CmpOp::Gt => |c| c == Ordering::Greater,
                CmpOp::Gte => |c| c != Ordering::Less,
                CmpOp::Lt => |c| c == Ordering::Less,
                CmpOp::Lte | CmpOp::Eq | CmpOp::Ne => |c| c != Ordering::Greater,
            };
            v.is_some_and(|v| any_value(v, |x| same_kind(x, value) && accept(compare_bson(x, value))))
        }
        Condition::Set { op: SetOp::In, values } => v.is_some_and(|v| is_in_set(v, values)),
        Condition::Set { op: SetOp::Nin, values } => !v.is_some_and(|v| is_in_set(v, values)),
        Condition::Set { op: SetOp::All, values } => {
            !values.is_empty() && v.is_some_and(|v| values.iter().all(|want| equals(v, want)))
        }
        // normally precompiled by FilterMatcher::new
        Condition::Regex { pattern, case_insensitive } => build_regex("", pattern, *case_insensitive)
            .is_ok_and(|re| v.is_some_and(|v| any_value(v, |x| regex_match(&re, x)))),
    }
}

/// Range operators only compare values of the same kind (numbers with numbers,
/// strings with strings), like a document database does.
fn same_kind(a: &Bson, b: &Bson) -> bool {
    (is_num(a) && is_num(b)) || std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn is_num(x: &Bson) -> bool {
    matches!(x, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_))
}

#[allow(clippy::cast_precision_loss)]
fn as_f64_num(x: &Bson) -> f64 {
    match x {
        Bson::Int32(i) => f64::from(*i),
        Bson::Int64(i) => *i as f64,
        Bson::Double(f) => *f,
        _ => f64::NAN,
    }
}

pub(crate) fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.len() > 1024 {
        return None;
    }
    let mut cur = doc;
    let mut parts = path.split('.').take(MAX_PATH_DEPTH).peekable();
    while let Some(part) = parts.next() {
        let v = cur.get(part)?;
        if parts.peek().is_none() {
            return Some(v);
        }
        match v {
            Bson::Document(d) => cur = d,
            _ => return None,
        }
    }
    None
}

pub fn compare_docs(a: &BsonDocument, b: &BsonDocument, sort: &[SortSpec]) -> Ordering {
    for s in sort.iter().take(MAX_SORT_FIELDS + 1) {
        let ord = match (get_path(a, &s.field), get_path(b, &s.field)) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if s.order == Order::Asc { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    if is_num(a) && is_num(b) {
        return as_f64_num(a).total_cmp(&as_f64_num(b));
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
        (Bson::Null, Bson::Null) => Ordering::Equal,
        (Bson::Array(x), Bson::Array(y)) => {
            for (l, r) in x.iter().zip(y) {
                let c = compare_bson(l, r);
                if c != Ordering::Equal {
                    return c;
                }
            }
            x.len().cmp(&y.len())
        }
        (Bson::Document(x), Bson::Document(y)) => x.to_string().cmp(&y.to_string()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Bson) -> u8 {
    use bson::Bson as T;
    match v {
        T::MinKey => 0,
        T::Null | T::Undefined => 1,
        T::Int32(_) | T::Int64(_) | T::Double(_) | T::Decimal128(_) => 2,
        T::String(_) | T::Symbol(_) => 3,
        T::Document(_) => 4,
        T::Array(_) => 5,
        T::Binary(_) => 6,
        T::ObjectId(_) => 7,
        T::Boolean(_) => 8,
        T::DateTime(_) => 9,
        T::Timestamp(_) => 10,
        T::RegularExpression(_) => 11,
        T::DbPointer(_) => 12,
        T::JavaScriptCode(_) | T::JavaScriptCodeWithScope(_) => 13,
        T::MaxKey => 255,
    }
}
