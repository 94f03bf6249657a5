//! Query-string key grammar: `action_field[_operator]`.

use super::types::{CmpOp, SetOp};

/// Operator suffix of a `filter_<field>_<op>` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Cmp(CmpOp),
    Set(SetOp),
}

impl FilterOp {
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "eq" => Self::Cmp(CmpOp::Eq),
            "ne" => Self::Cmp(CmpOp::Ne),
            "gt" => Self::Cmp(CmpOp::Gt),
            "gte" => Self::Cmp(CmpOp::Gte),
            "lt" => Self::Cmp(CmpOp::Lt),
            "lte" => Self::Cmp(CmpOp::Lte),
            "in" => Self::Set(SetOp::In),
            "nin" => Self::Set(SetOp::Nin),
            "all" => Self::Set(SetOp::All),
            _ => return None,
        })
    }
}

/// A validated query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedKey {
    Sort { field: String },
    Skip,
    Limit,
    Filter { field: String, operator: Option<FilterOp> },
}

impl ParsedKey {
    /// Parses a raw key. Returns `None` for anything outside the grammar: unknown
    /// actions, missing field names, unknown operators.
    ///
    /// A field may start with underscores (`sort__id`), so the field segment is the
    /// leading underscores plus everything up to the next `_`.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        let (action, rest) = match key.split_once('_') {
            Some((a, r)) => (a, r),
            None => (key, ""),
        };
        match action {
            "skip" => Some(Self::Skip),
            "limit" => Some(Self::Limit),
            "sort" => {
                let (field, _) = split_field(rest)?;
                Some(Self::Sort { field: field.to_string() })
            }
            "filter" => {
                let (field, op) = split_field(rest)?;
                let operator = match op {
                    Some(tok) => Some(FilterOp::from_token(tok)?),
                    None => None,
                };
                Some(Self::Filter { field: field.to_string(), operator })
            }
            _ => None,
        }
    }
}

fn split_field(rest: &str) -> Option<(&str, Option<&str>)> {
    let lead = rest.len() - rest.trim_start_matches('_').len();
    let (field, op) = match rest[lead..].find('_') {
        Some(i) => (&rest[..lead + i], Some(&rest[lead + i + 1..])),
        None => (rest, None),
    };
    if field.trim_start_matches('_').is_empty() {
        return None;
    }
    Some((field, op))
}
