use bson::{Bson, Document as BsonDocument, doc};
use serde::{Deserialize, Serialize};

// Safety limits to prevent resource abuse
pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 10_000;
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_IN_SET: usize = 1000;
pub(crate) const MAX_SORT_FIELDS: usize = 8;

/// Primary key field; also the pagination tiebreaker.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// `1` / `-1` as used in sort documents.
    #[must_use]
    pub const fn direction(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, order: Order) -> Self {
        Self { field: field.into(), order }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    #[must_use]
    pub const fn operator(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetOp {
    In,
    Nin,
    All,
}

impl SetOp {
    #[must_use]
    pub const fn operator(self) -> &'static str {
        match self {
            Self::In => "$in",
            Self::Nin => "$nin",
            Self::All => "$all",
        }
    }
}

/// One operator entry inside a compound predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Cmp { op: CmpOp, value: Bson },
    Set { op: SetOp, values: Vec<Bson> },
    /// `$regex` over a string field, with `$options: "i"` when case-insensitive.
    Regex { pattern: String, case_insensitive: bool },
}

impl Condition {
    #[must_use]
    pub fn operator(&self) -> &'static str {
        match self {
            Self::Cmp { op, .. } => op.operator(),
            Self::Set { op, .. } => op.operator(),
            Self::Regex { .. } => "$regex",
        }
    }

    fn write_into(&self, d: &mut BsonDocument) {
        match self {
            Self::Cmp { value, .. } => {
                d.insert(self.operator(), value.clone());
            }
            Self::Set { values, .. } => {
                d.insert(self.operator(), Bson::Array(values.clone()));
            }
            Self::Regex { pattern, case_insensitive } => {
                d.insert(self.operator(), pattern.clone());
                if *case_insensitive {
                    d.insert("$options", "i");
                }
            }
        }
    }
}

/// A field-level condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Plain equality, e.g. `{isAnswered: true}`.
    Equals(Bson),
    /// Operator object, e.g. `{$gte: 5, $lte: 10}` or `{$regex: "rust", $options: "i"}`.
    /// Operators are unique and keep insertion order.
    Compound(Vec<Condition>),
}

impl Predicate {
    /// Case-insensitive substring match of `needle` taken literally.
    #[must_use]
    pub fn contains(needle: &str) -> Self {
        Self::Compound(vec![Condition::Regex { pattern: regex::escape(needle), case_insensitive: true }])
    }

    #[must_use]
    pub fn is_in(values: Vec<Bson>) -> Self {
        Self::Compound(vec![Condition::Set { op: SetOp::In, values }])
    }

    #[must_use]
    pub fn to_bson(&self) -> Bson {
        match self {
            Self::Equals(v) => v.clone(),
            Self::Compound(conds) => {
                let mut d = BsonDocument::new();
                for c in conds {
                    c.write_into(&mut d);
                }
                Bson::Document(d)
            }
        }
    }
}

/// Conjunction of field predicates, one predicate per field, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    fields: Vec<(String, Predicate)>,
}

impl FilterSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSpec::set`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, predicate: Predicate) -> Self {
        self.set(field, predicate);
        self
    }

    /// `{field: value}`.
    pub fn field_eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new().with(field, Predicate::Equals(value.into()))
    }

    /// Replaces the predicate for `field`, keeping its position if present.
    pub fn set(&mut self, field: impl Into<String>, predicate: Predicate) {
        let field = field.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, p)) => *p = predicate,
            None => self.fields.push((field, predicate)),
        }
    }

    /// Adds an operator to the field's operator object, next to any substring or
    /// range operators already there. The same operator given twice keeps the later
    /// value; a bare equality value on the field is replaced.
    pub fn merge_condition(&mut self, field: impl Into<String>, cond: Condition) {
        let field = field.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, Predicate::Compound(conds))) => {
                match conds.iter_mut().find(|c| c.operator() == cond.operator()) {
                    Some(existing) => *existing = cond,
                    None => conds.push(cond),
                }
            }
            Some((_, p)) => *p = Predicate::Compound(vec![cond]),
            None => self.fields.push((field, Predicate::Compound(vec![cond]))),
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Predicate> {
        self.fields.iter().find(|(f, _)| f == field).map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Predicate)> {
        self.fields.iter().map(|(f, p)| (f.as_str(), p))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn to_document(&self) -> BsonDocument {
        let mut d = BsonDocument::new();
        for (f, p) in &self.fields {
            d.insert(f.clone(), p.to_bson());
        }
        d
    }
}

/// The structured form of a listing request: what to match, how to order, which page.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub filter: FilterSpec,
    pub sort: Vec<SortSpec>,
    pub skip: usize,
    pub limit: usize,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self { filter: FilterSpec::new(), sort: Vec::new(), skip: 0, limit: DEFAULT_LIMIT }
    }
}

impl QuerySpec {
    #[must_use]
    pub fn filter_document(&self) -> BsonDocument {
        self.filter.to_document()
    }

    #[must_use]
    pub fn sort_document(&self) -> BsonDocument {
        let mut d = BsonDocument::new();
        for s in &self.sort {
            d.insert(s.field.clone(), s.order.direction());
        }
        d
    }

    /// `{filter, sort, skip, limit}` in document form.
    #[must_use]
    pub fn to_document(&self) -> BsonDocument {
        doc! {
            "filter": self.filter_document(),
            "sort": self.sort_document(),
            "skip": crate::utils::num::usize_to_i64_saturating(self.skip),
            "limit": crate::utils::num::usize_to_i64_saturating(self.limit),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        Bson::Document(self.to_document()).into_relaxed_extjson()
    }
}
