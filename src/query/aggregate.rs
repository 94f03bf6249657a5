//! Aggregation pipelines: the `$match` / `$group` subset the count enrichment needs.

use bson::{Bson, Document as BsonDocument, doc};
use std::collections::HashMap;

use crate::errors::ForumError;

use super::eval::{FilterMatcher, get_path};
use super::types::FilterSpec;

/// Operand of a `$sum` accumulator.
#[derive(Debug, Clone, PartialEq)]
pub enum SumOperand {
    /// `{$sum: 1}` counts documents.
    Constant(Bson),
    /// `{$sum: "$field"}` adds up a numeric field; non-numeric values are skipped.
    Field(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    Sum(SumOperand),
}

impl Accumulator {
    /// `{$sum: 1}`.
    #[must_use]
    pub fn count() -> Self {
        Self::Sum(SumOperand::Constant(Bson::Int32(1)))
    }

    fn to_bson(&self) -> Bson {
        match self {
            Self::Sum(SumOperand::Constant(v)) => Bson::Document(doc! { "$sum": v.clone() }),
            Self::Sum(SumOperand::Field(f)) => Bson::Document(doc! { "$sum": format!("${f}") }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(FilterSpec),
    Group { key: String, accumulators: Vec<(String, Accumulator)> },
}

impl Stage {
    #[must_use]
    pub fn to_document(&self) -> BsonDocument {
        match self {
            Self::Match(f) => doc! { "$match": f.to_document() },
            Self::Group { key, accumulators } => {
                let mut g = doc! { "_id": format!("${key}") };
                for (name, acc) in accumulators {
                    g.insert(name.clone(), acc.to_bson());
                }
                doc! { "$group": g }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    #[must_use]
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// `[{$match: ...}, {$group: ...}]`.
    #[must_use]
    pub fn to_documents(&self) -> Vec<BsonDocument> {
        self.stages.iter().map(Stage::to_document).collect()
    }
}

/// Hashable identity of a value, so `5` and `5.0` land in the same group.
#[must_use]
pub fn group_key(v: &Bson) -> String {
    match v {
        Bson::Int32(i) => format!("n:{i}"),
        Bson::Int64(i) => format!("n:{i}"),
        #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
        Bson::Double(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("n:{}", *f as i64),
        Bson::String(s) => format!("s:{s}"),
        other => format!("x:{other}"),
    }
}

#[derive(Debug, Clone, Copy)]
enum Total {
    Int(i64),
    Float(f64),
}

impl Total {
    #[allow(clippy::cast_precision_loss)]
    fn add(self, v: &Bson) -> Self {
        match (self, v) {
            (Self::Int(a), Bson::Int32(b)) => a.checked_add(i64::from(*b)).map_or(Self::Float(a as f64 + f64::from(*b)), Self::Int),
            (Self::Int(a), Bson::Int64(b)) => a.checked_add(*b).map_or(Self::Float(a as f64 + *b as f64), Self::Int),
            (Self::Int(a), Bson::Double(b)) => Self::Float(a as f64 + b),
            (Self::Float(a), Bson::Int32(b)) => Self::Float(a + f64::from(*b)),
            (Self::Float(a), Bson::Int64(b)) => Self::Float(a + *b as f64),
            (Self::Float(a), Bson::Double(b)) => Self::Float(a + b),
            (t, _) => t,
        }
    }

    fn into_bson(self) -> Bson {
        match self {
            Self::Int(i) => i32::try_from(i).map_or(Bson::Int64(i), Bson::Int32),
            Self::Float(f) => Bson::Double(f),
        }
    }
}

/// Runs `pipeline` over in-memory documents. Groups come out in first-seen order.
///
/// # Errors
/// Returns an error if a `$match` pattern does not compile.
pub fn run_pipeline(docs: Vec<BsonDocument>, pipeline: &Pipeline) -> Result<Vec<BsonDocument>, ForumError> {
    let mut cur = docs;
    for stage in &pipeline.stages {
        cur = match stage {
            Stage::Match(filter) => {
                let m = FilterMatcher::new(filter)?;
                cur.into_iter().filter(|d| m.matches(d)).collect()
            }
            Stage::Group { key, accumulators } => group(&cur, key, accumulators),
        };
    }
    Ok(cur)
}

fn group(docs: &[BsonDocument], key: &str, accumulators: &[(String, Accumulator)]) -> Vec<BsonDocument> {
    let mut order: Vec<(Bson, Vec<Total>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for d in docs {
        let k = get_path(d, key).cloned().unwrap_or(Bson::Null);
        let slot = *index.entry(group_key(&k)).or_insert_with(|| {
            order.push((k, vec![Total::Int(0); accumulators.len()]));
            order.len() - 1
        });
        for (total, (_, acc)) in order[slot].1.iter_mut().zip(accumulators) {
            let Accumulator::Sum(operand) = acc;
            *total = match operand {
                SumOperand::Constant(v) => total.add(v),
                SumOperand::Field(f) => get_path(d, f).map_or(*total, |v| total.add(v)),
            };
        }
    }
    order
        .into_iter()
        .map(|(k, totals)| {
            let mut out = doc! { "_id": k };
            for ((name, _), t) in accumulators.iter().zip(totals) {
                out.insert(name.clone(), t.into_bson());
            }
            out
        })
        .collect()
}
