// Submodules for separation of concerns
pub mod aggregate;
mod eval;
mod key;
mod translate;
mod types;

pub use aggregate::{Accumulator, Pipeline, Stage, SumOperand, group_key, run_pipeline};
pub use eval::{FilterMatcher, compare_bson, compare_docs, eval_filter};
pub use key::{FilterOp, ParsedKey};
pub use translate::{TranslateOptions, parse_bool, parse_number, translate};
pub use types::{
    CmpOp, Condition, DEFAULT_LIMIT, FilterSpec, ID_FIELD, MAX_LIMIT, Order, Predicate, QuerySpec,
    SetOp, SortSpec,
};
