//! Utility modules: JSON/BSON bridging and numeric conversions.
pub mod json;
pub mod num;
