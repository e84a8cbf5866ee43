use super::Source;
use crate::{
    query::Aggregation,
    stmt::{AttributeRef, Condition},
};

/// Computes one aggregate, per group when `group_by` is set.
///
/// Each resulting record exposes the aggregate under [`Aggregate::VALUE`]
/// and the `i`-th group value under [`Aggregate::group_key`]`(i)`.
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub source: Source,
    pub function: Aggregation,

    /// `None` aggregates whole records (`COUNT(*)`).
    pub attribute: Option<AttributeRef>,

    pub filter: Option<Condition>,
    pub group_by: Vec<AttributeRef>,
}

impl Aggregate {
    pub const VALUE: &'static str = "value";

    pub fn group_key(index: usize) -> String {
        format!("group_{index}")
    }
}

impl From<Aggregate> for super::Operation {
    fn from(value: Aggregate) -> Self {
        Self::Aggregate(value)
    }
}
