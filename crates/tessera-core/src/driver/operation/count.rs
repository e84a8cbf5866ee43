use super::Source;
use crate::stmt::{AttributeRef, Condition};

/// Counts matching records, or matching groups when `group_by` is set.
#[derive(Debug, Clone)]
pub struct Count {
    pub source: Source,
    pub filter: Option<Condition>,
    pub group_by: Vec<AttributeRef>,
}

impl From<Count> for super::Operation {
    fn from(value: Count) -> Self {
        Self::Count(value)
    }
}
