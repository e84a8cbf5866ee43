use super::Source;
use crate::stmt::{AttributeRef, Condition};

#[derive(Debug, Clone)]
pub struct Find {
    pub source: Source,

    /// Selected attributes and the key each one is exposed under in the
    /// resulting records.
    pub columns: Vec<Column>,

    pub filter: Option<Condition>,

    pub group_by: Vec<AttributeRef>,

    pub order_by: Vec<OrderBy>,

    pub offset: Option<u64>,

    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub attribute: AttributeRef,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub attribute: AttributeRef,
    pub descending: bool,
}

impl Find {
    pub fn new(source: Source, columns: Vec<Column>) -> Find {
        Find {
            source,
            columns,
            filter: None,
            group_by: vec![],
            order_by: vec![],
            offset: None,
            limit: None,
        }
    }
}

impl From<Find> for super::Operation {
    fn from(value: Find) -> Self {
        Self::Find(value)
    }
}
