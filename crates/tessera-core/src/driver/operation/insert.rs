use crate::stmt::{AttributeRef, Value};

#[derive(Debug, Clone)]
pub struct Insert {
    pub data_set: String,
    pub values: Vec<(AttributeRef, Value)>,

    /// Attributes whose combined value identifies one record. Backends
    /// without a declared schema enforce their uniqueness on insert.
    pub primary_key: Vec<AttributeRef>,

    /// When set, the backend generates this attribute's value and responds
    /// with one record holding it under the attribute's bare name. The
    /// attribute is not part of `values`.
    pub generated_key: Option<AttributeRef>,
}

impl From<Insert> for super::Operation {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}
