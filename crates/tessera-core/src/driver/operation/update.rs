use crate::stmt::{AttributeRef, Condition, Value};

/// Responds with the number of matched records.
#[derive(Debug, Clone)]
pub struct Update {
    pub data_set: String,
    pub assignments: Vec<(AttributeRef, Value)>,
    pub filter: Option<Condition>,
}

impl From<Update> for super::Operation {
    fn from(value: Update) -> Self {
        Self::Update(value)
    }
}
