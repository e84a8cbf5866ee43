use crate::stmt::Condition;

/// Responds with the number of deleted records. A missing filter deletes
/// everything in the data set.
#[derive(Debug, Clone)]
pub struct Delete {
    pub data_set: String,
    pub filter: Option<Condition>,
}

impl From<Delete> for super::Operation {
    fn from(value: Delete) -> Self {
        Self::Delete(value)
    }
}
