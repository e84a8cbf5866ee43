mod aggregate;
pub use aggregate::Aggregate;

mod count;
pub use count::Count;

mod delete;
pub use delete::Delete;

mod find;
pub use find::{Column, Find, OrderBy};

mod insert;
pub use insert::Insert;

mod source;
pub use source::{Join, Source};

mod update;
pub use update::Update;

#[derive(Debug, Clone)]
pub enum Operation {
    /// Insert one record, optionally asking the backend for a generated key
    Insert(Insert),

    /// Assign values to every record matching a filter
    Update(Update),

    /// Delete every record matching a filter
    Delete(Delete),

    /// Select records from a table or a join
    Find(Find),

    /// Count records (or groups) matching a filter
    Count(Count),

    /// Compute an aggregate, optionally per group
    Aggregate(Aggregate),
}

impl Operation {
    pub fn is_find(&self) -> bool {
        matches!(self, Operation::Find(_))
    }

    pub fn is_count(&self) -> bool {
        matches!(self, Operation::Count(_))
    }

    pub fn as_find(&self) -> Option<&Find> {
        match self {
            Operation::Find(find) => Some(find),
            _ => None,
        }
    }
}
