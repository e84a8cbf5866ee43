use crate::{mapper::AttributeSource, Error, Result};

#[derive(Debug)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of records matched by the operation
    Count(u64),

    /// Raw backend records
    Records(Vec<Box<dyn AttributeSource>>),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
        }
    }

    pub fn records(records: Vec<Box<dyn AttributeSource>>) -> Self {
        Self {
            rows: Rows::Records(records),
        }
    }

    pub fn into_count(self) -> Result<u64> {
        match self.rows {
            Rows::Count(count) => Ok(count),
            Rows::Records(_) => Err(Error::from_args(format_args!(
                "invalid result: expected Count, got Records"
            ))),
        }
    }

    pub fn into_records(self) -> Result<Vec<Box<dyn AttributeSource>>> {
        match self.rows {
            Rows::Records(records) => Ok(records),
            Rows::Count(_) => Err(Error::from_args(format_args!(
                "invalid result: expected Records, got Count"
            ))),
        }
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_records(&self) -> bool {
        matches!(self, Self::Records(_))
    }

    /// Number of records, or the count itself.
    pub fn len(&self) -> u64 {
        match self {
            Rows::Count(count) => *count,
            Rows::Records(records) => records.len() as u64,
        }
    }
}
