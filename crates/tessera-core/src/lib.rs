pub mod driver;
pub use driver::{Connection, Driver};

mod error;
pub use error::{Error, IntoError};

pub mod mapper;
pub use mapper::{
    Attribute, AttributeSource, Cardinality, EntityMapper, JoinEntityMapper, JoinKind, Key,
    Mapper,
};

pub mod query;
pub use query::{Aggregation, Group, Order, Overview, Pagination};

pub mod stmt;
pub use stmt::{Condition, Primitive, Value};

/// A Result type alias that uses Tessera's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
