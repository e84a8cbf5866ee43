pub mod db;
pub use db::Db;

mod join_repository;
pub use join_repository::JoinRepository;

mod repository;
pub use repository::{Grouped, Repository};

mod results;
pub use results::Results;

pub use tessera_core::{
    driver, mapper, query, stmt, Aggregation, Attribute, AttributeSource, Cardinality, Condition,
    EntityMapper, Error, Group, JoinEntityMapper, JoinKind, Key, Mapper, Order, Overview,
    Pagination, Primitive, Result, Value,
};
