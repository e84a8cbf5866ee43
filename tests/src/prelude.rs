//! Common imports for test files
//!
//! `use tests::prelude::*;` brings in the harness, the fixtures and the
//! assertion macros.

pub use crate::fixtures::*;
pub use crate::DbTest;
pub use crate::{assert_eq_unordered, tests};
pub use std_util::prelude::*;

pub use tessera::{
    Aggregation, Condition, Group, JoinRepository, Key, Order, Overview, Pagination, Repository,
    Value,
};
