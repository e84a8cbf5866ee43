#[macro_use]
mod fmt;
use fmt::ToSql;

mod column;
use column::{Bare, Compared, Qualified};

mod condition;

mod delim;
use delim::{Comma, Delimited};

mod flavor;
pub use flavor::{DECIMAL_AVG, DECIMAL_COLLATION, DECIMAL_SUM};
use flavor::Flavor;

mod ident;
use ident::Ident;

mod params;
pub use params::{Params, Placeholder};

mod raw;

mod source;
mod statement;
mod value;

use tessera_core::{
    driver::operation::{Operation, Source},
    stmt::{Condition, Raw},
    Error, Result,
};

/// Serialize an operation to a SQL string
#[derive(Debug)]
pub struct Serializer {
    /// The database flavor handles the differences between SQL dialects.
    flavor: Flavor,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

impl Serializer {
    /// Renders `op` as one SQL statement, pushing every bound value to
    /// `params` in placeholder order.
    ///
    /// Fails before writing anything when the operation carries a condition
    /// SQL cannot express.
    pub fn serialize(&self, op: &Operation, params: &mut impl Params) -> Result<String> {
        check_operation(op)?;

        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        op.to_sql(&mut fmt);

        ret.push(';');
        Ok(ret)
    }

    pub fn serialize_transaction_start(&self) -> &'static str {
        "BEGIN"
    }

    pub fn is_sqlite(&self) -> bool {
        matches!(self.flavor, Flavor::Sqlite)
    }
}

fn check_operation(op: &Operation) -> Result<()> {
    let (source, filter) = match op {
        Operation::Find(find) => (Some(&find.source), find.filter.as_ref()),
        Operation::Count(count) => (Some(&count.source), count.filter.as_ref()),
        Operation::Aggregate(aggregate) => (Some(&aggregate.source), aggregate.filter.as_ref()),
        Operation::Update(update) if update.assignments.is_empty() => {
            return Err(Error::invalid_argument("update without assignments"))
        }
        Operation::Update(update) => (None, update.filter.as_ref()),
        Operation::Delete(delete) => (None, delete.filter.as_ref()),
        Operation::Insert(_) => (None, None),
    };

    if let Some(source) = source {
        check_source(source)?;
    }
    match filter {
        Some(filter) => check_condition(filter),
        None => Ok(()),
    }
}

fn check_source(source: &Source) -> Result<()> {
    let Source::Join(join) = source else {
        return Ok(());
    };

    check_source(&join.left)?;
    check_source(&join.right)?;
    match &join.extra {
        Some(extra) => check_condition(extra),
        None => Ok(()),
    }
}

fn check_condition(condition: &Condition) -> Result<()> {
    match condition {
        Condition::And(lhs, rhs) | Condition::Or(lhs, rhs) => {
            check_condition(lhs)?;
            check_condition(rhs)
        }
        Condition::Raw(Raw::Document(_)) => Err(Error::unsupported_feature(
            "document filters cannot be rendered as SQL",
        )),
        Condition::Raw(Raw::Sql { fragment, params }) => {
            let placeholders = raw::placeholders(fragment).len();
            if placeholders != params.len() {
                return Err(Error::invalid_argument(format!(
                    "raw SQL fragment has {placeholders} placeholders but {} parameters",
                    params.len()
                )));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
