//! Numeric semantics for decimals stored as canonical text.

use rusqlite::{
    functions::{Aggregate, Context, FunctionFlags},
    types::{Type, ValueRef},
    Connection, Error,
};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use tessera_sql::{DECIMAL_AVG, DECIMAL_COLLATION, DECIMAL_SUM};

/// Registers the collation and aggregates the serializer emits for decimal
/// attributes.
pub(crate) fn register(connection: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    connection.create_collation(DECIMAL_COLLATION, compare)?;
    connection.create_aggregate_function(DECIMAL_SUM, 1, flags, Sum)?;
    connection.create_aggregate_function(DECIMAL_AVG, 1, flags, Avg)?;
    Ok(())
}

/// Text that does not parse as a decimal sorts after every number.
fn compare(lhs: &str, rhs: &str) -> Ordering {
    match (lhs.parse::<Decimal>(), rhs.parse::<Decimal>()) {
        (Ok(lhs), Ok(rhs)) => lhs.cmp(&rhs),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => lhs.cmp(rhs),
    }
}

fn user_error(err: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::UserFunctionError(Box::new(err))
}

fn overflow() -> Error {
    Error::UserFunctionError("decimal overflow".into())
}

/// The single argument, `None` for SQL NULL.
fn argument(ctx: &Context<'_>) -> rusqlite::Result<Option<Decimal>> {
    match ctx.get_raw(0) {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(v) => Ok(Some(Decimal::from(v))),
        ValueRef::Real(v) => Decimal::try_from(v).map(Some).map_err(user_error),
        ValueRef::Text(text) => std::str::from_utf8(text)
            .map_err(user_error)?
            .parse()
            .map(Some)
            .map_err(user_error),
        ValueRef::Blob(_) => Err(Error::InvalidFunctionParameterType(0, Type::Blob)),
    }
}

/// Running total and number of non-null inputs.
type Accumulator = (Decimal, u64);

fn step(ctx: &mut Context<'_>, (sum, count): &mut Accumulator) -> rusqlite::Result<()> {
    if let Some(value) = argument(ctx)? {
        *sum = sum.checked_add(value).ok_or_else(overflow)?;
        *count += 1;
    }
    Ok(())
}

/// Like `SUM`, NULL when every input is NULL.
struct Sum;

impl Aggregate<Accumulator, Option<String>> for Sum {
    fn init(&self, _: &mut Context<'_>) -> rusqlite::Result<Accumulator> {
        Ok((Decimal::ZERO, 0))
    }

    fn step(&self, ctx: &mut Context<'_>, acc: &mut Accumulator) -> rusqlite::Result<()> {
        step(ctx, acc)
    }

    fn finalize(
        &self,
        _: &mut Context<'_>,
        acc: Option<Accumulator>,
    ) -> rusqlite::Result<Option<String>> {
        Ok(acc
            .filter(|(_, count)| *count > 0)
            .map(|(sum, _)| sum.to_string()))
    }
}

struct Avg;

impl Aggregate<Accumulator, Option<String>> for Avg {
    fn init(&self, _: &mut Context<'_>) -> rusqlite::Result<Accumulator> {
        Ok((Decimal::ZERO, 0))
    }

    fn step(&self, ctx: &mut Context<'_>, acc: &mut Accumulator) -> rusqlite::Result<()> {
        step(ctx, acc)
    }

    fn finalize(
        &self,
        _: &mut Context<'_>,
        acc: Option<Accumulator>,
    ) -> rusqlite::Result<Option<String>> {
        let Some((sum, count)) = acc.filter(|(_, count)| *count > 0) else {
            return Ok(None);
        };
        let avg = sum.checked_div(Decimal::from(count)).ok_or_else(overflow)?;
        Ok(Some(avg.to_string()))
    }
}
