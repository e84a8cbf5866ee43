use super::Value;

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusqlite::types::Value as SqlValue;
use std::sync::Arc;
use tessera_core::{mapper::AttributeSource, Error, Result};

/// One result row, detached from the statement that produced it.
#[derive(Debug)]
pub(crate) struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    pub(crate) fn read(columns: Arc<[String]>, row: &rusqlite::Row<'_>) -> Result<Row> {
        let values = (0..columns.len())
            .map(|index| row.get::<_, SqlValue>(index))
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::driver)?;

        Ok(Row { columns, values })
    }

    fn get(&self, key: &str) -> Option<&SqlValue> {
        let index = self.columns.iter().position(|column| column == key)?;
        match &self.values[index] {
            SqlValue::Null => None,
            value => Some(value),
        }
    }
}

fn mismatch(value: &SqlValue, ty: &'static str) -> Error {
    Error::type_conversion(Value::from_sql(value).into_inner(), ty)
}

impl AttributeSource for Row {
    fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(SqlValue::Integer(v)) => Ok(Some(*v != 0)),
            Some(value) => Err(mismatch(value, "bool")),
        }
    }

    fn get_i32(&self, key: &str) -> Result<Option<i32>> {
        match self.get(key) {
            None => Ok(None),
            Some(value @ SqlValue::Integer(v)) => i32::try_from(*v)
                .map(Some)
                .map_err(|_| mismatch(value, "i32")),
            Some(value) => Err(mismatch(value, "i32")),
        }
    }

    fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(SqlValue::Integer(v)) => Ok(Some(*v)),
            Some(value) => Err(mismatch(value, "i64")),
        }
    }

    fn get_f32(&self, key: &str) -> Result<Option<f32>> {
        Ok(self.get_f64(key)?.map(|v| v as f32))
    }

    fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        match self.get(key) {
            None => Ok(None),
            Some(SqlValue::Real(v)) => Ok(Some(*v)),
            Some(SqlValue::Integer(v)) => Ok(Some(*v as f64)),
            Some(value) => Err(mismatch(value, "f64")),
        }
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(SqlValue::Text(v)) => Ok(Some(v.clone())),
            Some(value) => Err(mismatch(value, "String")),
        }
    }

    fn get_decimal(&self, key: &str) -> Result<Option<Decimal>> {
        match self.get(key) {
            None => Ok(None),
            Some(value @ SqlValue::Text(v)) => {
                v.parse().map(Some).map_err(|_| mismatch(value, "Decimal"))
            }
            Some(SqlValue::Integer(v)) => Ok(Some(Decimal::from(*v))),
            // SUM and AVG over decimal text columns come back as reals.
            Some(value @ SqlValue::Real(v)) => Decimal::try_from(*v)
                .map(Some)
                .map_err(|_| mismatch(value, "Decimal")),
            Some(value) => Err(mismatch(value, "Decimal")),
        }
    }

    fn get_timestamp(&self, key: &str) -> Result<Option<Timestamp>> {
        match self.get(key) {
            None => Ok(None),
            Some(SqlValue::Integer(v)) => Ok(Some(Timestamp::from_millisecond(*v)?)),
            Some(value @ SqlValue::Text(v)) => {
                v.parse().map(Some).map_err(|_| mismatch(value, "Timestamp"))
            }
            Some(value) => Err(mismatch(value, "Timestamp")),
        }
    }
}
