use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use tessera_core::stmt::Value as CoreValue;

/// Binds a core value as a SQLite parameter.
///
/// Decimals are bound as their canonical string and compared through the
/// `decimal` collation. Timestamps are epoch milliseconds, booleans 0 or 1.
#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    /// Converts this SQLite driver value into the core value.
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Core value closest to a raw SQLite value, used in conversion errors.
    pub(crate) fn from_sql(value: &SqlValue) -> Self {
        Value(match value {
            SqlValue::Null => CoreValue::Null,
            SqlValue::Integer(v) => CoreValue::I64(*v),
            SqlValue::Real(v) => CoreValue::F64(*v),
            SqlValue::Text(v) => CoreValue::String(v.clone()),
            SqlValue::Blob(v) => CoreValue::String(String::from_utf8_lossy(v).into_owned()),
        })
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use CoreValue::*;

        Ok(match &self.0 {
            Bool(true) => ToSqlOutput::Owned(SqlValue::Integer(1)),
            Bool(false) => ToSqlOutput::Owned(SqlValue::Integer(0)),
            I32(v) => ToSqlOutput::Owned(SqlValue::Integer(*v as i64)),
            I64(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            F32(v) => ToSqlOutput::Owned(SqlValue::Real(*v as f64)),
            F64(v) => ToSqlOutput::Owned(SqlValue::Real(*v)),
            String(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Decimal(v) => ToSqlOutput::Owned(SqlValue::Text(v.to_string())),
            Timestamp(v) => ToSqlOutput::Owned(SqlValue::Integer(v.as_millisecond())),
            Null => ToSqlOutput::Owned(SqlValue::Null),
        })
    }
}
