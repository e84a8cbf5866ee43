use bson::{Bson, Document};
use jiff::Timestamp;
use rust_decimal::Decimal;
use tessera_core::{mapper::AttributeSource, stmt, Error, Result};

pub mod decimal128;

/// Converts a core value to its stored BSON form.
///
/// Decimals are stored as Decimal128, so the server compares, sorts and sums
/// them numerically. Timestamps are BSON datetimes (millisecond precision).
pub fn to_bson(value: &stmt::Value) -> Bson {
    match value {
        stmt::Value::Null => Bson::Null,
        stmt::Value::Bool(v) => Bson::Boolean(*v),
        stmt::Value::I32(v) => Bson::Int32(*v),
        stmt::Value::I64(v) => Bson::Int64(*v),
        stmt::Value::F32(v) => Bson::Double(*v as f64),
        stmt::Value::F64(v) => Bson::Double(*v),
        stmt::Value::String(v) => Bson::String(v.clone()),
        stmt::Value::Decimal(v) => Bson::Decimal128(decimal128::encode(*v)),
        stmt::Value::Timestamp(v) => Bson::DateTime(bson::DateTime::from_millis(v.as_millisecond())),
    }
}

/// Core value closest to a stored BSON value, used in conversion errors.
pub fn from_bson(bson: &Bson) -> stmt::Value {
    match bson {
        Bson::Boolean(v) => stmt::Value::Bool(*v),
        Bson::Int32(v) => stmt::Value::I32(*v),
        Bson::Int64(v) => stmt::Value::I64(*v),
        Bson::Double(v) => stmt::Value::F64(*v),
        Bson::String(v) => stmt::Value::String(v.clone()),
        Bson::Decimal128(v) => decimal128::decode(*v)
            .map(stmt::Value::Decimal)
            .unwrap_or_else(|| stmt::Value::String(format!("{v:?}"))),
        Bson::DateTime(v) => Timestamp::from_millisecond(v.timestamp_millis())
            .map(stmt::Value::Timestamp)
            .unwrap_or(stmt::Value::I64(v.timestamp_millis())),
        Bson::Null | Bson::Undefined => stmt::Value::Null,
        other => stmt::Value::String(other.to_string()),
    }
}

/// A result document whose top-level keys are column aliases.
#[derive(Debug)]
pub struct DocumentSource(pub Document);

impl DocumentSource {
    fn get(&self, key: &str) -> Option<&Bson> {
        match self.0.get(key) {
            None | Some(Bson::Null) | Some(Bson::Undefined) => None,
            Some(value) => Some(value),
        }
    }
}

fn mismatch(value: &Bson, ty: &'static str) -> Error {
    Error::type_conversion(from_bson(value), ty)
}

impl AttributeSource for DocumentSource {
    fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(Bson::Boolean(v)) => Ok(Some(*v)),
            Some(value) => Err(mismatch(value, "bool")),
        }
    }

    fn get_i32(&self, key: &str) -> Result<Option<i32>> {
        match self.get(key) {
            None => Ok(None),
            Some(Bson::Int32(v)) => Ok(Some(*v)),
            Some(value @ Bson::Int64(v)) => i32::try_from(*v)
                .map(Some)
                .map_err(|_| mismatch(value, "i32")),
            Some(value) => Err(mismatch(value, "i32")),
        }
    }

    fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(Bson::Int64(v)) => Ok(Some(*v)),
            Some(Bson::Int32(v)) => Ok(Some(*v as i64)),
            Some(value) => Err(mismatch(value, "i64")),
        }
    }

    fn get_f32(&self, key: &str) -> Result<Option<f32>> {
        Ok(self.get_f64(key)?.map(|v| v as f32))
    }

    fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        match self.get(key) {
            None => Ok(None),
            Some(Bson::Double(v)) => Ok(Some(*v)),
            Some(Bson::Int32(v)) => Ok(Some(*v as f64)),
            Some(Bson::Int64(v)) => Ok(Some(*v as f64)),
            Some(value) => Err(mismatch(value, "f64")),
        }
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Bson::String(v)) => Ok(Some(v.clone())),
            Some(value) => Err(mismatch(value, "String")),
        }
    }

    fn get_decimal(&self, key: &str) -> Result<Option<Decimal>> {
        match self.get(key) {
            None => Ok(None),
            Some(value @ Bson::Decimal128(v)) => decimal128::decode(*v)
                .map(Some)
                .ok_or_else(|| mismatch(value, "Decimal")),
            Some(value @ Bson::String(v)) => {
                v.parse().map(Some).map_err(|_| mismatch(value, "Decimal"))
            }
            Some(Bson::Int32(v)) => Ok(Some(Decimal::from(*v))),
            Some(Bson::Int64(v)) => Ok(Some(Decimal::from(*v))),
            Some(value @ Bson::Double(v)) => Decimal::try_from(*v)
                .map(Some)
                .map_err(|_| mismatch(value, "Decimal")),
            Some(value) => Err(mismatch(value, "Decimal")),
        }
    }

    fn get_timestamp(&self, key: &str) -> Result<Option<Timestamp>> {
        match self.get(key) {
            None => Ok(None),
            Some(Bson::DateTime(v)) => Ok(Some(Timestamp::from_millisecond(v.timestamp_millis())?)),
            Some(value @ Bson::String(v)) => {
                v.parse().map(Some).map_err(|_| mismatch(value, "Timestamp"))
            }
            Some(value) => Err(mismatch(value, "Timestamp")),
        }
    }
}
