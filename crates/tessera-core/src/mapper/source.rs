use crate::{
    stmt::{Type, Value},
    Result,
};

use jiff::Timestamp;
use rust_decimal::Decimal;

use std::fmt::Debug;

/// A record read back from a backend, addressed by alias.
///
/// Each accessor returns `Ok(None)` when the key is missing or holds null,
/// and fails with a type conversion error when the stored value cannot be
/// read as the requested type. Backends implement this directly over their
/// native row or document types.
pub trait AttributeSource: Debug {
    fn get_bool(&self, key: &str) -> Result<Option<bool>>;

    fn get_i32(&self, key: &str) -> Result<Option<i32>>;

    fn get_i64(&self, key: &str) -> Result<Option<i64>>;

    fn get_f32(&self, key: &str) -> Result<Option<f32>>;

    fn get_f64(&self, key: &str) -> Result<Option<f64>>;

    fn get_string(&self, key: &str) -> Result<Option<String>>;

    fn get_decimal(&self, key: &str) -> Result<Option<Decimal>>;

    fn get_timestamp(&self, key: &str) -> Result<Option<Timestamp>>;
}

/// Reads the value stored under `key` with the accessor for `ty`. Missing
/// keys read as [`Value::Null`].
pub fn read_value(source: &dyn AttributeSource, key: &str, ty: Type) -> Result<Value> {
    Ok(match ty {
        Type::Bool => source.get_bool(key)?.map(Value::Bool),
        Type::I32 => source.get_i32(key)?.map(Value::I32),
        Type::I64 => source.get_i64(key)?.map(Value::I64),
        Type::F32 => source.get_f32(key)?.map(Value::F32),
        Type::F64 => source.get_f64(key)?.map(Value::F64),
        Type::String => source.get_string(key)?.map(Value::String),
        Type::Decimal => source.get_decimal(key)?.map(Value::Decimal),
        Type::Timestamp => source.get_timestamp(key)?.map(Value::Timestamp),
    }
    .unwrap_or(Value::Null))
}
