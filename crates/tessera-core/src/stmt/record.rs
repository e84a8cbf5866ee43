use super::Value;
use crate::{mapper::AttributeSource, Error, Result};

use indexmap::IndexMap;
use jiff::Timestamp;
use rust_decimal::Decimal;

/// An owned record of named values.
///
/// `Record` is the backend-neutral [`AttributeSource`]: it is what
/// [`EntityMapper::record`](crate::EntityMapper::record) produces from an
/// entity and what tests feed back into `build_entity`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Record {
        Record::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    fn non_null(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl AttributeSource for Record {
    fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.non_null(key) {
            None => Ok(None),
            Some(Value::Bool(v)) => Ok(Some(*v)),
            Some(value) => Err(Error::type_conversion(value.clone(), "bool")),
        }
    }

    fn get_i32(&self, key: &str) -> Result<Option<i32>> {
        match self.non_null(key) {
            None => Ok(None),
            Some(Value::I32(v)) => Ok(Some(*v)),
            Some(value @ Value::I64(v)) => i32::try_from(*v)
                .map(Some)
                .map_err(|_| Error::type_conversion(value.clone(), "i32")),
            Some(value) => Err(Error::type_conversion(value.clone(), "i32")),
        }
    }

    fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        match self.non_null(key) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| Error::type_conversion(value.clone(), "i64")),
        }
    }

    fn get_f32(&self, key: &str) -> Result<Option<f32>> {
        match self.non_null(key) {
            None => Ok(None),
            Some(Value::F32(v)) => Ok(Some(*v)),
            Some(Value::F64(v)) => Ok(Some(*v as f32)),
            Some(value) => Err(Error::type_conversion(value.clone(), "f32")),
        }
    }

    fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        match self.non_null(key) {
            None => Ok(None),
            Some(value @ Value::Decimal(_)) => {
                Err(Error::type_conversion(value.clone(), "f64"))
            }
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| Error::type_conversion(value.clone(), "f64")),
        }
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.non_null(key) {
            None => Ok(None),
            Some(Value::String(v)) => Ok(Some(v.clone())),
            Some(value) => Err(Error::type_conversion(value.clone(), "String")),
        }
    }

    fn get_decimal(&self, key: &str) -> Result<Option<Decimal>> {
        match self.non_null(key) {
            None => Ok(None),
            Some(Value::Decimal(v)) => Ok(Some(*v)),
            Some(Value::I32(v)) => Ok(Some(Decimal::from(*v))),
            Some(Value::I64(v)) => Ok(Some(Decimal::from(*v))),
            Some(value @ Value::F64(v)) => Decimal::try_from(*v)
                .map(Some)
                .map_err(|_| Error::type_conversion(value.clone(), "Decimal")),
            Some(value) => Err(Error::type_conversion(value.clone(), "Decimal")),
        }
    }

    fn get_timestamp(&self, key: &str) -> Result<Option<Timestamp>> {
        match self.non_null(key) {
            None => Ok(None),
            Some(Value::Timestamp(v)) => Ok(Some(*v)),
            Some(value) => Err(Error::type_conversion(value.clone(), "Timestamp")),
        }
    }
}
