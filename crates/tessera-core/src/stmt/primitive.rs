use super::{Type, Value};
use crate::{mapper::AttributeSource, Error, Result};

use jiff::Timestamp;
use rust_decimal::Decimal;

/// A Rust type that can be stored in a single attribute.
///
/// Each implementation binds the type to one [`Type`] tag and to the typed
/// accessor of [`AttributeSource`] that reads it back, so the read path is
/// resolved when the attribute is declared.
pub trait Primitive: Clone + Send + Sync + 'static {
    /// Value type tag of the attribute.
    const TYPE: Type;

    /// True when null is a legal value of the type.
    const NULLABLE: bool = false;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Result<Self>;

    /// Reads the value stored under `key`. `Ok(None)` means the record has
    /// no non-null value for the key.
    fn read(source: &dyn AttributeSource, key: &str) -> Result<Option<Self>>;

    fn is_null(&self) -> bool {
        false
    }

    /// Length in characters, for types that carry a length constraint.
    fn char_len(&self) -> Option<usize> {
        None
    }
}

macro_rules! impl_primitive {
    ( $( $ty:ty => $variant:ident, $read:ident; )* ) => {
        $(
            impl Primitive for $ty {
                const TYPE: Type = Type::$variant;

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(value) => Ok(value),
                        value => Err(Error::type_conversion(value, stringify!($ty))),
                    }
                }

                fn read(source: &dyn AttributeSource, key: &str) -> Result<Option<Self>> {
                    source.$read(key)
                }
            }
        )*
    };
}

impl_primitive! {
    bool => Bool, get_bool;
    i32 => I32, get_i32;
    f32 => F32, get_f32;
    Timestamp => Timestamp, get_timestamp;
}

impl Primitive for i64 {
    const TYPE: Type = Type::I64;

    fn into_value(self) -> Value {
        Value::I64(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::I64(v) => Ok(v),
            Value::I32(v) => Ok(v as i64),
            value => Err(Error::type_conversion(value, "i64")),
        }
    }

    fn read(source: &dyn AttributeSource, key: &str) -> Result<Option<Self>> {
        source.get_i64(key)
    }
}

impl Primitive for f64 {
    const TYPE: Type = Type::F64;

    fn into_value(self) -> Value {
        Value::F64(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::F64(v) => Ok(v),
            Value::F32(v) => Ok(v as f64),
            Value::I32(v) => Ok(v as f64),
            Value::I64(v) => Ok(v as f64),
            value => Err(Error::type_conversion(value, "f64")),
        }
    }

    fn read(source: &dyn AttributeSource, key: &str) -> Result<Option<Self>> {
        source.get_f64(key)
    }
}

impl Primitive for Decimal {
    const TYPE: Type = Type::Decimal;

    fn into_value(self) -> Value {
        Value::Decimal(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::I32(v) => Ok(Decimal::from(v)),
            Value::I64(v) => Ok(Decimal::from(v)),
            Value::String(ref v) => v
                .parse()
                .map_err(|_| Error::type_conversion(value.clone(), "Decimal")),
            value => Err(Error::type_conversion(value, "Decimal")),
        }
    }

    fn read(source: &dyn AttributeSource, key: &str) -> Result<Option<Self>> {
        source.get_decimal(key)
    }
}

impl Primitive for String {
    const TYPE: Type = Type::String;

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(v) => Ok(v),
            value => Err(Error::type_conversion(value, "String")),
        }
    }

    fn read(source: &dyn AttributeSource, key: &str) -> Result<Option<Self>> {
        source.get_string(key)
    }

    fn char_len(&self) -> Option<usize> {
        Some(self.chars().count())
    }
}

impl<T: Primitive> Primitive for Option<T> {
    const TYPE: Type = T::TYPE;
    const NULLABLE: bool = true;

    fn into_value(self) -> Value {
        match self {
            Some(value) => value.into_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }

    fn read(source: &dyn AttributeSource, key: &str) -> Result<Option<Self>> {
        // A null column is a legitimate `None` for an optional attribute.
        Ok(Some(T::read(source, key)?))
    }

    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn char_len(&self) -> Option<usize> {
        self.as_ref().and_then(T::char_len)
    }
}
