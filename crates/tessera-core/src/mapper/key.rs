use crate::stmt::{Primitive, Value};

/// A primary key value as handed to repository lookups.
///
/// A scalar key addresses a single-attribute primary key; a composite key
/// lists one value per primary attribute, in registration order.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Scalar(Value),
    Composite(Vec<Value>),
}

impl Key {
    pub fn composite<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Key {
        Key::Composite(values.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Key::Scalar(_) => 1,
            Key::Composite(values) => values.len(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Key::Scalar(_))
    }
}

impl<T: Primitive> From<T> for Key {
    fn from(value: T) -> Self {
        Key::Scalar(value.into_value())
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Scalar(Value::from(value))
    }
}

impl<A: Primitive, B: Primitive> From<(A, B)> for Key {
    fn from((a, b): (A, B)) -> Self {
        Key::Composite(vec![a.into_value(), b.into_value()])
    }
}

impl<A: Primitive, B: Primitive, C: Primitive> From<(A, B, C)> for Key {
    fn from((a, b, c): (A, B, C)) -> Self {
        Key::Composite(vec![a.into_value(), b.into_value(), c.into_value()])
    }
}
