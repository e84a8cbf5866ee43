use super::{Type, Value};

/// Identity of an attribute as seen by conditions, orderings and statements.
///
/// Carries the bare name, the qualifying prefix (the data set the attribute
/// belongs to once it is registered) and the attribute's value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeRef {
    pub prefix: Option<String>,
    pub name: String,
    pub ty: Type,
}

impl AttributeRef {
    pub fn new(prefix: Option<String>, name: impl Into<String>, ty: Type) -> AttributeRef {
        AttributeRef {
            prefix,
            name: name.into(),
            ty,
        }
    }

    /// `prefix.name` when the attribute is qualified, `name` otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// A backend-neutral predicate.
///
/// Conditions are plain data: building one performs no validation, and
/// translating one is the job of each backend's condition builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `attr = value`; a null value means "attribute is absent or null".
    Eq(AttributeRef, Value),
    Lt(AttributeRef, Value),
    Lte(AttributeRef, Value),
    Gt(AttributeRef, Value),
    Gte(AttributeRef, Value),

    /// Substring match; the needle is matched literally.
    Contains(AttributeRef, String),

    /// `attr` equals one of the values. An empty list never matches.
    In(AttributeRef, Vec<Value>),

    /// Two attributes hold equal values.
    EqAttributes(AttributeRef, AttributeRef),

    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),

    /// Backend-specific escape hatch.
    Raw(Raw),
}

/// A condition fragment written directly in a backend's query language.
#[derive(Debug, Clone, PartialEq)]
pub enum Raw {
    /// SQL fragment using `?` for each positional parameter.
    Sql { fragment: String, params: Vec<Value> },

    /// Document filter in (extended) JSON form.
    Document(serde_json::Value),
}

pub fn eq(attr: &AttributeRef, value: impl Into<Value>) -> Condition {
    Condition::Eq(attr.clone(), value.into())
}

pub fn lt(attr: &AttributeRef, value: impl Into<Value>) -> Condition {
    Condition::Lt(attr.clone(), value.into())
}

pub fn lte(attr: &AttributeRef, value: impl Into<Value>) -> Condition {
    Condition::Lte(attr.clone(), value.into())
}

pub fn gt(attr: &AttributeRef, value: impl Into<Value>) -> Condition {
    Condition::Gt(attr.clone(), value.into())
}

pub fn gte(attr: &AttributeRef, value: impl Into<Value>) -> Condition {
    Condition::Gte(attr.clone(), value.into())
}

pub fn contains(attr: &AttributeRef, needle: impl Into<String>) -> Condition {
    Condition::Contains(attr.clone(), needle.into())
}

pub fn is_in<V: Into<Value>>(attr: &AttributeRef, values: impl IntoIterator<Item = V>) -> Condition {
    Condition::In(attr.clone(), values.into_iter().map(Into::into).collect())
}

pub fn eq_attributes(lhs: &AttributeRef, rhs: &AttributeRef) -> Condition {
    Condition::EqAttributes(lhs.clone(), rhs.clone())
}

pub fn and(lhs: Condition, rhs: Condition) -> Condition {
    Condition::And(Box::new(lhs), Box::new(rhs))
}

pub fn or(lhs: Condition, rhs: Condition) -> Condition {
    Condition::Or(Box::new(lhs), Box::new(rhs))
}

impl Condition {
    pub fn and(self, rhs: Condition) -> Condition {
        and(self, rhs)
    }

    pub fn or(self, rhs: Condition) -> Condition {
        or(self, rhs)
    }

    pub fn raw_sql<V: Into<Value>>(
        fragment: impl Into<String>,
        params: impl IntoIterator<Item = V>,
    ) -> Condition {
        Condition::Raw(Raw::Sql {
            fragment: fragment.into(),
            params: params.into_iter().map(Into::into).collect(),
        })
    }

    pub fn raw_document(filter: serde_json::Value) -> Condition {
        Condition::Raw(Raw::Document(filter))
    }

    /// Left-folds the conditions with `And`. Returns `None` for an empty
    /// sequence, which callers treat as "no filter".
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Option<Condition> {
        conditions.into_iter().reduce(and)
    }

    /// Left-folds the conditions with `Or`.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Option<Condition> {
        conditions.into_iter().reduce(or)
    }

    /// Calls `f` with every attribute the condition references, left to right.
    pub fn for_each_attribute(&self, f: &mut impl FnMut(&AttributeRef)) {
        match self {
            Condition::Eq(attr, _)
            | Condition::Lt(attr, _)
            | Condition::Lte(attr, _)
            | Condition::Gt(attr, _)
            | Condition::Gte(attr, _)
            | Condition::Contains(attr, _)
            | Condition::In(attr, _) => f(attr),
            Condition::EqAttributes(lhs, rhs) => {
                f(lhs);
                f(rhs);
            }
            Condition::And(lhs, rhs) | Condition::Or(lhs, rhs) => {
                lhs.for_each_attribute(f);
                rhs.for_each_attribute(f);
            }
            Condition::Raw(_) => {}
        }
    }
}
