use super::AttributeSource;
use crate::{
    stmt::{self, AttributeRef, Condition, Primitive, Type, Value},
    Error, Result,
};

use std::{fmt, sync::Arc};

type Getter<E, V> = Arc<dyn Fn(&E) -> V + Send + Sync>;
type Setter<E, V> = Arc<dyn Fn(&mut E, V) + Send + Sync>;

/// One named, typed field of an entity.
///
/// An attribute pairs a name with a pure extraction function and a setter.
/// Its identity is the bare name: two attributes of the same entity type
/// compare equal when their names match, whatever their prefixes.
pub struct Attribute<E, V> {
    prefix: Option<String>,
    name: String,
    primary: bool,
    max_length: Option<usize>,
    get: Getter<E, V>,
    set: Setter<E, V>,
}

impl<E, V> Attribute<E, V> {
    pub fn new(
        name: impl Into<String>,
        get: impl Fn(&E) -> V + Send + Sync + 'static,
        set: impl Fn(&mut E, V) + Send + Sync + 'static,
    ) -> Attribute<E, V> {
        Attribute {
            prefix: None,
            name: name.into(),
            primary: false,
            max_length: None,
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    /// Marks the attribute as (part of) the primary key.
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Copy of the attribute qualified by `prefix`.
    pub fn with_name_prefix(&self, prefix: impl Into<String>) -> Self {
        Attribute {
            prefix: Some(prefix.into()),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}.{}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn max_len(&self) -> Option<usize> {
        self.max_length
    }

    /// Extracts the attribute's value from `entity`.
    pub fn value(&self, entity: &E) -> V {
        (self.get)(entity)
    }

    /// Writes `value` into `entity`.
    pub fn set(&self, entity: &mut E, value: V) {
        (self.set)(entity, value)
    }

    /// Exposes the attribute as another value type.
    ///
    /// `to_new` is applied after extraction and `to_old` before assignment;
    /// name, prefix, key and length metadata carry over.
    pub fn cast<W>(
        self,
        to_new: impl Fn(V) -> W + Send + Sync + 'static,
        to_old: impl Fn(W) -> V + Send + Sync + 'static,
    ) -> Attribute<E, W>
    where
        E: 'static,
        V: 'static,
    {
        let get = self.get;
        let set = self.set;

        Attribute {
            prefix: self.prefix,
            name: self.name,
            primary: self.primary,
            max_length: self.max_length,
            get: Arc::new(move |entity| to_new(get(entity))),
            set: Arc::new(move |entity, value| set(entity, to_old(value))),
        }
    }
}

impl<E, V: Primitive> Attribute<E, V> {
    pub fn ty(&self) -> Type {
        V::TYPE
    }

    pub fn attribute_ref(&self) -> AttributeRef {
        AttributeRef::new(self.prefix.clone(), self.name.clone(), V::TYPE)
    }

    /// Returns `entity` with this attribute read from `source` under `key`.
    /// A null or missing value leaves a non-optional field untouched.
    pub fn entity_with(&self, mut entity: E, source: &dyn AttributeSource, key: &str) -> Result<E> {
        if let Some(value) = V::read(source, key)? {
            (self.set)(&mut entity, value);
        }
        Ok(entity)
    }

    pub fn eq(&self, value: V) -> Condition {
        stmt::eq(&self.attribute_ref(), value.into_value())
    }

    /// Matches records where the attribute is absent or null.
    pub fn is_null(&self) -> Condition {
        Condition::Eq(self.attribute_ref(), Value::Null)
    }

    pub fn lt(&self, value: V) -> Condition {
        stmt::lt(&self.attribute_ref(), value.into_value())
    }

    pub fn lte(&self, value: V) -> Condition {
        stmt::lte(&self.attribute_ref(), value.into_value())
    }

    pub fn gt(&self, value: V) -> Condition {
        stmt::gt(&self.attribute_ref(), value.into_value())
    }

    pub fn gte(&self, value: V) -> Condition {
        stmt::gte(&self.attribute_ref(), value.into_value())
    }

    pub fn is_in(&self, values: impl IntoIterator<Item = V>) -> Condition {
        stmt::is_in(
            &self.attribute_ref(),
            values.into_iter().map(Primitive::into_value),
        )
    }

    /// Equality between two attributes of the same value type.
    pub fn eq_attribute<E2>(&self, other: &Attribute<E2, V>) -> Condition {
        stmt::eq_attributes(&self.attribute_ref(), &other.attribute_ref())
    }
}

impl<E> Attribute<E, String> {
    pub fn contains(&self, needle: impl Into<String>) -> Condition {
        stmt::contains(&self.attribute_ref(), needle)
    }
}

impl<E> Attribute<E, Option<String>> {
    pub fn contains(&self, needle: impl Into<String>) -> Condition {
        stmt::contains(&self.attribute_ref(), needle)
    }
}

impl<E, V> Clone for Attribute<E, V> {
    fn clone(&self) -> Self {
        Attribute {
            prefix: self.prefix.clone(),
            name: self.name.clone(),
            primary: self.primary,
            max_length: self.max_length,
            get: self.get.clone(),
            set: self.set.clone(),
        }
    }
}

impl<E, V> PartialEq for Attribute<E, V> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<E, V> fmt::Debug for Attribute<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("prefix", &self.prefix)
            .field("name", &self.name)
            .field("primary", &self.primary)
            .field("max_length", &self.max_length)
            .finish()
    }
}

type ValueFn<E> = Arc<dyn Fn(&E) -> Value + Send + Sync>;
type ApplyFn<E> = Arc<dyn Fn(&mut E, &dyn AttributeSource, &str) -> Result<bool> + Send + Sync>;
type AssignFn<E> = Arc<dyn Fn(&mut E, Value) -> Result<()> + Send + Sync>;
type ValidateFn<E> = Arc<dyn Fn(&E) -> Result<()> + Send + Sync>;

/// A registered attribute with its value type erased.
///
/// Mappers hold heterogeneous attributes through this type; the typed read
/// and write paths are captured when the attribute is registered.
pub struct MappedAttribute<E> {
    attr: AttributeRef,
    primary: bool,
    nullable: bool,
    max_length: Option<usize>,
    value: ValueFn<E>,
    apply: ApplyFn<E>,
    assign: AssignFn<E>,
    validate: ValidateFn<E>,
}

impl<E: 'static> MappedAttribute<E> {
    pub(crate) fn new<V: Primitive>(attribute: &Attribute<E, V>) -> MappedAttribute<E> {
        let get = attribute.get.clone();
        let value = Arc::new(move |entity: &E| get(entity).into_value());

        let set = attribute.set.clone();
        let apply = Arc::new(
            move |entity: &mut E, source: &dyn AttributeSource, key: &str| {
                let Some(value) = V::read(source, key)? else {
                    return Ok(false);
                };
                let present = !value.is_null();
                set(entity, value);
                Ok(present)
            },
        );

        let set = attribute.set.clone();
        let assign = Arc::new(move |entity: &mut E, value: Value| {
            set(entity, V::from_value(value)?);
            Ok(())
        });

        let get = attribute.get.clone();
        let max_length = attribute.max_length;
        let validate = Arc::new(move |entity: &E| {
            let (Some(max), Some(len)) = (max_length, get(entity).char_len()) else {
                return Ok(());
            };
            if len > max {
                return Err(Error::validation_length(len, None, Some(max)));
            }
            Ok(())
        });

        MappedAttribute {
            attr: attribute.attribute_ref(),
            primary: attribute.primary,
            nullable: V::NULLABLE,
            max_length,
            value,
            apply,
            assign,
            validate,
        }
    }
}

impl<E> MappedAttribute<E> {
    pub fn attribute_ref(&self) -> &AttributeRef {
        &self.attr
    }

    pub fn name(&self) -> &str {
        &self.attr.name
    }

    pub fn qualified_name(&self) -> String {
        self.attr.qualified_name()
    }

    pub fn ty(&self) -> Type {
        self.attr.ty
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn value(&self, entity: &E) -> Value {
        (self.value)(entity)
    }

    /// Reads the attribute from `source` under `key` into `entity`. Returns
    /// `true` when a non-null value was present.
    pub fn apply(&self, entity: &mut E, source: &dyn AttributeSource, key: &str) -> Result<bool> {
        (self.apply)(entity, source, key)
    }

    pub fn assign(&self, entity: &mut E, value: Value) -> Result<()> {
        (self.assign)(entity, value)
    }

    pub fn validate(&self, entity: &E) -> Result<()> {
        (self.validate)(entity).map_err(|err| self.context(err))
    }

    /// Checks a value about to be assigned without an entity: its type must
    /// match the attribute and strings must respect the length limit.
    pub fn validate_value(&self, value: &Value) -> Result<()> {
        match value.ty() {
            None if self.nullable => return Ok(()),
            Some(ty) if ty == self.attr.ty => {}
            _ => {
                return Err(self.context(Error::type_conversion(
                    value.clone(),
                    self.attr.ty.name(),
                )))
            }
        }

        if let (Some(max), Value::String(s)) = (self.max_length, value) {
            let len = s.chars().count();
            if len > max {
                return Err(self.context(Error::validation_length(len, None, Some(max))));
            }
        }
        Ok(())
    }

    fn context(&self, err: Error) -> Error {
        err.context(Error::from_args(format_args!(
            "attribute `{}`",
            self.attr.qualified_name()
        )))
    }
}

impl<E> Clone for MappedAttribute<E> {
    fn clone(&self) -> Self {
        MappedAttribute {
            attr: self.attr.clone(),
            primary: self.primary,
            nullable: self.nullable,
            max_length: self.max_length,
            value: self.value.clone(),
            apply: self.apply.clone(),
            assign: self.assign.clone(),
            validate: self.validate.clone(),
        }
    }
}

impl<E> PartialEq for MappedAttribute<E> {
    fn eq(&self, other: &Self) -> bool {
        self.attr.name == other.attr.name
    }
}

impl<E> fmt::Debug for MappedAttribute<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedAttribute")
            .field("attr", &self.attr)
            .field("primary", &self.primary)
            .finish()
    }
}
