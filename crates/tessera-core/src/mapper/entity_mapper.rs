use super::{Attribute, AttributeSource, Key, MappedAttribute, Mapper};
use crate::{
    driver::operation::{Column, Source},
    err,
    stmt::{AttributeRef, Condition, Primitive, Record, Value},
    Error, Result,
};

use indexmap::IndexMap;
use std::{fmt, sync::Arc};

type Constructor<E> = Arc<dyn Fn() -> E + Send + Sync>;
type FilterFn<F> = Arc<dyn Fn(&F) -> Vec<Condition> + Send + Sync>;

/// Maps one entity type onto one data set.
///
/// Built once with [`EntityMapper::builder`] and shared afterwards; the
/// mapper is immutable and safe to use from any thread.
pub struct EntityMapper<E, F> {
    data_set: String,

    /// Registered attributes keyed by qualified name, in registration order.
    attributes: IndexMap<String, MappedAttribute<E>>,

    constructor: Constructor<E>,
    filter: FilterFn<F>,
}

pub struct EntityMapperBuilder<E, F> {
    data_set: String,
    attributes: IndexMap<String, MappedAttribute<E>>,
    constructor: Constructor<E>,
    filter: Option<FilterFn<F>>,
}

impl<E: Default + 'static, F> EntityMapper<E, F> {
    pub fn builder(data_set: impl Into<String>) -> EntityMapperBuilder<E, F> {
        EntityMapper::builder_with(data_set, E::default)
    }
}

impl<E: 'static, F> EntityMapper<E, F> {
    /// Starts a mapper whose blank entities come from `constructor`.
    pub fn builder_with(
        data_set: impl Into<String>,
        constructor: impl Fn() -> E + Send + Sync + 'static,
    ) -> EntityMapperBuilder<E, F> {
        EntityMapperBuilder {
            data_set: data_set.into(),
            attributes: IndexMap::new(),
            constructor: Arc::new(constructor),
            filter: None,
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = &MappedAttribute<E>> {
        self.attributes.values()
    }

    pub fn mapped_attribute(&self, qualified_name: &str) -> Option<&MappedAttribute<E>> {
        self.attributes.get(qualified_name)
    }

    /// Attributes in registration order, as qualified names.
    pub fn qualified_names(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }

    pub fn primary(&self) -> impl Iterator<Item = &MappedAttribute<E>> {
        self.attributes.values().filter(|attr| attr.is_primary())
    }

    /// Every attribute paired with its value in `entity`.
    pub fn values(&self, entity: &E) -> Vec<(AttributeRef, Value)> {
        self.attributes
            .values()
            .map(|attr| (attr.attribute_ref().clone(), attr.value(entity)))
            .collect()
    }

    /// `entity` as a record keyed by bare attribute names.
    pub fn record(&self, entity: &E) -> Record {
        self.attributes
            .values()
            .map(|attr| (attr.name().to_string(), attr.value(entity)))
            .collect()
    }

    /// The primary key of `entity`, one entry per primary attribute.
    pub fn primary_key_of(&self, entity: &E) -> Vec<(AttributeRef, Value)> {
        self.primary()
            .map(|attr| (attr.attribute_ref().clone(), attr.value(entity)))
            .collect()
    }

    /// Pairs each primary attribute with its component of `key`.
    ///
    /// Fails when the shape of the key does not match the primary key: a
    /// scalar key for a composite primary key, or a composite key of the
    /// wrong length.
    pub fn decompose_primary_key(&self, key: Key) -> Result<Vec<(AttributeRef, Value)>> {
        let primary: Vec<_> = self.primary().map(|attr| attr.attribute_ref().clone()).collect();

        let values = match key {
            Key::Scalar(value) if primary.len() == 1 => vec![value],
            Key::Scalar(_) => {
                return Err(Error::invalid_mapping(format!(
                    "`{}` has a composite primary key of {} attributes; a scalar key cannot address it",
                    self.data_set,
                    primary.len()
                )))
            }
            Key::Composite(values) if values.len() == primary.len() => values,
            Key::Composite(values) => {
                return Err(Error::invalid_mapping(format!(
                    "`{}` has {} primary key attributes, got a key of {} values",
                    self.data_set,
                    primary.len(),
                    values.len()
                )))
            }
        };

        Ok(primary.into_iter().zip(values).collect())
    }

    /// A condition matching exactly the record addressed by `key`.
    pub fn primary_key_condition(&self, key: Key) -> Result<Condition> {
        let conditions = self
            .decompose_primary_key(key)?
            .into_iter()
            .map(|(attr, value)| Condition::Eq(attr, value));

        Condition::all(conditions).ok_or_else(|| err!("`{}` has no primary key", self.data_set))
    }

    /// Checks every length-constrained attribute of `entity`.
    pub fn validate(&self, entity: &E) -> Result<()> {
        self.attributes
            .values()
            .try_for_each(|attr| attr.validate(entity))
    }

    /// Assigns `value` to the attribute named `qualified_name`.
    pub fn assign(&self, entity: &mut E, qualified_name: &str, value: Value) -> Result<()> {
        let attr = self.attributes.get(qualified_name).ok_or_else(|| {
            Error::invalid_mapping(format!(
                "`{qualified_name}` is not an attribute of `{}`",
                self.data_set
            ))
        })?;
        attr.assign(entity, value)
    }
}

impl<E: 'static, F> EntityMapperBuilder<E, F> {
    /// Registers `attribute`, defaulting its prefix to the data set name, and
    /// returns the registered copy. Conditions must be built from the
    /// returned attribute so that they carry the qualified identity.
    pub fn add<V: Primitive>(&mut self, attribute: Attribute<E, V>) -> Result<Attribute<E, V>> {
        let attribute = match attribute.prefix() {
            Some(_) => attribute,
            None => attribute.with_name_prefix(self.data_set.clone()),
        };

        let qualified_name = attribute.qualified_name();
        if self.attributes.contains_key(&qualified_name) {
            return Err(Error::invalid_mapping(format!(
                "attribute `{qualified_name}` is already registered"
            )));
        }

        self.attributes
            .insert(qualified_name, MappedAttribute::new(&attribute));
        Ok(attribute)
    }

    /// Sets how a query filter is turned into backend-neutral conditions.
    pub fn filter(
        &mut self,
        filter: impl Fn(&F) -> Vec<Condition> + Send + Sync + 'static,
    ) -> &mut Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn build(self) -> Result<EntityMapper<E, F>> {
        if !self.attributes.values().any(|attr| attr.is_primary()) {
            return Err(Error::invalid_mapping(format!(
                "`{}` has no primary key attribute",
                self.data_set
            )));
        }

        Ok(EntityMapper {
            data_set: self.data_set,
            attributes: self.attributes,
            constructor: self.constructor,
            filter: self.filter.unwrap_or_else(|| Arc::new(|_| vec![])),
        })
    }
}

impl<E: 'static, F: 'static> Mapper<E, F> for EntityMapper<E, F> {
    fn data_set(&self) -> &str {
        &self.data_set
    }

    fn source(&self) -> Result<Source> {
        Ok(Source::table(&self.data_set))
    }

    fn columns(&self, alias: &str, dst: &mut Vec<Column>) {
        dst.extend(self.attributes.values().map(|attr| Column {
            attribute: attr.attribute_ref().clone(),
            alias: format!("{alias}{}", attr.name()),
        }));
    }

    fn attribute(&self, qualified_name: &str) -> Option<AttributeRef> {
        self.attributes
            .get(qualified_name)
            .map(|attr| attr.attribute_ref().clone())
    }

    fn primary_attributes(&self) -> Vec<AttributeRef> {
        self.primary().map(|attr| attr.attribute_ref().clone()).collect()
    }

    fn compose_filter_conditions(&self, filter: &F) -> Vec<Condition> {
        (self.filter)(filter)
    }

    fn build_entity(&self, source: &dyn AttributeSource, alias: &str) -> Result<Option<E>> {
        let mut entity = (self.constructor)();
        let mut has_key = false;

        for attr in self.attributes.values() {
            let key = format!("{alias}{}", attr.name());
            let present = attr
                .apply(&mut entity, source, &key)
                .map_err(|e| e.context(err!("reading `{key}` of `{}`", self.data_set)))?;
            has_key |= present && attr.is_primary();
        }

        Ok(has_key.then_some(entity))
    }
}

impl<E, F> fmt::Debug for EntityMapper<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMapper")
            .field("data_set", &self.data_set)
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .finish()
    }
}
