use crate::{Db, Results};

use tessera_core::{
    driver::operation::{Aggregate, Delete, Insert, Update},
    mapper::{self, MappedAttribute},
    query::{Aggregation, Group, Overview, Pagination},
    stmt::{AttributeRef, Condition, Primitive, Record, Value},
    AttributeSource, EntityMapper, Error, Key, Mapper, Result,
};

use std::{fmt, marker::PhantomData, sync::Arc};
use tracing::debug;

/// CRUD, find and aggregate operations for one entity type.
///
/// `K` is the key type callers address entities with; it converts into a
/// [`Key`], so a single-attribute key is a plain value and a composite key is
/// a tuple. `F` is the filter type the mapper composes conditions from.
///
/// Every method runs as one operation: it acquires one connection, runs
/// inside one transaction and releases the connection before returning.
pub struct Repository<E, K, F> {
    db: Db,
    mapper: Arc<EntityMapper<E, F>>,
    _key: PhantomData<fn(K)>,
}

/// One row of a grouped aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped<V> {
    /// Group values keyed by the qualified names grouped on.
    pub group: Record,

    /// `None` when the aggregate is null for the group.
    pub value: Option<V>,
}

impl<E, K, F> Repository<E, K, F>
where
    E: 'static,
    K: Into<Key>,
    F: 'static,
{
    pub fn new(db: Db, mapper: impl Into<Arc<EntityMapper<E, F>>>) -> Repository<E, K, F> {
        Repository {
            db,
            mapper: mapper.into(),
            _key: PhantomData,
        }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn mapper(&self) -> &Arc<EntityMapper<E, F>> {
        &self.mapper
    }

    /// Inserts every attribute of `entity`.
    ///
    /// With `autogenerate_key`, the backend generates the (single) primary
    /// key attribute instead and the returned entity carries it.
    pub fn create(&self, entity: E, autogenerate_key: bool) -> Result<E> {
        self.db.transact(|conn| {
            let insert = self.insert(&entity, autogenerate_key)?;
            let generated = insert.generated_key.is_some();
            let response = conn.exec(insert.into())?;

            if !generated {
                return Ok(entity);
            }
            self.apply_generated_key(entity, response.into_records()?)
        })
    }

    /// Creates each entity in its own operation. A failure leaves the
    /// entities created before it in place.
    pub fn create_all(
        &self,
        entities: impl IntoIterator<Item = E>,
        autogenerate_key: bool,
    ) -> Result<Vec<E>> {
        entities
            .into_iter()
            .map(|entity| self.create(entity, autogenerate_key))
            .collect()
    }

    /// Writes every attribute of `entity` to the record with the same primary
    /// key. Returns `None` when no such record exists.
    pub fn update(&self, entity: E) -> Result<Option<E>> {
        self.mapper.validate(&entity)?;

        let key = self.mapper.primary_key_of(&entity);
        let mut assignments: Vec<_> = self
            .mapper
            .attributes()
            .filter(|attr| !attr.is_primary())
            .map(|attr| (attr.attribute_ref().clone(), attr.value(&entity)))
            .collect();

        if assignments.is_empty() {
            assignments = key.clone();
        }

        let update = Update {
            data_set: self.data_set(),
            assignments,
            filter: key_condition(key),
        };

        let matched = self
            .db
            .transact(|conn| conn.exec(update.into())?.into_count())?;

        Ok((matched > 0).then_some(entity))
    }

    /// Assigns only the named attributes of the record addressed by `key`.
    /// Names are qualified (`products.price`) or bare (`price`). Returns the
    /// number of matched records.
    pub fn update_attributes<S: AsRef<str>>(
        &self,
        key: K,
        values: impl IntoIterator<Item = (S, Value)>,
    ) -> Result<u64> {
        let assignments = values
            .into_iter()
            .map(|(name, value)| {
                let attr = self.lookup(name.as_ref())?;
                attr.validate_value(&value)?;
                Ok((attr.attribute_ref().clone(), value))
            })
            .collect::<Result<Vec<_>>>()?;

        if assignments.is_empty() {
            return Err(Error::invalid_argument("no attributes to update"));
        }

        let update = Update {
            data_set: self.data_set(),
            assignments,
            filter: Some(self.mapper.primary_key_condition(key.into())?),
        };

        self.db
            .transact(|conn| conn.exec(update.into())?.into_count())
    }

    /// Returns `true` when a record was deleted.
    pub fn delete(&self, key: K) -> Result<bool> {
        let delete = Delete {
            data_set: self.data_set(),
            filter: Some(self.mapper.primary_key_condition(key.into())?),
        };

        let deleted = self
            .db
            .transact(|conn| conn.exec(delete.into())?.into_count())?;
        Ok(deleted > 0)
    }

    /// Deletes every record matching `filter` and returns how many there
    /// were. A filter composing no conditions deletes everything.
    pub fn delete_by_filter(&self, filter: &F) -> Result<u64> {
        let delete = Delete {
            data_set: self.data_set(),
            filter: Condition::all(Mapper::<E, F>::compose_filter_conditions(&*self.mapper, filter)),
        };

        self.db
            .transact(|conn| conn.exec(delete.into())?.into_count())
    }

    pub fn find_by_id(&self, key: K) -> Result<Option<E>> {
        let condition = self.mapper.primary_key_condition(key.into())?;
        let overview = Overview::new().with_pagination(Pagination::new(0, 1)?);

        let mut found = self
            .db
            .transact(|conn| Mapper::<E, F>::fetch(&*self.mapper, conn, &overview, vec![condition]))?;
        Ok(found.pop())
    }

    pub fn exists_by_id(&self, key: K) -> Result<bool> {
        Ok(self.find_by_id(key)?.is_some())
    }

    /// Every entity, in primary key order.
    pub fn find_all(&self) -> Result<Vec<E>> {
        self.find_by_overview(&Overview::new())
    }

    pub fn find_by_filter(&self, filter: F) -> Result<Vec<E>> {
        self.find_by_overview(&Overview::filtered(filter))
    }

    /// The first match in primary key order.
    pub fn find_first_by_filter(&self, filter: F) -> Result<Option<E>> {
        let overview = Overview::filtered(filter).with_pagination(Pagination::new(0, 1)?);
        Ok(self.find_by_overview(&overview)?.into_iter().next())
    }

    pub fn find_by_overview(&self, overview: &Overview<F>) -> Result<Vec<E>> {
        self.db
            .transact(|conn| Mapper::<E, F>::fetch(&*self.mapper, conn, overview, vec![]))
    }

    /// Runs the page query and a count query with the same filter, and
    /// returns both.
    pub fn find_results_with_overview(&self, overview: &Overview<F>) -> Result<Results<E>> {
        find_results(&self.db, &*self.mapper, overview)
    }

    pub fn count_by_filter(&self, filter: Option<&F>) -> Result<u64> {
        self.db
            .transact(|conn| Mapper::<E, F>::count(&*self.mapper, conn, filter, None))
    }

    /// Computes one aggregate over the records matching `filter`.
    ///
    /// `attribute` is the qualified name to aggregate; `None` is only valid
    /// for [`Aggregation::Count`]. The result is read as `V`, so counts are
    /// read as an integer type and sums or averages as a numeric type wide
    /// enough for the backend's result.
    pub fn agg_by_filter<V: Primitive>(
        &self,
        function: Aggregation,
        attribute: Option<&str>,
        filter: Option<&F>,
    ) -> Result<Option<V>> {
        let records = self.db.transact(|conn| {
            Mapper::<E, F>::aggregate(&*self.mapper, conn, function, attribute, filter, None)
        })?;

        match records.first() {
            Some(record) => V::read(record.as_ref(), Aggregate::VALUE),
            // No record at all means nothing matched.
            None if function == Aggregation::Count => {
                let zero: Record = [(Aggregate::VALUE, Value::I32(0))].into_iter().collect();
                V::read(&zero, Aggregate::VALUE)
            }
            None => Ok(None),
        }
    }

    /// Computes one aggregate per group.
    pub fn agg_by_filter_grouped<V: Primitive>(
        &self,
        function: Aggregation,
        attribute: Option<&str>,
        filter: Option<&F>,
        group: &Group,
    ) -> Result<Vec<Grouped<V>>> {
        let group_by = group
            .attributes
            .iter()
            .map(|name| mapper::resolve::<E, F, _>(&*self.mapper, name))
            .collect::<Result<Vec<_>>>()?;

        let records = self.db.transact(|conn| {
            let group = Some(group);
            Mapper::<E, F>::aggregate(&*self.mapper, conn, function, attribute, filter, group)
        })?;

        records
            .iter()
            .map(|record| {
                let mut values = Record::new();
                for (i, attr) in group_by.iter().enumerate() {
                    let value =
                        mapper::read_value(record.as_ref(), &Aggregate::group_key(i), attr.ty)?;
                    values.insert(attr.qualified_name(), value);
                }

                Ok(Grouped {
                    group: values,
                    value: V::read(record.as_ref(), Aggregate::VALUE)?,
                })
            })
            .collect()
    }

    fn insert(&self, entity: &E, autogenerate_key: bool) -> Result<Insert> {
        self.mapper.validate(entity)?;

        let generated_key = if autogenerate_key {
            let mut primary = self.mapper.primary();
            match (primary.next(), primary.next()) {
                (Some(attr), None) => Some(attr.attribute_ref().clone()),
                _ => {
                    return Err(Error::invalid_mapping(format!(
                        "`{}` needs exactly one primary key attribute to generate keys",
                        self.data_set()
                    )))
                }
            }
        } else {
            None
        };

        let values = self
            .mapper
            .values(entity)
            .into_iter()
            .filter(|(attr, _)| Some(attr) != generated_key.as_ref())
            .collect();

        Ok(Insert {
            data_set: self.data_set(),
            values,
            primary_key: self
                .mapper
                .primary()
                .map(|attr| attr.attribute_ref().clone())
                .collect(),
            generated_key,
        })
    }

    fn apply_generated_key(
        &self,
        mut entity: E,
        records: Vec<Box<dyn AttributeSource>>,
    ) -> Result<E> {
        let record = records
            .first()
            .ok_or_else(|| tessera_core::err!("backend returned no generated key"))?;

        for attr in self.mapper.primary() {
            if !attr.apply(&mut entity, record.as_ref(), attr.name())? {
                tessera_core::bail!("generated key `{}` is null", attr.qualified_name());
            }
            debug!(attribute = %attr.qualified_name(), "applied generated key");
        }

        Ok(entity)
    }

    fn data_set(&self) -> String {
        Mapper::<E, F>::data_set(&*self.mapper).to_string()
    }

    fn lookup(&self, name: &str) -> Result<&MappedAttribute<E>> {
        self.mapper
            .mapped_attribute(name)
            .or_else(|| {
                self.mapper
                    .mapped_attribute(&format!("{}.{name}", self.data_set()))
            })
            .ok_or_else(|| {
                Error::invalid_mapping(format!(
                    "`{name}` is not an attribute of `{}`",
                    self.data_set()
                ))
            })
    }
}

fn key_condition(key: Vec<(AttributeRef, Value)>) -> Option<Condition> {
    Condition::all(key.into_iter().map(|(attr, value)| Condition::Eq(attr, value)))
}

/// Shared by entity and join repositories.
pub(crate) fn find_results<E, F, M>(db: &Db, mapper: &M, overview: &Overview<F>) -> Result<Results<E>>
where
    M: Mapper<E, F> + ?Sized,
{
    db.transact(|conn| {
        let items = mapper.fetch(conn, overview, vec![])?;
        let total = mapper.count(conn, overview.filter.as_ref(), overview.group.as_ref())?;

        Ok(Results {
            items,
            pagination: overview.pagination.map(|pagination| pagination.with_total(total)),
            total,
        })
    })
}

impl<E, K, F> Clone for Repository<E, K, F> {
    fn clone(&self) -> Self {
        Repository {
            db: self.db.clone(),
            mapper: self.mapper.clone(),
            _key: PhantomData,
        }
    }
}

impl<E, K, F> fmt::Debug for Repository<E, K, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("db", &self.db)
            .field("mapper", &self.mapper)
            .finish()
    }
}
