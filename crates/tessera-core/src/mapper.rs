mod attribute;
pub use attribute::{Attribute, MappedAttribute};

mod entity_mapper;
pub use entity_mapper::{EntityMapper, EntityMapperBuilder};

mod join;
pub use join::{JoinBuilder, JoinEntityMapper};

mod key;
pub use key::Key;

mod source;
pub use source::{read_value, AttributeSource};

use crate::{
    driver::{
        operation::{Aggregate, Column, Count, Find, OrderBy, Source},
        Connection,
    },
    query::{Aggregation, Group, Order, Overview},
    stmt::{AttributeRef, Condition},
    Error, Result,
};

use std::sync::Arc;

/// How the two sides of a join are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

/// How many second-side entities a first-side entity is composed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// At most one, fetched with a single joined query.
    One,

    /// Any number, fetched with one query per side and matched in memory.
    Many,
}

/// Maps entities of type `E`, queried with filters of type `F`, onto a
/// backend data set.
///
/// Both plain entity mappers and join mappers implement this trait, so a
/// join can itself be one side of another join. The provided methods build
/// and run single-query reads; join mappers override them where a single
/// query cannot express the read.
pub trait Mapper<E, F>: Send + Sync {
    /// Name of the data set (table or collection) this mapper reads.
    fn data_set(&self) -> &str;

    /// Prefix prepended to aliases of this mapper's attributes when it is
    /// one side of a join.
    fn alias_prefix(&self) -> String {
        format!("{}_", self.data_set())
    }

    /// `None` for a plain entity mapper.
    fn cardinality(&self) -> Option<Cardinality> {
        None
    }

    /// The source a single query over this mapper reads from.
    fn source(&self) -> Result<Source>;

    /// Appends the selected columns, each aliased with `alias` followed by
    /// the attribute name.
    fn columns(&self, alias: &str, dst: &mut Vec<Column>);

    /// Looks up a registered attribute by qualified name.
    fn attribute(&self, qualified_name: &str) -> Option<AttributeRef>;

    fn primary_attributes(&self) -> Vec<AttributeRef>;

    fn compose_filter_conditions(&self, filter: &F) -> Vec<Condition>;

    /// Builds one entity from a record whose keys were produced by
    /// [`Mapper::columns`] with the same `alias`. Returns `None` when every
    /// primary key attribute is absent.
    fn build_entity(&self, source: &dyn AttributeSource, alias: &str) -> Result<Option<E>>;

    fn select(&self, overview: &Overview<F>, extra: Vec<Condition>) -> Result<Find> {
        select(self, overview, extra)
    }

    fn fetch(
        &self,
        conn: &mut dyn Connection,
        overview: &Overview<F>,
        extra: Vec<Condition>,
    ) -> Result<Vec<E>> {
        fetch(self, conn, overview, extra)
    }

    fn count(
        &self,
        conn: &mut dyn Connection,
        filter: Option<&F>,
        group: Option<&Group>,
    ) -> Result<u64> {
        count(self, conn, filter, group)
    }

    fn aggregate(
        &self,
        conn: &mut dyn Connection,
        function: Aggregation,
        attribute: Option<&str>,
        filter: Option<&F>,
        group: Option<&Group>,
    ) -> Result<Vec<Box<dyn AttributeSource>>> {
        aggregate(self, conn, function, attribute, filter, group)
    }
}

impl<E, F, M: Mapper<E, F> + ?Sized> Mapper<E, F> for Arc<M> {
    fn data_set(&self) -> &str {
        (**self).data_set()
    }

    fn alias_prefix(&self) -> String {
        (**self).alias_prefix()
    }

    fn cardinality(&self) -> Option<Cardinality> {
        (**self).cardinality()
    }

    fn source(&self) -> Result<Source> {
        (**self).source()
    }

    fn columns(&self, alias: &str, dst: &mut Vec<Column>) {
        (**self).columns(alias, dst)
    }

    fn attribute(&self, qualified_name: &str) -> Option<AttributeRef> {
        (**self).attribute(qualified_name)
    }

    fn primary_attributes(&self) -> Vec<AttributeRef> {
        (**self).primary_attributes()
    }

    fn compose_filter_conditions(&self, filter: &F) -> Vec<Condition> {
        (**self).compose_filter_conditions(filter)
    }

    fn build_entity(&self, source: &dyn AttributeSource, alias: &str) -> Result<Option<E>> {
        (**self).build_entity(source, alias)
    }

    fn select(&self, overview: &Overview<F>, extra: Vec<Condition>) -> Result<Find> {
        (**self).select(overview, extra)
    }

    fn fetch(
        &self,
        conn: &mut dyn Connection,
        overview: &Overview<F>,
        extra: Vec<Condition>,
    ) -> Result<Vec<E>> {
        (**self).fetch(conn, overview, extra)
    }

    fn count(
        &self,
        conn: &mut dyn Connection,
        filter: Option<&F>,
        group: Option<&Group>,
    ) -> Result<u64> {
        (**self).count(conn, filter, group)
    }

    fn aggregate(
        &self,
        conn: &mut dyn Connection,
        function: Aggregation,
        attribute: Option<&str>,
        filter: Option<&F>,
        group: Option<&Group>,
    ) -> Result<Vec<Box<dyn AttributeSource>>> {
        (**self).aggregate(conn, function, attribute, filter, group)
    }
}

/// Resolves a qualified attribute name against `mapper`.
pub fn resolve<E, F, M>(mapper: &M, qualified_name: &str) -> Result<AttributeRef>
where
    M: Mapper<E, F> + ?Sized,
{
    mapper.attribute(qualified_name).ok_or_else(|| {
        Error::invalid_mapping(format!(
            "`{qualified_name}` is not an attribute of `{}`",
            mapper.data_set()
        ))
    })
}

/// Extra conditions first, then the ones composed from the filter.
fn conditions<E, F, M>(mapper: &M, filter: Option<&F>, extra: Vec<Condition>) -> Option<Condition>
where
    M: Mapper<E, F> + ?Sized,
{
    let mut conditions = extra;
    if let Some(filter) = filter {
        conditions.extend(mapper.compose_filter_conditions(filter));
    }
    Condition::all(conditions)
}

fn group_by<E, F, M>(mapper: &M, group: Option<&Group>) -> Result<Vec<AttributeRef>>
where
    M: Mapper<E, F> + ?Sized,
{
    group
        .map(|group| group.attributes.iter())
        .into_iter()
        .flatten()
        .map(|name| resolve(mapper, name))
        .collect()
}

/// Resolves the requested ordering. Primary key attributes not already
/// ordered on are appended ascending, so that pages are stable.
fn order_by<E, F, M>(mapper: &M, order: &[Order]) -> Result<Vec<OrderBy>>
where
    M: Mapper<E, F> + ?Sized,
{
    let mut order_by = order
        .iter()
        .map(|order| {
            Ok(OrderBy {
                attribute: resolve(mapper, &order.attribute)?,
                descending: order.descending,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    for attribute in mapper.primary_attributes() {
        if !order_by.iter().any(|entry| entry.attribute == attribute) {
            order_by.push(OrderBy {
                attribute,
                descending: false,
            });
        }
    }

    Ok(order_by)
}

pub(crate) fn select<E, F, M>(
    mapper: &M,
    overview: &Overview<F>,
    extra: Vec<Condition>,
) -> Result<Find>
where
    M: Mapper<E, F> + ?Sized,
{
    let mut columns = vec![];
    mapper.columns("", &mut columns);

    let mut find = Find::new(mapper.source()?, columns);
    find.filter = conditions(mapper, overview.filter.as_ref(), extra);
    find.group_by = group_by(mapper, overview.group.as_ref())?;
    find.order_by = order_by(mapper, &overview.order)?;

    if let Some(pagination) = &overview.pagination {
        find.offset = Some(pagination.offset());
        find.limit = Some(pagination.limit());
    }

    Ok(find)
}

pub(crate) fn fetch<E, F, M>(
    mapper: &M,
    conn: &mut dyn Connection,
    overview: &Overview<F>,
    extra: Vec<Condition>,
) -> Result<Vec<E>>
where
    M: Mapper<E, F> + ?Sized,
{
    let find = mapper.select(overview, extra)?;
    let records = conn.exec(find.into())?.into_records()?;

    let mut entities = Vec::with_capacity(records.len());
    for record in &records {
        if let Some(entity) = mapper.build_entity(record.as_ref(), "")? {
            entities.push(entity);
        }
    }
    Ok(entities)
}

pub(crate) fn count<E, F, M>(
    mapper: &M,
    conn: &mut dyn Connection,
    filter: Option<&F>,
    group: Option<&Group>,
) -> Result<u64>
where
    M: Mapper<E, F> + ?Sized,
{
    let op = Count {
        source: mapper.source()?,
        filter: conditions(mapper, filter, vec![]),
        group_by: group_by(mapper, group)?,
    };
    conn.exec(op.into())?.into_count()
}

pub(crate) fn aggregate<E, F, M>(
    mapper: &M,
    conn: &mut dyn Connection,
    function: Aggregation,
    attribute: Option<&str>,
    filter: Option<&F>,
    group: Option<&Group>,
) -> Result<Vec<Box<dyn AttributeSource>>>
where
    M: Mapper<E, F> + ?Sized,
{
    if attribute.is_none() && function != Aggregation::Count {
        return Err(Error::invalid_argument(format!(
            "{} requires an attribute",
            function.name()
        )));
    }

    let op = Aggregate {
        source: mapper.source()?,
        function,
        attribute: attribute.map(|name| resolve(mapper, name)).transpose()?,
        filter: conditions(mapper, filter, vec![]),
        group_by: group_by(mapper, group)?,
    };
    conn.exec(op.into())?.into_records()
}
