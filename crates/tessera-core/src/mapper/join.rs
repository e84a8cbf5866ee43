use super::{Attribute, AttributeSource, Cardinality, JoinKind, Mapper};
use crate::{
    driver::{
        operation::{Column, Join, Source},
        Connection,
    },
    query::{Group, Order, Overview},
    stmt::{AttributeRef, Condition, Primitive, Value},
    Error, Result,
};

use indexmap::IndexSet;
use std::{
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};
use tracing::debug;

type KeyReader = Arc<dyn Fn(&dyn AttributeSource, &str) -> Result<Option<Value>> + Send + Sync>;
type FilterSplit<F, FA, FB> = Arc<dyn Fn(&F) -> (Option<FA>, Option<FB>) + Send + Sync>;
type OrderSplit = Arc<dyn Fn(&[Order]) -> (Vec<Order>, Vec<Order>) + Send + Sync>;
type GroupSplit = Arc<dyn Fn(&Group) -> (Option<Group>, Option<Group>) + Send + Sync>;

enum Composer<A, B, R> {
    One(Arc<dyn Fn(A, Option<B>) -> R + Send + Sync>),
    Many {
        compose: Arc<dyn Fn(A, Vec<B>) -> R + Send + Sync>,
        clone: fn(&B) -> B,
    },
}

/// The equality the two sides are joined on, with typed readers for the
/// key values of each side.
struct JoinOn {
    first: AttributeRef,
    second: AttributeRef,
    first_key: KeyReader,
    second_key: KeyReader,
}

/// Maps a composite entity `R` assembled from a first-side entity `A` and
/// second-side entities `B`.
///
/// With [`Cardinality::One`] the read is a single joined query and the join
/// can be nested as a side of another one-to-one join. With
/// [`Cardinality::Many`] the first side is queried (and paginated) on its
/// own, then every matching second-side record is fetched in one query and
/// grouped by join key in memory.
pub struct JoinEntityMapper<A, B, R, F, FA, FB> {
    first: Arc<dyn Mapper<A, FA>>,
    second: Arc<dyn Mapper<B, FB>>,
    data_set: String,
    on: JoinOn,
    extra: Vec<Condition>,
    kind: JoinKind,
    composer: Composer<A, B, R>,
    decompose_filter: FilterSplit<F, FA, FB>,
    decompose_ordering: Option<OrderSplit>,
    decompose_grouping: Option<GroupSplit>,
}

pub struct JoinBuilder<A, B, R, F, FA, FB> {
    first: Arc<dyn Mapper<A, FA>>,
    second: Arc<dyn Mapper<B, FB>>,
    on: Option<JoinOn>,
    extra: Vec<Condition>,
    kind: JoinKind,
    composer: Option<Composer<A, B, R>>,
    decompose_filter: Option<FilterSplit<F, FA, FB>>,
    decompose_ordering: Option<OrderSplit>,
    decompose_grouping: Option<GroupSplit>,
}

impl<A, B, R, F, FA, FB> JoinEntityMapper<A, B, R, F, FA, FB> {
    pub fn builder(
        first: impl Mapper<A, FA> + 'static,
        second: impl Mapper<B, FB> + 'static,
    ) -> JoinBuilder<A, B, R, F, FA, FB> {
        JoinBuilder {
            first: Arc::new(first),
            second: Arc::new(second),
            on: None,
            extra: vec![],
            kind: JoinKind::Inner,
            composer: None,
            decompose_filter: None,
            decompose_ordering: None,
            decompose_grouping: None,
        }
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    fn split_filter(&self, filter: Option<&F>) -> (Option<FA>, Option<FB>) {
        match filter {
            Some(filter) => (self.decompose_filter)(filter),
            None => (None, None),
        }
    }

    /// Splits ordering entries between the sides. Unless a custom split is
    /// configured, each entry goes to the side owning the attribute.
    fn split_ordering(&self, order: &[Order]) -> (Vec<Order>, Vec<Order>) {
        if let Some(split) = &self.decompose_ordering {
            return split(order);
        }

        order
            .iter()
            .cloned()
            .partition(|order| self.second.attribute(&order.attribute).is_none())
    }

    fn split_grouping(&self, group: Option<&Group>) -> (Option<Group>, Option<Group>) {
        let Some(group) = group else {
            return (None, None);
        };

        if let Some(split) = &self.decompose_grouping {
            return split(group);
        }

        let (first, second): (Vec<_>, Vec<_>) = group
            .attributes
            .iter()
            .cloned()
            .partition(|name| self.second.attribute(name).is_none());

        let non_empty = |attributes: Vec<String>| {
            (!attributes.is_empty()).then_some(Group { attributes })
        };
        (non_empty(first), non_empty(second))
    }

    fn fetch_many(
        &self,
        conn: &mut dyn Connection,
        overview: &Overview<F>,
        extra: Vec<Condition>,
        compose: &(dyn Fn(A, Vec<B>) -> R + Send + Sync),
        clone: fn(&B) -> B,
    ) -> Result<Vec<R>> {
        let (first_filter, second_filter) = self.split_filter(overview.filter.as_ref());
        let (first_order, second_order) = self.split_ordering(&overview.order);
        let (first_group, second_group) = self.split_grouping(overview.group.as_ref());

        let first_overview = Overview {
            filter: first_filter,
            order: first_order,
            group: first_group,
            pagination: overview.pagination,
        };

        let find = self.first.select(&first_overview, extra)?;
        let records = conn.exec(find.into())?.into_records()?;

        let mut parents = Vec::with_capacity(records.len());
        let mut keys = IndexSet::new();

        for record in &records {
            let Some(entity) = self.first.build_entity(record.as_ref(), "")? else {
                continue;
            };

            let key = (self.on.first_key)(record.as_ref(), &self.on.first.name)?.map(JoinKey);
            if let Some(key) = &key {
                keys.insert(key.clone());
            }
            parents.push((entity, key));
        }

        let mut children = vec![];

        debug!(
            data_set = %self.data_set,
            parents = parents.len(),
            keys = keys.len(),
            "fetching one-to-many children"
        );

        if !keys.is_empty() {
            let second_overview = Overview {
                filter: second_filter,
                order: second_order,
                group: second_group,
                pagination: None,
            };

            // Extra on-conditions restrict the joined side.
            let keys = keys.into_iter().map(|key| key.0).collect();
            let mut second_extra = vec![Condition::In(self.on.second.clone(), keys)];
            second_extra.extend(self.extra.iter().cloned());
            let find = self.second.select(&second_overview, second_extra)?;

            for record in conn.exec(find.into())?.into_records()? {
                let Some(entity) = self.second.build_entity(record.as_ref(), "")? else {
                    continue;
                };
                let key = (self.on.second_key)(record.as_ref(), &self.on.second.name)?;
                children.push((entity, key.map(JoinKey)));
            }
        }

        Ok(match_children(parents, children, compose, clone))
    }
}

/// A join value usable as a hash key. Floats compare by bit pattern.
#[derive(Debug, Clone)]
struct JoinKey(Value);

impl PartialEq for JoinKey {
    fn eq(&self, other: &JoinKey) -> bool {
        match (&self.0, &other.0) {
            (Value::F32(lhs), Value::F32(rhs)) => lhs.to_bits() == rhs.to_bits(),
            (Value::F64(lhs), Value::F64(rhs)) => lhs.to_bits() == rhs.to_bits(),
            (lhs, rhs) => lhs == rhs,
        }
    }
}

impl Eq for JoinKey {}

impl Hash for JoinKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::F32(v) => v.to_bits().hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::Decimal(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
        }
    }
}

/// Hands every parent the children sharing its join key, in the order the
/// children were fetched. Parents without a key get no children.
fn match_children<A, B, R>(
    parents: Vec<(A, Option<JoinKey>)>,
    children: Vec<(B, Option<JoinKey>)>,
    compose: &(dyn Fn(A, Vec<B>) -> R + Send + Sync),
    clone: fn(&B) -> B,
) -> Vec<R> {
    let mut groups: HashMap<JoinKey, Vec<B>> = HashMap::new();
    for (child, key) in children {
        if let Some(key) = key {
            groups.entry(key).or_default().push(child);
        }
    }

    parents
        .into_iter()
        .map(|(parent, key)| {
            let matching = key
                .and_then(|key| groups.get(&key))
                .map(|children| children.iter().map(clone).collect())
                .unwrap_or_default();
            compose(parent, matching)
        })
        .collect()
}

impl<A, B, R, F, FA, FB> JoinBuilder<A, B, R, F, FA, FB> {
    /// Joins on equality of `first` (owned by the first side) and `second`
    /// (owned by the second side).
    pub fn on<X, Y, V: Primitive>(mut self, first: &Attribute<X, V>, second: &Attribute<Y, V>) -> Self {
        self.on = Some(JoinOn {
            first: first.attribute_ref(),
            second: second.attribute_ref(),
            first_key: key_reader::<V>(),
            second_key: key_reader::<V>(),
        });
        self
    }

    /// Adds a condition applied as part of the join rather than after it.
    pub fn on_condition(mut self, condition: Condition) -> Self {
        self.extra.push(condition);
        self
    }

    pub fn kind(mut self, kind: JoinKind) -> Self {
        self.kind = kind;
        self
    }

    /// Composes each first-side entity with at most one second-side entity.
    pub fn compose_entity(mut self, compose: impl Fn(A, Option<B>) -> R + Send + Sync + 'static) -> Self {
        self.composer = Some(Composer::One(Arc::new(compose)));
        self
    }

    /// Composes each first-side entity with all matching second-side
    /// entities.
    pub fn compose_entity_with_many(
        mut self,
        compose: impl Fn(A, Vec<B>) -> R + Send + Sync + 'static,
    ) -> Self
    where
        B: Clone,
    {
        self.composer = Some(Composer::Many {
            compose: Arc::new(compose),
            clone: B::clone,
        });
        self
    }

    pub fn decompose_filter(
        mut self,
        split: impl Fn(&F) -> (Option<FA>, Option<FB>) + Send + Sync + 'static,
    ) -> Self {
        self.decompose_filter = Some(Arc::new(split));
        self
    }

    pub fn decompose_ordering(
        mut self,
        split: impl Fn(&[Order]) -> (Vec<Order>, Vec<Order>) + Send + Sync + 'static,
    ) -> Self {
        self.decompose_ordering = Some(Arc::new(split));
        self
    }

    pub fn decompose_grouping(
        mut self,
        split: impl Fn(&Group) -> (Option<Group>, Option<Group>) + Send + Sync + 'static,
    ) -> Self {
        self.decompose_grouping = Some(Arc::new(split));
        self
    }

    pub fn build(self) -> Result<JoinEntityMapper<A, B, R, F, FA, FB>> {
        let data_set = format!("{}_{}", self.first.data_set(), self.second.data_set());

        let on = self.on.ok_or_else(|| {
            Error::invalid_mapping(format!("join `{data_set}` has no join condition"))
        })?;
        let composer = self.composer.ok_or_else(|| {
            Error::invalid_mapping(format!("join `{data_set}` has no entity composer"))
        })?;
        let decompose_filter = self.decompose_filter.ok_or_else(|| {
            Error::invalid_mapping(format!("join `{data_set}` has no filter decomposition"))
        })?;

        if self.first.attribute(&on.first.qualified_name()).is_none() {
            return Err(Error::invalid_mapping(format!(
                "join attribute `{}` does not belong to `{}`",
                on.first.qualified_name(),
                self.first.data_set()
            )));
        }
        if self.second.attribute(&on.second.qualified_name()).is_none() {
            return Err(Error::invalid_mapping(format!(
                "join attribute `{}` does not belong to `{}`",
                on.second.qualified_name(),
                self.second.data_set()
            )));
        }

        let many = matches!(composer, Composer::Many { .. });
        let sides = [self.first.cardinality(), self.second.cardinality()];
        let nested = sides.iter().any(Option::is_some);

        if nested && (many || sides.contains(&Some(Cardinality::Many))) {
            return Err(Error::invalid_mapping(format!(
                "join `{data_set}`: only one-to-one joins can be nested"
            )));
        }

        let first_sets = self.first.source()?;
        let second_sets = self.second.source()?;
        let first_sets = first_sets.data_sets();
        if let Some(dup) = second_sets
            .data_sets()
            .into_iter()
            .find(|name| first_sets.contains(name))
        {
            return Err(Error::invalid_mapping(format!(
                "join `{data_set}` joins data set `{dup}` more than once"
            )));
        }

        Ok(JoinEntityMapper {
            first: self.first,
            second: self.second,
            data_set,
            on,
            extra: self.extra,
            kind: self.kind,
            composer,
            decompose_filter,
            decompose_ordering: self.decompose_ordering,
            decompose_grouping: self.decompose_grouping,
        })
    }
}

fn key_reader<V: Primitive>() -> KeyReader {
    Arc::new(|source, key| {
        Ok(V::read(source, key)?
            .map(Primitive::into_value)
            .filter(|value| !value.is_null()))
    })
}

impl<A, B, R, F, FA, FB> Mapper<R, F> for JoinEntityMapper<A, B, R, F, FA, FB>
where
    A: 'static,
    B: 'static,
    R: 'static,
    F: 'static,
    FA: 'static,
    FB: 'static,
{
    fn data_set(&self) -> &str {
        &self.data_set
    }

    fn cardinality(&self) -> Option<Cardinality> {
        Some(match self.composer {
            Composer::One(_) => Cardinality::One,
            Composer::Many { .. } => Cardinality::Many,
        })
    }

    fn source(&self) -> Result<Source> {
        if let Composer::Many { .. } = self.composer {
            return Err(Error::invalid_mapping(format!(
                "one-to-many join `{}` cannot be read as a single source",
                self.data_set
            )));
        }

        Ok(Source::Join(Box::new(Join {
            left: self.first.source()?,
            right: self.second.source()?,
            kind: self.kind,
            on: (self.on.first.clone(), self.on.second.clone()),
            extra: Condition::all(self.extra.iter().cloned()),
        })))
    }

    fn columns(&self, alias: &str, dst: &mut Vec<Column>) {
        self.first
            .columns(&format!("{alias}{}", self.first.alias_prefix()), dst);
        self.second
            .columns(&format!("{alias}{}", self.second.alias_prefix()), dst);
    }

    fn attribute(&self, qualified_name: &str) -> Option<AttributeRef> {
        self.first
            .attribute(qualified_name)
            .or_else(|| self.second.attribute(qualified_name))
    }

    fn primary_attributes(&self) -> Vec<AttributeRef> {
        let mut primary = self.first.primary_attributes();
        primary.extend(self.second.primary_attributes());
        primary
    }

    fn compose_filter_conditions(&self, filter: &F) -> Vec<Condition> {
        let (first, second) = (self.decompose_filter)(filter);

        let mut conditions = first
            .map(|filter| self.first.compose_filter_conditions(&filter))
            .unwrap_or_default();
        if let Some(filter) = second {
            conditions.extend(self.second.compose_filter_conditions(&filter));
        }
        conditions
    }

    fn build_entity(&self, source: &dyn AttributeSource, alias: &str) -> Result<Option<R>> {
        let Composer::One(compose) = &self.composer else {
            return Err(Error::invalid_mapping(format!(
                "one-to-many join `{}` cannot be built from a single record",
                self.data_set
            )));
        };

        let first_alias = format!("{alias}{}", self.first.alias_prefix());
        let Some(first) = self.first.build_entity(source, &first_alias)? else {
            return Ok(None);
        };

        let second_alias = format!("{alias}{}", self.second.alias_prefix());
        let second = self.second.build_entity(source, &second_alias)?;

        Ok(Some(compose(first, second)))
    }

    fn fetch(
        &self,
        conn: &mut dyn Connection,
        overview: &Overview<F>,
        extra: Vec<Condition>,
    ) -> Result<Vec<R>> {
        match &self.composer {
            Composer::One(_) => super::fetch(self, conn, overview, extra),
            Composer::Many { compose, clone } => {
                self.fetch_many(conn, overview, extra, compose.as_ref(), *clone)
            }
        }
    }

    /// One-to-many joins count first-side entities.
    fn count(
        &self,
        conn: &mut dyn Connection,
        filter: Option<&F>,
        group: Option<&Group>,
    ) -> Result<u64> {
        match &self.composer {
            Composer::One(_) => super::count(self, conn, filter, group),
            Composer::Many { .. } => {
                let (filter, _) = self.split_filter(filter);
                let (group, _) = self.split_grouping(group);
                self.first.count(conn, filter.as_ref(), group.as_ref())
            }
        }
    }
}

impl<A, B, R, F, FA, FB> fmt::Debug for JoinEntityMapper<A, B, R, F, FA, FB> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinEntityMapper")
            .field("data_set", &self.data_set)
            .field("kind", &self.kind)
            .field("on", &(&self.on.first, &self.on.second))
            .finish()
    }
}
