use crate::filter::Filter;

use bson::{doc, Bson, Document};
use tessera_core::{
    driver::operation::{Aggregate, Count, Find, Join, Source},
    query::Aggregation,
    stmt::{AttributeRef, Condition},
    Error, JoinKind, Result,
};

/// An aggregation pipeline over the root collection of a source.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Pipeline {
    pub(crate) collection: String,
    pub(crate) stages: Vec<Document>,
}

impl Pipeline {
    fn new(source: &Source, filter: Option<&Condition>) -> Result<Pipeline> {
        let mut pipeline = Pipeline {
            collection: source.root().to_string(),
            stages: vec![],
        };

        pipeline.join(source)?;

        let filter = Filter::new(&pipeline.collection).document(filter)?;
        if !filter.is_empty() {
            pipeline.stages.push(doc! { "$match": filter });
        }

        Ok(pipeline)
    }

    fn filter(&self) -> Filter<'_> {
        Filter::new(&self.collection)
    }

    /// Embeds each joined collection under its own name. Joins are left-deep,
    /// so the right side of every join is a single collection.
    fn join(&mut self, source: &Source) -> Result<()> {
        let Source::Join(join) = source else {
            return Ok(());
        };

        self.join(&join.left)?;

        let Source::Table(from) = &join.right else {
            return Err(Error::unsupported_feature(
                "document joins require a single collection on the right side",
            ));
        };

        let preserve = match join.kind {
            JoinKind::Inner => false,
            JoinKind::Left => true,
            JoinKind::Right => {
                return Err(Error::unsupported_feature(
                    "right joins are not supported by document stores",
                ))
            }
        };

        let lookup = self.lookup(join, from)?;
        self.stages.push(doc! { "$lookup": lookup });
        self.stages.push(doc! {
            "$unwind": {
                "path": format!("${from}"),
                "preserveNullAndEmptyArrays": preserve,
            }
        });
        Ok(())
    }

    fn lookup(&self, join: &Join, from: &str) -> Result<Document> {
        let (local, foreign) = &join.on;

        let mut lookup = doc! {
            "from": from,
            "localField": self.filter().path(local),
            "foreignField": foreign.name.as_str(),
            "as": from,
        };

        // Extra on-conditions are evaluated inside the joined collection.
        if let Some(extra) = &join.extra {
            let extra = Filter::new(from).condition(extra)?;
            lookup.insert("pipeline", vec![doc! { "$match": extra }]);
        }

        Ok(lookup)
    }

    /// Keeps the first document of every group.
    fn group_first(&mut self, group_by: &[AttributeRef]) {
        if group_by.is_empty() {
            return;
        }

        let id = self.group_id(group_by);
        self.stages.push(doc! {
            "$group": { "_id": id, "document": { "$first": "$$ROOT" } }
        });
        self.stages
            .push(doc! { "$replaceRoot": { "newRoot": "$document" } });
    }

    fn group_id(&self, group_by: &[AttributeRef]) -> Bson {
        if group_by.is_empty() {
            return Bson::Null;
        }

        let mut id = Document::new();
        for (i, attribute) in group_by.iter().enumerate() {
            id.insert(Aggregate::group_key(i), self.filter().field(attribute));
        }
        Bson::Document(id)
    }
}

pub(crate) fn find(find: &Find) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new(&find.source, find.filter.as_ref())?;
    pipeline.group_first(&find.group_by);

    if !find.order_by.is_empty() {
        let mut sort = Document::new();
        for order in &find.order_by {
            let direction = if order.descending { -1 } else { 1 };
            let path = pipeline.filter().path(&order.attribute);
            sort.insert(path, direction);
        }
        pipeline.stages.push(doc! { "$sort": sort });
    }

    if let Some(offset) = find.offset {
        pipeline.stages.push(doc! { "$skip": offset as i64 });
    }
    if let Some(limit) = find.limit {
        pipeline.stages.push(doc! { "$limit": limit as i64 });
    }

    let mut project = doc! { "_id": 0 };
    for column in &find.columns {
        let field = pipeline.filter().field(&column.attribute);
        project.insert(column.alias.as_str(), field);
    }
    pipeline.stages.push(doc! { "$project": project });

    Ok(pipeline)
}

/// `None` when a plain `count_documents` on the filter answers the count.
pub(crate) fn count(count: &Count) -> Result<Option<Pipeline>> {
    if !count.source.is_join() && count.group_by.is_empty() {
        return Ok(None);
    }

    let mut pipeline = Pipeline::new(&count.source, count.filter.as_ref())?;
    if !count.group_by.is_empty() {
        let id = pipeline.group_id(&count.group_by);
        pipeline.stages.push(doc! { "$group": { "_id": id } });
    }
    pipeline.stages.push(doc! { "$count": COUNT });

    Ok(Some(pipeline))
}

/// Field the `$count` stage writes its result to.
pub(crate) const COUNT: &str = "count";

pub(crate) fn aggregate(aggregate: &Aggregate) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new(&aggregate.source, aggregate.filter.as_ref())?;

    if let (Aggregation::Count, Some(attribute)) = (aggregate.function, &aggregate.attribute) {
        // Counting an attribute skips documents where it is absent or null.
        let path = pipeline.filter().path(attribute);
        pipeline
            .stages
            .push(doc! { "$match": { (path): { "$ne": Bson::Null } } });
    }

    let id = pipeline.group_id(&aggregate.group_by);
    let accumulator = pipeline.accumulator(aggregate)?;
    pipeline.stages.push(doc! {
        "$group": { "_id": id, (Aggregate::VALUE): accumulator }
    });

    let mut project = doc! { "_id": 0, (Aggregate::VALUE): 1 };
    for i in 0..aggregate.group_by.len() {
        let key = Aggregate::group_key(i);
        let field = format!("$_id.{key}");
        project.insert(key, field);
    }
    pipeline.stages.push(doc! { "$project": project });

    Ok(pipeline)
}

impl Pipeline {
    fn accumulator(&self, aggregate: &Aggregate) -> Result<Document> {
        let Some(attribute) = &aggregate.attribute else {
            return match aggregate.function {
                Aggregation::Count => Ok(doc! { "$sum": 1 }),
                function => Err(Error::invalid_argument(format!(
                    "{} requires an attribute",
                    function.name()
                ))),
            };
        };

        let operand = self.filter().field(attribute);

        Ok(match aggregate.function {
            Aggregation::Count => doc! { "$sum": 1 },
            Aggregation::Sum => doc! { "$sum": operand },
            Aggregation::Min => doc! { "$min": operand },
            Aggregation::Max => doc! { "$max": operand },
            Aggregation::Avg => doc! { "$avg": operand },
        })
    }
}
