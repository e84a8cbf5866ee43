use crate::value::to_bson;

use bson::{doc, Bson, Document};
use tessera_core::{
    stmt::{AttributeRef, Condition, Raw, Value},
    Error, Result,
};

/// Translates conditions into query documents for one collection.
///
/// Attributes of the root collection are addressed by their bare name.
/// Attributes of a joined collection live under an embedded document named
/// after that collection, so they are addressed as `collection.name`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Filter<'a> {
    root: &'a str,
}

impl<'a> Filter<'a> {
    pub(crate) fn new(root: &'a str) -> Filter<'a> {
        Filter { root }
    }

    pub(crate) fn path(&self, attribute: &AttributeRef) -> String {
        match attribute.prefix.as_deref() {
            Some(prefix) if prefix != self.root => format!("{prefix}.{}", attribute.name),
            _ => attribute.name.clone(),
        }
    }

    /// `$path`, the expression form of a field path.
    pub(crate) fn field(&self, attribute: &AttributeRef) -> String {
        format!("${}", self.path(attribute))
    }

    /// An absent condition matches every document.
    pub(crate) fn document(&self, condition: Option<&Condition>) -> Result<Document> {
        match condition {
            Some(condition) => self.condition(condition),
            None => Ok(Document::new()),
        }
    }

    pub(crate) fn condition(&self, condition: &Condition) -> Result<Document> {
        Ok(match condition {
            Condition::Eq(attribute, Value::Null) => doc! { (self.path(attribute)): Bson::Null },
            Condition::Eq(attribute, value) => self.compare(attribute, "$eq", value),
            Condition::Lt(attribute, value) => self.compare(attribute, "$lt", value),
            Condition::Lte(attribute, value) => self.compare(attribute, "$lte", value),
            Condition::Gt(attribute, value) => self.compare(attribute, "$gt", value),
            Condition::Gte(attribute, value) => self.compare(attribute, "$gte", value),
            Condition::Contains(attribute, needle) => doc! {
                (self.path(attribute)): { "$regex": regex::escape(needle) }
            },
            Condition::In(attribute, values) => {
                let values: Vec<Bson> = values.iter().map(to_bson).collect();
                doc! { (self.path(attribute)): { "$in": values } }
            }
            Condition::EqAttributes(lhs, rhs) => doc! {
                "$expr": { "$eq": [self.field(lhs), self.field(rhs)] }
            },
            Condition::And(lhs, rhs) => doc! {
                "$and": [self.condition(lhs)?, self.condition(rhs)?]
            },
            Condition::Or(lhs, rhs) => doc! {
                "$or": [self.condition(lhs)?, self.condition(rhs)?]
            },
            Condition::Raw(Raw::Document(json)) => bson::to_document(json).map_err(|err| {
                Error::invalid_argument(format!("raw document filter is not a document: {err}"))
            })?,
            Condition::Raw(Raw::Sql { .. }) => {
                return Err(Error::unsupported_feature(
                    "SQL fragments cannot be used as document filters",
                ))
            }
        })
    }

    fn compare(&self, attribute: &AttributeRef, op: &str, value: &Value) -> Document {
        doc! { (self.path(attribute)): { (op): to_bson(value) } }
    }
}
