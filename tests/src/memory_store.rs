//! An in-process [`Store`] that evaluates the filters and pipelines the
//! document driver emits, so document scenarios run without a server.
//!
//! Only the operators the driver produces are understood; anything else is
//! reported as an error rather than silently ignored.

use bson::{oid::ObjectId, Bson, Document};
use regex::Regex;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use std::{cmp::Ordering, collections::HashMap, sync::Mutex};
use tessera_core::{bail, err, Error, Result};
use tessera_driver_mongodb::{value::decimal128, Store};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    unique_indexes: Mutex<HashMap<String, Vec<Vec<String>>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Every stored document of `collection`, in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// The field lists of every unique index on `collection`.
    pub fn unique_indexes(&self, collection: &str) -> Vec<Vec<String>> {
        self.unique_indexes
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn with_collection<T>(&self, name: &str, f: impl FnOnce(&mut Vec<Document>) -> T) -> T {
        let mut collections = self.collections.lock().unwrap();
        f(collections.entry(name.to_string()).or_default())
    }
}

impl Store for MemoryStore {
    fn aggregate(&self, collection: &str, pipeline: Vec<Document>) -> Result<Vec<Document>> {
        let documents = self.documents(collection);
        run_pipeline(self, documents, &pipeline)
    }

    fn count_documents(&self, collection: &str, filter: Document) -> Result<u64> {
        let mut count = 0;
        for document in self.documents(collection) {
            if matches(&document, &filter)? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn create_unique_index(&self, collection: &str, fields: &[String]) -> Result<()> {
        let mut indexes = self.unique_indexes.lock().unwrap();
        let indexes = indexes.entry(collection.to_string()).or_default();
        if !indexes.iter().any(|index| index == fields) {
            indexes.push(fields.to_vec());
        }
        Ok(())
    }

    fn insert_one(&self, collection: &str, mut document: Document) -> Result<()> {
        if !document.contains_key("_id") {
            document.insert("_id", ObjectId::new());
        }

        let indexes = self.unique_indexes(collection);
        self.with_collection(collection, |documents| {
            for fields in &indexes {
                let duplicate = documents.iter().any(|existing| {
                    fields.iter().all(|field| {
                        equal(get_path(existing, field), get_path(&document, field))
                    })
                });
                if duplicate {
                    return Err(Error::driver(std::io::Error::other(format!(
                        "duplicate key in `{collection}` over {fields:?}"
                    ))));
                }
            }
            documents.push(document);
            Ok(())
        })
    }

    fn update_many(&self, collection: &str, filter: Document, update: Document) -> Result<u64> {
        let set = match update.get("$set") {
            Some(Bson::Document(set)) if update.len() == 1 => set.clone(),
            _ => bail!("unsupported update document: {update}"),
        };

        self.with_collection(collection, |documents| {
            let mut matched = 0;
            for document in documents.iter_mut() {
                if matches(document, &filter)? {
                    matched += 1;
                    for (key, value) in &set {
                        document.insert(key.clone(), value.clone());
                    }
                }
            }
            Ok(matched)
        })
    }

    fn delete_many(&self, collection: &str, filter: Document) -> Result<u64> {
        self.with_collection(collection, |documents| {
            let before = documents.len();
            let mut kept = Vec::with_capacity(before);
            for document in documents.drain(..) {
                if !matches(&document, &filter)? {
                    kept.push(document);
                }
            }
            *documents = kept;
            Ok((before - documents.len()) as u64)
        })
    }
}

fn run_pipeline(
    store: &MemoryStore,
    mut documents: Vec<Document>,
    pipeline: &[Document],
) -> Result<Vec<Document>> {
    for stage in pipeline {
        let Some((name, body)) = stage.iter().next().filter(|_| stage.len() == 1) else {
            bail!("malformed stage: {stage}");
        };

        documents = match (name.as_str(), body) {
            ("$match", Bson::Document(filter)) => {
                let mut kept = vec![];
                for document in documents {
                    if matches(&document, filter)? {
                        kept.push(document);
                    }
                }
                kept
            }
            ("$lookup", Bson::Document(body)) => lookup(store, documents, body)?,
            ("$unwind", Bson::Document(body)) => unwind(documents, body)?,
            ("$group", Bson::Document(body)) => group(documents, body)?,
            ("$replaceRoot", Bson::Document(body)) => {
                let root = body.get("newRoot").ok_or_else(|| err!("missing newRoot"))?;
                documents
                    .iter()
                    .map(|document| match eval(document, root)? {
                        Some(Bson::Document(root)) => Ok(root),
                        other => Err(err!("newRoot is not a document: {other:?}")),
                    })
                    .collect::<Result<_>>()?
            }
            ("$sort", Bson::Document(body)) => {
                documents.sort_by(|a, b| {
                    for (path, direction) in body {
                        let ordering = order(get_path(a, path), get_path(b, path));
                        let descending = matches!(direction, Bson::Int32(-1) | Bson::Int64(-1));
                        let ordering = if descending { ordering.reverse() } else { ordering };
                        if ordering != Ordering::Equal {
                            return ordering;
                        }
                    }
                    Ordering::Equal
                });
                documents
            }
            ("$skip", count) => documents.into_iter().skip(as_usize(count)?).collect(),
            ("$limit", count) => documents.into_iter().take(as_usize(count)?).collect(),
            ("$project", Bson::Document(body)) => documents
                .iter()
                .map(|document| project(document, body))
                .collect::<Result<_>>()?,
            ("$count", Bson::String(field)) => match documents.len() {
                0 => vec![],
                n => {
                    let mut count = Document::new();
                    count.insert(field.clone(), n as i32);
                    vec![count]
                }
            },
            _ => bail!("unsupported stage: {stage}"),
        };
    }

    Ok(documents)
}

fn lookup(store: &MemoryStore, documents: Vec<Document>, body: &Document) -> Result<Vec<Document>> {
    let from = body.get_str("from").map_err(Error::driver)?;
    let local = body.get_str("localField").map_err(Error::driver)?;
    let foreign = body.get_str("foreignField").map_err(Error::driver)?;
    let field = body.get_str("as").map_err(Error::driver)?;
    let pipeline = match body.get("pipeline") {
        Some(Bson::Array(stages)) => stages
            .iter()
            .map(|stage| match stage {
                Bson::Document(stage) => Ok(stage.clone()),
                other => Err(err!("malformed lookup stage: {other}")),
            })
            .collect::<Result<Vec<_>>>()?,
        _ => vec![],
    };

    let candidates = store.documents(from);

    documents
        .into_iter()
        .map(|mut document| {
            let key = get_path(&document, local);
            let joined: Vec<Document> = candidates
                .iter()
                .filter(|candidate| equal(key, get_path(candidate, foreign)))
                .cloned()
                .collect();
            let joined = run_pipeline(store, joined, &pipeline)?;

            document.insert(
                field,
                joined.into_iter().map(Bson::Document).collect::<Vec<_>>(),
            );
            Ok(document)
        })
        .collect()
}

fn unwind(documents: Vec<Document>, body: &Document) -> Result<Vec<Document>> {
    let path = body.get_str("path").map_err(Error::driver)?;
    let field = path
        .strip_prefix('$')
        .ok_or_else(|| err!("unwind path must start with `$`: {path}"))?;
    let preserve = body
        .get_bool("preserveNullAndEmptyArrays")
        .unwrap_or(false);

    let mut unwound = vec![];
    for document in documents {
        let elements = match document.get(field) {
            Some(Bson::Array(elements)) => elements.clone(),
            Some(Bson::Null) | None => vec![],
            Some(other) => vec![other.clone()],
        };

        if elements.is_empty() {
            if preserve {
                let mut document = document;
                document.remove(field);
                unwound.push(document);
            }
            continue;
        }

        for element in elements {
            let mut copy = document.clone();
            copy.insert(field, element);
            unwound.push(copy);
        }
    }
    Ok(unwound)
}

enum Accumulator {
    First(Option<Bson>),
    Sum(Number),
    Min(Option<Bson>),
    Max(Option<Bson>),
    Avg(Number, usize),
}

fn group(documents: Vec<Document>, body: &Document) -> Result<Vec<Document>> {
    let id = body.get("_id").ok_or_else(|| err!("$group without _id"))?;

    let mut groups: Vec<(Bson, Vec<Accumulator>)> = vec![];

    for document in &documents {
        let key = eval(document, id)?.unwrap_or(Bson::Null);
        let index = match groups.iter().position(|(existing, _)| *existing == key) {
            Some(index) => index,
            None => {
                let accumulators = body
                    .iter()
                    .filter(|(field, _)| *field != "_id")
                    .map(|(_, accumulator)| new_accumulator(accumulator))
                    .collect::<Result<_>>()?;
                groups.push((key, accumulators));
                groups.len() - 1
            }
        };

        let operands = body.iter().filter(|(field, _)| *field != "_id");
        for ((_, accumulator), state) in operands.zip(groups[index].1.iter_mut()) {
            let Bson::Document(accumulator) = accumulator else {
                unreachable!("checked by new_accumulator")
            };
            let Some((_, operand)) = accumulator.iter().next() else {
                unreachable!("checked by new_accumulator")
            };
            accumulate(state, eval(document, operand)?);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, accumulators)| {
            let mut document = Document::new();
            document.insert("_id", key);
            let fields = body.keys().filter(|field| *field != "_id");
            for (field, accumulator) in fields.zip(accumulators) {
                document.insert(field.clone(), finish(accumulator));
            }
            document
        })
        .collect())
}

fn new_accumulator(body: &Bson) -> Result<Accumulator> {
    let Bson::Document(body) = body else {
        bail!("malformed accumulator: {body}");
    };
    let Some((op, _)) = body.iter().next().filter(|_| body.len() == 1) else {
        bail!("malformed accumulator: {body}");
    };

    Ok(match op.as_str() {
        "$first" => Accumulator::First(None),
        "$sum" => Accumulator::Sum(Number::Int32(0)),
        "$min" => Accumulator::Min(None),
        "$max" => Accumulator::Max(None),
        "$avg" => Accumulator::Avg(Number::Int32(0), 0),
        _ => bail!("unsupported accumulator: {op}"),
    })
}

fn accumulate(state: &mut Accumulator, value: Option<Bson>) {
    match state {
        Accumulator::First(first) => {
            if first.is_none() {
                *first = Some(value.unwrap_or(Bson::Null));
            }
        }
        Accumulator::Sum(sum) => {
            if let Some(number) = value.as_ref().and_then(Number::from_bson) {
                *sum = sum.add(number);
            }
        }
        Accumulator::Avg(sum, count) => {
            if let Some(number) = value.as_ref().and_then(Number::from_bson) {
                *sum = sum.add(number);
                *count += 1;
            }
        }
        Accumulator::Min(current) => keep_extreme(current, value, Ordering::Less),
        Accumulator::Max(current) => keep_extreme(current, value, Ordering::Greater),
    }
}

/// Replaces `current` when `value` orders `wanted` relative to it. Nulls
/// never participate.
fn keep_extreme(current: &mut Option<Bson>, value: Option<Bson>, wanted: Ordering) {
    let Some(value) = value.filter(|value| !matches!(value, Bson::Null)) else {
        return;
    };

    let replace = match current.as_ref() {
        None => true,
        Some(existing) => order(Some(&value), Some(existing)) == wanted,
    };
    if replace {
        *current = Some(value);
    }
}

fn finish(accumulator: Accumulator) -> Bson {
    match accumulator {
        Accumulator::First(value) => value.unwrap_or(Bson::Null),
        Accumulator::Sum(sum) => sum.into_bson(),
        Accumulator::Min(value) | Accumulator::Max(value) => value.unwrap_or(Bson::Null),
        Accumulator::Avg(_, 0) => Bson::Null,
        Accumulator::Avg(Number::Decimal(sum), count) => {
            Bson::Decimal128(decimal128::encode(sum / Decimal::from(count as u64)))
        }
        Accumulator::Avg(sum, count) => Bson::Double(sum.as_f64() / count as f64),
    }
}

fn project(document: &Document, body: &Document) -> Result<Document> {
    let mut projected = Document::new();

    for (field, expr) in body {
        match expr {
            Bson::Int32(0) | Bson::Boolean(false) if field == "_id" => {}
            Bson::Int32(1) | Bson::Boolean(true) => {
                if let Some(value) = get_path(document, field) {
                    projected.insert(field.clone(), value.clone());
                }
            }
            expr => {
                if let Some(value) = eval(document, expr)? {
                    projected.insert(field.clone(), value);
                }
            }
        }
    }

    Ok(projected)
}

/// Evaluates an aggregation expression. `None` is a missing field.
fn eval(document: &Document, expr: &Bson) -> Result<Option<Bson>> {
    match expr {
        Bson::String(s) if s == "$$ROOT" => Ok(Some(Bson::Document(document.clone()))),
        Bson::String(s) if s.starts_with('$') => Ok(get_path(document, &s[1..]).cloned()),
        Bson::Document(body) => {
            let operator = body
                .iter()
                .next()
                .filter(|(key, _)| body.len() == 1 && key.starts_with('$'));

            match operator {
                Some((op, Bson::Array(operands))) if op == "$eq" && operands.len() == 2 => {
                    let lhs = eval(document, &operands[0])?;
                    let rhs = eval(document, &operands[1])?;
                    Ok(Some(Bson::Boolean(equal(lhs.as_ref(), rhs.as_ref()))))
                }
                Some((op, _)) => bail!("unsupported expression operator: {op}"),
                None => {
                    let mut evaluated = Document::new();
                    for (key, expr) in body {
                        evaluated.insert(key.clone(), eval(document, expr)?.unwrap_or(Bson::Null));
                    }
                    Ok(Some(Bson::Document(evaluated)))
                }
            }
        }
        literal => Ok(Some(literal.clone())),
    }
}

fn matches(document: &Document, filter: &Document) -> Result<bool> {
    for (key, condition) in filter {
        let matched = match key.as_str() {
            "$and" => all_of(document, condition)?.iter().all(|m| *m),
            "$or" => all_of(document, condition)?.iter().any(|m| *m),
            "$nor" => !all_of(document, condition)?.iter().any(|m| *m),
            "$expr" => matches!(eval(document, condition)?, Some(Bson::Boolean(true))),
            path => field_matches(get_path(document, path), condition)?,
        };

        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn all_of(document: &Document, conditions: &Bson) -> Result<Vec<bool>> {
    let Bson::Array(conditions) = conditions else {
        bail!("logical operator expects an array: {conditions}");
    };

    conditions
        .iter()
        .map(|condition| match condition {
            Bson::Document(filter) => matches(document, filter),
            other => Err(err!("logical operand is not a document: {other}")),
        })
        .collect()
}

fn field_matches(value: Option<&Bson>, condition: &Bson) -> Result<bool> {
    let Bson::Document(operators) = condition else {
        return Ok(equal(value, Some(condition)));
    };
    if !operators.keys().all(|key| key.starts_with('$')) {
        return Ok(equal(value, Some(condition)));
    }

    for (op, operand) in operators {
        let matched = match op.as_str() {
            "$eq" => equal(value, Some(operand)),
            "$ne" => !equal(value, Some(operand)),
            "$lt" => compare(value, operand) == Some(Ordering::Less),
            "$lte" => matches!(compare(value, operand), Some(Ordering::Less | Ordering::Equal)),
            "$gt" => compare(value, operand) == Some(Ordering::Greater),
            "$gte" => matches!(
                compare(value, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            "$in" => match operand {
                Bson::Array(candidates) => candidates
                    .iter()
                    .any(|candidate| equal(value, Some(candidate))),
                other => bail!("$in expects an array: {other}"),
            },
            "$regex" => match (value, operand) {
                (Some(Bson::String(value)), Bson::String(pattern)) => {
                    Regex::new(pattern).map_err(Error::driver)?.is_match(value)
                }
                (_, Bson::String(_)) => false,
                (_, other) => bail!("$regex expects a string: {other}"),
            },
            _ => bail!("unsupported query operator: {op}"),
        };

        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn get_path<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        match current {
            Bson::Document(inner) => current = inner.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Query equality: null matches a missing field, numbers compare by value.
fn equal(lhs: Option<&Bson>, rhs: Option<&Bson>) -> bool {
    match (non_null(lhs), non_null(rhs)) {
        (None, None) => true,
        (Some(lhs), Some(rhs)) => compare(Some(lhs), rhs) == Some(Ordering::Equal),
        _ => false,
    }
}

fn non_null(value: Option<&Bson>) -> Option<&Bson> {
    value.filter(|value| !matches!(value, Bson::Null | Bson::Undefined))
}

/// Comparison within one type bracket; `None` across brackets.
fn compare(lhs: Option<&Bson>, rhs: &Bson) -> Option<Ordering> {
    let lhs = non_null(lhs)?;

    if let (Some(lhs), Some(rhs)) = (Number::from_bson(lhs), Number::from_bson(rhs)) {
        return Some(lhs.cmp(&rhs));
    }

    match (lhs, rhs) {
        (Bson::String(lhs), Bson::String(rhs)) => Some(lhs.cmp(rhs)),
        (Bson::Boolean(lhs), Bson::Boolean(rhs)) => Some(lhs.cmp(rhs)),
        (Bson::DateTime(lhs), Bson::DateTime(rhs)) => Some(lhs.cmp(rhs)),
        (Bson::ObjectId(lhs), Bson::ObjectId(rhs)) => Some(lhs.cmp(rhs)),
        (lhs, rhs) if lhs == rhs => Some(Ordering::Equal),
        _ => None,
    }
}

/// Total order used by `$sort`, `$min` and `$max`.
fn order(lhs: Option<&Bson>, rhs: Option<&Bson>) -> Ordering {
    fn rank(value: Option<&Bson>) -> u8 {
        match non_null(value) {
            None => 0,
            Some(value) if Number::from_bson(value).is_some() => 1,
            Some(Bson::String(_)) => 2,
            Some(Bson::Document(_)) => 3,
            Some(Bson::Array(_)) => 4,
            Some(Bson::ObjectId(_)) => 5,
            Some(Bson::Boolean(_)) => 6,
            Some(Bson::DateTime(_)) => 7,
            Some(_) => 8,
        }
    }

    rank(lhs).cmp(&rank(rhs)).then_with(|| match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => compare(Some(lhs), rhs).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    })
}

fn as_usize(value: &Bson) -> Result<usize> {
    match value {
        Bson::Int32(v) if *v >= 0 => Ok(*v as usize),
        Bson::Int64(v) if *v >= 0 => Ok(*v as usize),
        other => Err(err!("expected a non-negative integer, got {other}")),
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int32(i32),
    Int64(i64),
    Double(f64),
    Decimal(Decimal),
}

impl Number {
    fn from_bson(value: &Bson) -> Option<Number> {
        Some(match value {
            Bson::Int32(v) => Number::Int32(*v),
            Bson::Int64(v) => Number::Int64(*v),
            Bson::Double(v) => Number::Double(*v),
            Bson::Decimal128(v) => Number::Decimal(decimal128::decode(*v)?),
            _ => return None,
        })
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int32(v) => v as f64,
            Number::Int64(v) => v as f64,
            Number::Double(v) => v,
            Number::Decimal(v) => v.to_f64().unwrap_or(f64::NAN),
        }
    }

    fn as_decimal(self) -> Decimal {
        match self {
            Number::Int32(v) => Decimal::from(v),
            Number::Int64(v) => Decimal::from(v),
            Number::Double(v) => Decimal::try_from(v).unwrap_or_default(),
            Number::Decimal(v) => v,
        }
    }

    fn as_i64(self) -> Option<i64> {
        match self {
            Number::Int32(v) => Some(v as i64),
            Number::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// Widens to the larger of the two representations, like the server.
    fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Decimal(_), _) | (_, Number::Decimal(_)) => {
                Number::Decimal(self.as_decimal() + other.as_decimal())
            }
            (Number::Double(_), _) | (_, Number::Double(_)) => {
                Number::Double(self.as_f64() + other.as_f64())
            }
            (Number::Int32(lhs), Number::Int32(rhs)) => match lhs.checked_add(rhs) {
                Some(sum) => Number::Int32(sum),
                None => Number::Int64(lhs as i64 + rhs as i64),
            },
            _ => Number::Int64(self.as_i64().unwrap_or(0) + other.as_i64().unwrap_or(0)),
        }
    }

    fn cmp(&self, other: &Number) -> Ordering {
        match (self.as_i64(), other.as_i64()) {
            (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
            _ => match (self, other) {
                (Number::Decimal(_), _) | (_, Number::Decimal(_)) => {
                    self.as_decimal().cmp(&other.as_decimal())
                }
                _ => self
                    .as_f64()
                    .partial_cmp(&other.as_f64())
                    .unwrap_or(Ordering::Equal),
            },
        }
    }

    fn into_bson(self) -> Bson {
        match self {
            Number::Int32(v) => Bson::Int32(v),
            Number::Int64(v) => Bson::Int64(v),
            Number::Double(v) => Bson::Double(v),
            Number::Decimal(v) => Bson::Decimal128(decimal128::encode(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        for (id, name, price) in [("a", "Lamp", "10.50"), ("b", "Desk", "99.00"), ("c", "Chair", "20.25")] {
            let price = decimal128::encode(price.parse().unwrap());
            store
                .insert_one("products", doc! { "id": id, "name": name, "price": price })
                .unwrap();
        }
        store
    }

    #[test]
    fn null_matches_missing_field() {
        let store = store();
        assert_eq!(store.count_documents("products", doc! { "description": Bson::Null }).unwrap(), 3);
        assert_eq!(
            store.count_documents("products", doc! { "description": { "$ne": Bson::Null } }).unwrap(),
            0
        );
    }

    #[test]
    fn decimal_sum_keeps_scale() {
        let store = store();
        let result = store
            .aggregate(
                "products",
                vec![
                    doc! { "$group": { "_id": Bson::Null, "value": { "$sum": "$price" } } },
                    doc! { "$project": { "_id": 0, "value": 1 } },
                ],
            )
            .unwrap();

        let Some(Bson::Decimal128(sum)) = result[0].get("value") else {
            panic!("expected a Decimal128 sum: {result:?}");
        };
        assert_eq!(decimal128::decode(*sum).unwrap().to_string(), "129.75");
    }

    #[test]
    fn decimals_compare_numerically() {
        let store = store();
        let over = |price: &str| {
            let price = decimal128::encode(price.parse().unwrap());
            store
                .count_documents("products", doc! { "price": { "$gt": price } })
                .unwrap()
        };

        assert_eq!(over("9.99"), 3);
        assert_eq!(over("20.25"), 1);
        assert_eq!(over("100"), 0);
    }

    #[test]
    fn unique_index_rejects_repeated_key() {
        let store = store();
        store.create_unique_index("products", &["id".to_string()]).unwrap();
        store.create_unique_index("products", &["id".to_string()]).unwrap();
        assert_eq!(store.unique_indexes("products").len(), 1);

        let err = store
            .insert_one("products", doc! { "id": "a", "name": "Other lamp" })
            .unwrap_err();
        assert!(err.is_driver());
        store.insert_one("products", doc! { "id": "d", "name": "Rug" }).unwrap();
        assert_eq!(store.documents("products").len(), 4);
    }

    #[test]
    fn sort_skip_limit_project() {
        let store = store();
        let result = store
            .aggregate(
                "products",
                vec![
                    doc! { "$sort": { "name": 1 } },
                    doc! { "$skip": 1_i64 },
                    doc! { "$limit": 1_i64 },
                    doc! { "$project": { "_id": 0, "products_name": "$name" } },
                ],
            )
            .unwrap();

        assert_eq!(result, vec![doc! { "products_name": "Desk" }]);
    }

    #[test]
    fn unknown_operator_is_an_error() {
        let store = store();
        assert!(store
            .count_documents("products", doc! { "name": { "$exists": true } })
            .is_err());
    }
}
