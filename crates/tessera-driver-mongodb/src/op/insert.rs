use crate::{index::Indexes, value, value::DocumentSource, Store};
use bson::{doc, Document};
use tessera_core::{
    driver::{operation::Insert, Response},
    mapper::AttributeSource,
    Result,
};
use tracing::debug;

pub(crate) fn execute(store: &dyn Store, indexes: &Indexes, op: Insert) -> Result<Response> {
    indexes.ensure_primary_key(store, &op.data_set, &op.primary_key)?;

    let mut document = Document::new();

    for (attribute, value) in &op.values {
        // Absent fields read back as null.
        if !value.is_null() {
            document.insert(attribute.name.as_str(), value::to_bson(value));
        }
    }

    let generated = op.generated_key.as_ref().map(|key| {
        let id = uuid::Uuid::new_v4().to_string();
        document.insert(key.name.as_str(), id.as_str());
        (key.name.as_str(), id)
    });

    debug!(db.collection = %op.data_set, document = %document, "insert_one");
    store.insert_one(&op.data_set, document)?;

    Ok(match generated {
        Some((name, id)) => {
            let record: Box<dyn AttributeSource> = Box::new(DocumentSource(doc! { (name): id }));
            Response::records(vec![record])
        }
        None => Response::count(1),
    })
}
