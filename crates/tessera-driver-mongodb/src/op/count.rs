use crate::{filter::Filter, pipeline, Store};
use bson::Bson;
use tessera_core::{
    driver::{operation::Count, Response},
    Error, Result,
};
use tracing::debug;

pub(crate) fn execute(store: &dyn Store, op: Count) -> Result<Response> {
    let Some(pipeline) = pipeline::count(&op)? else {
        let collection = op.source.root();
        let filter = Filter::new(collection).document(op.filter.as_ref())?;

        debug!(db.collection = collection, filter = %filter, "count_documents");
        return Ok(Response::count(store.count_documents(collection, filter)?));
    };

    // `$count` emits nothing when no document reaches it.
    let count = match super::run(store, pipeline)?.first() {
        None => 0,
        Some(document) => match document.get(pipeline::COUNT) {
            Some(Bson::Int32(count)) => *count as u64,
            Some(Bson::Int64(count)) => *count as u64,
            other => {
                return Err(Error::from_args(format_args!(
                    "unexpected count result: {other:?}"
                )))
            }
        },
    };

    Ok(Response::count(count))
}
