use crate::{filter::Filter, value, Store};
use bson::{doc, Document};
use tessera_core::{
    driver::{operation::Update, Response},
    Error, Result,
};
use tracing::debug;

pub(crate) fn execute(store: &dyn Store, op: Update) -> Result<Response> {
    if op.assignments.is_empty() {
        return Err(Error::invalid_argument("update without assignments"));
    }

    let filter = Filter::new(&op.data_set).document(op.filter.as_ref())?;

    let mut set = Document::new();
    for (attribute, value) in &op.assignments {
        set.insert(attribute.name.as_str(), value::to_bson(value));
    }
    let update = doc! { "$set": set };

    debug!(db.collection = %op.data_set, filter = %filter, update = %update, "update_many");
    let matched = store.update_many(&op.data_set, filter, update)?;
    Ok(Response::count(matched))
}
