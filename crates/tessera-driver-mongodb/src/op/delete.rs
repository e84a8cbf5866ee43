use crate::{filter::Filter, Store};
use tessera_core::{
    driver::{operation::Delete, Response},
    Result,
};
use tracing::debug;

pub(crate) fn execute(store: &dyn Store, op: Delete) -> Result<Response> {
    let filter = Filter::new(&op.data_set).document(op.filter.as_ref())?;

    debug!(db.collection = %op.data_set, filter = %filter, "delete_many");
    let deleted = store.delete_many(&op.data_set, filter)?;
    Ok(Response::count(deleted))
}
