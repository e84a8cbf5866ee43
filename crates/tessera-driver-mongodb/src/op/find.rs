use crate::{pipeline, value::DocumentSource, Store};
use tessera_core::{
    driver::{operation::Find, Response},
    mapper::AttributeSource,
    Result,
};

pub(crate) fn execute(store: &dyn Store, op: Find) -> Result<Response> {
    let pipeline = pipeline::find(&op)?;
    let documents = super::run(store, pipeline)?;

    let records = documents
        .into_iter()
        .map(|document| Box::new(DocumentSource(document)) as Box<dyn AttributeSource>)
        .collect();
    Ok(Response::records(records))
}
