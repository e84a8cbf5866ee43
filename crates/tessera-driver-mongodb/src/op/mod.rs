mod aggregate;
mod count;
mod delete;
mod find;
mod insert;
mod update;

use crate::{index::Indexes, Store};
use tessera_core::{
    driver::{operation::Operation, Response},
    Result,
};

pub(crate) fn execute_operation(
    store: &dyn Store,
    indexes: &Indexes,
    op: Operation,
) -> Result<Response> {
    match op {
        Operation::Insert(op) => insert::execute(store, indexes, op),
        Operation::Update(op) => update::execute(store, op),
        Operation::Delete(op) => delete::execute(store, op),
        Operation::Find(op) => find::execute(store, op),
        Operation::Count(op) => count::execute(store, op),
        Operation::Aggregate(op) => aggregate::execute(store, op),
    }
}

fn run(store: &dyn Store, pipeline: crate::pipeline::Pipeline) -> Result<Vec<bson::Document>> {
    tracing::debug!(
        db.collection = %pipeline.collection,
        pipeline = ?pipeline.stages,
        "aggregate"
    );
    store.aggregate(&pipeline.collection, pipeline.stages)
}
