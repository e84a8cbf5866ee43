use crate::Store;
use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};
use tessera_core::{stmt::AttributeRef, Result};
use tracing::debug;

/// Collections this driver has already given a unique primary key index.
/// Shared by every connection of one [`MongoDb`](crate::MongoDb).
#[derive(Debug, Default, Clone)]
pub(crate) struct Indexes {
    created: Arc<Mutex<HashSet<String>>>,
}

impl Indexes {
    /// Creates the unique index over `primary_key` the first time
    /// `collection` is written to.
    pub(crate) fn ensure_primary_key(
        &self,
        store: &dyn Store,
        collection: &str,
        primary_key: &[AttributeRef],
    ) -> Result<()> {
        if primary_key.is_empty() {
            return Ok(());
        }

        let mut created = self.created.lock().unwrap_or_else(PoisonError::into_inner);
        if created.contains(collection) {
            return Ok(());
        }

        let fields: Vec<String> = primary_key.iter().map(|attr| attr.name.clone()).collect();
        debug!(db.collection = %collection, fields = ?fields, "create_unique_index");
        store.create_unique_index(collection, &fields)?;

        created.insert(collection.to_string());
        Ok(())
    }
}
