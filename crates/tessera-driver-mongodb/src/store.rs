use bson::Document;
use mongodb::{options::IndexOptions, sync::Database, IndexModel};
use std::fmt::Debug;
use tessera_core::{Error, Result};

/// The collection-level commands the driver issues.
///
/// [`MongoDb`](crate::MongoDb) talks to a server through [`DatabaseStore`];
/// any other implementation can stand in for it.
pub trait Store: Debug + Send + Sync + 'static {
    /// Runs an aggregation pipeline and collects every output document.
    fn aggregate(&self, collection: &str, pipeline: Vec<Document>) -> Result<Vec<Document>>;

    fn count_documents(&self, collection: &str, filter: Document) -> Result<u64>;

    /// Fails inserts that repeat an existing combination of `fields`.
    /// Creating an index that already exists succeeds.
    fn create_unique_index(&self, collection: &str, fields: &[String]) -> Result<()>;

    /// Fails when the document violates a unique index.
    fn insert_one(&self, collection: &str, document: Document) -> Result<()>;

    /// Returns the number of matched documents.
    fn update_many(&self, collection: &str, filter: Document, update: Document) -> Result<u64>;

    /// Returns the number of deleted documents.
    fn delete_many(&self, collection: &str, filter: Document) -> Result<u64>;
}

#[derive(Debug)]
pub struct DatabaseStore {
    database: Database,
}

impl DatabaseStore {
    pub fn new(database: Database) -> DatabaseStore {
        DatabaseStore { database }
    }

    fn collection(&self, name: &str) -> mongodb::sync::Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

impl Store for DatabaseStore {
    fn aggregate(&self, collection: &str, pipeline: Vec<Document>) -> Result<Vec<Document>> {
        let cursor = self
            .collection(collection)
            .aggregate(pipeline)
            .run()
            .map_err(Error::driver)?;

        cursor
            .map(|document| document.map_err(Error::driver))
            .collect()
    }

    fn count_documents(&self, collection: &str, filter: Document) -> Result<u64> {
        self.collection(collection)
            .count_documents(filter)
            .run()
            .map_err(Error::driver)
    }

    fn create_unique_index(&self, collection: &str, fields: &[String]) -> Result<()> {
        let mut keys = Document::new();
        for field in fields {
            keys.insert(field.as_str(), 1);
        }

        let mut options = IndexOptions::default();
        options.unique = Some(true);

        self.collection(collection)
            .create_index(IndexModel::builder().keys(keys).options(options).build())
            .run()
            .map_err(Error::driver)?;
        Ok(())
    }

    fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
        self.collection(collection)
            .insert_one(document)
            .run()
            .map_err(Error::driver)?;
        Ok(())
    }

    fn update_many(&self, collection: &str, filter: Document, update: Document) -> Result<u64> {
        let result = self
            .collection(collection)
            .update_many(filter, update)
            .run()
            .map_err(Error::driver)?;
        Ok(result.matched_count)
    }

    fn delete_many(&self, collection: &str, filter: Document) -> Result<u64> {
        let result = self
            .collection(collection)
            .delete_many(filter)
            .run()
            .map_err(Error::driver)?;
        Ok(result.deleted_count)
    }
}
