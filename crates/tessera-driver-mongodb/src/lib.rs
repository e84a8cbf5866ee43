mod filter;
mod index;
mod op;
mod pipeline;

mod store;
pub use store::{DatabaseStore, Store};

pub mod value;

use mongodb::sync::Client;
use std::sync::Arc;
use tessera_core::{
    driver::{operation::Operation, Capability, Driver, Response},
    Error, Result,
};
use url::Url;

/// Database used when the connection URL names none.
const DEFAULT_DATABASE: &str = "tessera";

#[derive(Debug, Clone)]
pub struct MongoDb {
    store: Arc<dyn Store>,
    indexes: index::Indexes,
}

impl MongoDb {
    /// Create a driver over an arbitrary store.
    pub fn new(store: impl Store) -> Self {
        Self {
            store: Arc::new(store),
            indexes: index::Indexes::default(),
        }
    }

    /// Connect to the server named by a `mongodb://` URL. The URL path
    /// selects the database.
    pub fn connect(url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url}")))?;

        if parsed.scheme() != "mongodb" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `mongodb` scheme; url={url}"
            )));
        }

        let client = Client::with_uri_str(parsed.as_str()).map_err(Error::driver)?;

        let db_name = match parsed.path().trim_start_matches('/') {
            "" => DEFAULT_DATABASE,
            name => name,
        };

        Ok(Self::new(DatabaseStore::new(client.database(db_name))))
    }
}

impl Driver for MongoDb {
    fn capability(&self) -> &'static Capability {
        &Capability::DOCUMENT
    }

    fn connect(&self) -> Result<Box<dyn tessera_core::Connection>> {
        Ok(Box::new(Connection {
            store: self.store.clone(),
            indexes: self.indexes.clone(),
        }))
    }
}

/// Every statement commits on its own; transaction control is a no-op.
#[derive(Debug)]
pub struct Connection {
    store: Arc<dyn Store>,
    indexes: index::Indexes,
}

impl tessera_core::Connection for Connection {
    fn capability(&self) -> &'static Capability {
        &Capability::DOCUMENT
    }

    fn exec(&mut self, op: Operation) -> Result<Response> {
        op::execute_operation(&*self.store, &self.indexes, op)
    }

    fn is_autocommit(&self) -> bool {
        true
    }

    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        Ok(())
    }
}
