use crate::Result;

use tessera_core::{driver::Driver, Error};

use std::sync::Arc;
use url::Url;

pub(super) fn driver(url: &str) -> Result<Arc<dyn Driver>> {
    let parsed = Url::parse(url)
        .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url}")))?;

    match parsed.scheme() {
        "sqlite" => connect_sqlite(url),
        "mongodb" => connect_mongodb(url),
        scheme => Err(Error::invalid_connection_url(format!(
            "unsupported database; scheme={scheme}; url={url}"
        ))),
    }
}

#[cfg(feature = "sqlite")]
fn connect_sqlite(url: &str) -> Result<Arc<dyn Driver>> {
    Ok(Arc::new(tessera_driver_sqlite::Sqlite::new(url)?))
}

#[cfg(not(feature = "sqlite"))]
fn connect_sqlite(_url: &str) -> Result<Arc<dyn Driver>> {
    Err(Error::invalid_connection_url("`sqlite` feature not enabled"))
}

#[cfg(feature = "mongodb")]
fn connect_mongodb(url: &str) -> Result<Arc<dyn Driver>> {
    Ok(Arc::new(tessera_driver_mongodb::MongoDb::connect(url)?))
}

#[cfg(not(feature = "mongodb"))]
fn connect_mongodb(_url: &str) -> Result<Arc<dyn Driver>> {
    Err(Error::invalid_connection_url("`mongodb` feature not enabled"))
}
