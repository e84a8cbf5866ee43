mod connect;

use crate::Result;

use tessera_core::driver::{Connection, Driver};

use std::sync::Arc;
use tracing::{trace, warn};

/// A handle to one backend.
///
/// Cloning is cheap; every clone shares the same driver. Each operation run
/// through [`Db::transact`] acquires its own connection and releases it when
/// the operation ends.
#[derive(Debug, Clone)]
pub struct Db {
    driver: Arc<dyn Driver>,
}

impl Db {
    /// Connects to the backend named by `url`. The scheme picks the driver:
    /// `sqlite:` or `mongodb:`.
    pub fn connect(url: &str) -> Result<Db> {
        Ok(Db {
            driver: connect::driver(url)?,
        })
    }

    pub fn new(driver: impl Driver) -> Db {
        Db {
            driver: Arc::new(driver),
        }
    }

    pub fn driver(&self) -> &dyn Driver {
        &*self.driver
    }

    /// Runs `f` on a fresh connection inside one transaction.
    ///
    /// On success the transaction commits. When `f` fails it rolls back and
    /// the original error is returned; a failing rollback is logged rather
    /// than replacing that error. Autocommit connections skip transaction
    /// control entirely.
    pub fn transact<T>(&self, f: impl FnOnce(&mut dyn Connection) -> Result<T>) -> Result<T> {
        let mut connection = self.driver.connect()?;

        if connection.is_autocommit() {
            return f(&mut *connection);
        }

        connection.begin()?;
        trace!("transaction started");

        match f(&mut *connection) {
            Ok(value) => {
                connection.commit()?;
                trace!("transaction committed");
                Ok(value)
            }
            Err(err) => {
                match connection.rollback() {
                    Ok(()) => trace!(error = %err, "transaction rolled back"),
                    Err(rollback) => warn!(
                        error = %err,
                        rollback.error = %rollback,
                        "rollback failed"
                    ),
                }
                Err(err)
            }
        }
    }
}
