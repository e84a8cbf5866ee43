mod decimal;

mod row;
use row::Row;

mod value;
pub(crate) use value::Value;

use rusqlite::{Connection as RusqliteConnection, OpenFlags};
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tessera_core::{
    driver::{operation::Operation, Capability, Driver, Response},
    mapper::AttributeSource,
    stmt, Error, Result,
};
use tessera_sql::Serializer;
use tracing::{debug, trace};
use url::Url;

#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),
    InMemory(SharedMemory),
}

/// A private in-memory database shared by every connection of one driver.
///
/// SQLite drops an in-memory database with its last connection, so the
/// driver keeps one anchor connection open for its whole lifetime.
#[derive(Debug)]
pub struct SharedMemory {
    uri: String,
    _anchor: Mutex<RusqliteConnection>,
}

impl Sqlite {
    /// Create a new SQLite driver with an arbitrary connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(|err| {
            Error::invalid_connection_url(format!("{err}; url={url_str}"))
        })?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Self::in_memory()
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Result<Self> {
        let uri = format!(
            "file:tessera-{}?mode=memory&cache=shared",
            uuid::Uuid::new_v4()
        );
        let anchor = RusqliteConnection::open_with_flags(&uri, OpenFlags::default())
            .map_err(Error::driver)?;

        Ok(Self::InMemory(SharedMemory {
            uri,
            _anchor: Mutex::new(anchor),
        }))
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    pub fn url(&self) -> String {
        match self {
            Sqlite::InMemory(_) => "sqlite::memory:".to_string(),
            Sqlite::File(path) => format!("sqlite:{}", path.display()),
        }
    }

    /// Runs semicolon-separated SQL outside of any repository operation,
    /// typically schema setup.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let connection = self.open_connection()?;
        connection.connection.execute_batch(sql).map_err(Error::driver)
    }

    fn open_connection(&self) -> Result<Connection> {
        match self {
            Sqlite::File(path) => Connection::open(path),
            Sqlite::InMemory(memory) => Connection::open_uri(&memory.uri),
        }
    }
}

impl Driver for Sqlite {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    fn connect(&self) -> Result<Box<dyn tessera_core::Connection>> {
        Ok(Box::new(self.open_connection()?))
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
}

impl Connection {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::driver)?;
        Self::prepare(connection)
    }

    fn open_uri(uri: &str) -> Result<Self> {
        let connection =
            RusqliteConnection::open_with_flags(uri, OpenFlags::default()).map_err(Error::driver)?;
        Self::prepare(connection)
    }

    fn prepare(connection: RusqliteConnection) -> Result<Self> {
        decimal::register(&connection).map_err(Error::driver)?;
        Ok(Self { connection })
    }

    fn execute_control(&mut self, sql: &str) -> Result<()> {
        trace!(db.statement = sql, "transaction control");
        self.connection.execute(sql, []).map_err(Error::driver)?;
        Ok(())
    }
}

impl tessera_core::Connection for Connection {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    fn exec(&mut self, op: Operation) -> Result<Response> {
        let mut params: Vec<stmt::Value> = vec![];
        let sql = Serializer::sqlite().serialize(&op, &mut params)?;

        debug!(db.statement = %sql, params = params.len(), "executing SQL");

        let mut stmt = self.connection.prepare_cached(&sql).map_err(Error::driver)?;
        let params = params.into_iter().map(Value::from).collect::<Vec<_>>();
        let params = rusqlite::params_from_iter(params.iter());

        let returns_records = match &op {
            Operation::Find(_) | Operation::Aggregate(_) => true,
            Operation::Insert(insert) => insert.generated_key.is_some(),
            Operation::Count(_) => {
                let count: i64 = stmt
                    .query_row(params, |row| row.get(0))
                    .map_err(Error::driver)?;
                return Ok(Response::count(count as u64));
            }
            Operation::Update(_) | Operation::Delete(_) => false,
        };

        if !returns_records {
            let count = stmt.execute(params).map_err(Error::driver)?;
            return Ok(Response::count(count as u64));
        }

        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query(params).map_err(Error::driver)?;
        let mut ret: Vec<Box<dyn AttributeSource>> = vec![];

        while let Some(row) = rows.next().map_err(Error::driver)? {
            ret.push(Box::new(Row::read(columns.clone(), row)?));
        }

        Ok(Response::records(ret))
    }

    fn is_autocommit(&self) -> bool {
        false
    }

    fn begin(&mut self) -> Result<()> {
        self.execute_control(Serializer::sqlite().serialize_transaction_start())
    }

    fn commit(&mut self) -> Result<()> {
        self.execute_control("COMMIT")
    }

    fn rollback(&mut self) -> Result<()> {
        self.execute_control("ROLLBACK")
    }
}
