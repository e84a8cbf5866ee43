mod capability;
pub use capability::Capability;

mod response;
pub use response::{Response, Rows};

pub mod operation;
pub use operation::Operation;

use crate::Result;

use std::fmt::Debug;

/// A storage backend.
///
/// The driver is the connection provider: every repository operation asks it
/// for one connection and drops that connection when the operation ends.
pub trait Driver: Debug + Send + Sync + 'static {
    /// Describes the driver's capability, which informs statement building.
    fn capability(&self) -> &'static Capability;

    /// Acquire a connection or session.
    fn connect(&self) -> Result<Box<dyn Connection>>;
}

/// One acquired backend connection.
///
/// Releasing the connection is dropping it.
pub trait Connection: Debug {
    fn capability(&self) -> &'static Capability;

    /// Execute a database operation
    fn exec(&mut self, op: Operation) -> Result<Response>;

    /// When `true`, every statement commits on its own and `begin`, `commit`
    /// and `rollback` are no-ops.
    fn is_autocommit(&self) -> bool;

    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;
}
