#[derive(Debug)]
pub struct Capability {
    /// When true, the database uses a SQL-based query language.
    pub sql: bool,

    /// Supports right outer joins.
    pub right_join: bool,

    /// Multi-statement transactions are available; otherwise every statement
    /// commits on its own.
    pub transactions: bool,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        sql: true,
        right_join: true,
        transactions: true,
    };

    /// Document store capabilities.
    pub const DOCUMENT: Self = Self {
        sql: false,
        right_join: false,
        transactions: false,
    };
}
