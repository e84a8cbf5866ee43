use super::Serializer;

/// Collation that orders decimal text by numeric value. SQLite connections
/// must register it before running serialized statements.
pub const DECIMAL_COLLATION: &str = "decimal";

/// Exact sum of decimal text, returned as canonical text.
pub const DECIMAL_SUM: &str = "decimal_sum";

/// Exact average of decimal text, returned as canonical text.
pub const DECIMAL_AVG: &str = "decimal_avg";

#[derive(Debug)]
pub(super) enum Flavor {
    Postgresql,
    Sqlite,
}

impl Serializer {
    pub fn sqlite() -> Serializer {
        Serializer {
            flavor: Flavor::Sqlite,
        }
    }

    pub fn postgresql() -> Serializer {
        Serializer {
            flavor: Flavor::Postgresql,
        }
    }
}
