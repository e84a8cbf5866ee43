use super::{flavor::DECIMAL_COLLATION, Flavor, Formatter, Ident, Params, ToSql};

use tessera_core::stmt::{AttributeRef, Type};

/// `"prefix"."name"`, or `"name"` for an unqualified attribute.
pub(super) struct Qualified<'a>(pub(super) &'a AttributeRef);

/// `"name"`, for positions where SQL forbids a qualifier.
pub(super) struct Bare<'a>(pub(super) &'a AttributeRef);

/// A qualified attribute whose values are compared or sorted. SQLite keeps
/// decimals as text, so they compare under the numeric collation.
pub(super) struct Compared<'a>(pub(super) &'a AttributeRef);

impl ToSql for Qualified<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let name = Ident(&self.0.name);
        match &self.0.prefix {
            Some(prefix) => fmt!(f, Ident(prefix), ".", name),
            None => fmt!(f, name),
        }
    }
}

impl ToSql for Bare<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(&self.0.name));
    }
}

impl ToSql for Compared<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Qualified(self.0));
        if self.0.ty == Type::Decimal && matches!(f.serializer.flavor, Flavor::Sqlite) {
            fmt!(f, " COLLATE ", DECIMAL_COLLATION);
        }
    }
}
