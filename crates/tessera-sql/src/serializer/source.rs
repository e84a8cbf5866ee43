use super::{Formatter, Ident, Params, Qualified, ToSql};

use tessera_core::{driver::operation::Source, JoinKind};

impl ToSql for &Source {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let join = match self {
            Source::Table(name) => return fmt!(f, Ident(name)),
            Source::Join(join) => join,
        };

        let kind = match join.kind {
            JoinKind::Inner => " INNER JOIN ",
            JoinKind::Left => " LEFT JOIN ",
            JoinKind::Right => " RIGHT JOIN ",
        };

        fmt!(f, &join.left, kind);

        // A join on the right-hand side is grouped so its ON clause binds first.
        if join.right.is_join() {
            fmt!(f, "(", &join.right, ")");
        } else {
            fmt!(f, &join.right);
        }

        let (lhs, rhs) = &join.on;
        fmt!(f, " ON ", Qualified(lhs), " = ", Qualified(rhs));

        if let Some(extra) = &join.extra {
            fmt!(f, " AND ", extra);
        }
    }
}
