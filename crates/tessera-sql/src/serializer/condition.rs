use super::{raw, Comma, Compared, Flavor, Formatter, Params, Qualified, ToSql};

use tessera_core::stmt::{Condition, Raw, Value};

impl ToSql for &Condition {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Condition::Eq(attr, Value::Null) => fmt!(f, Qualified(attr), " IS NULL"),
            Condition::Eq(attr, value) => fmt!(f, Compared(attr), " = ", value),
            Condition::Lt(attr, value) => fmt!(f, Compared(attr), " < ", value),
            Condition::Lte(attr, value) => fmt!(f, Compared(attr), " <= ", value),
            Condition::Gt(attr, value) => fmt!(f, Compared(attr), " > ", value),
            Condition::Gte(attr, value) => fmt!(f, Compared(attr), " >= ", value),
            Condition::Contains(attr, needle) => {
                // Case-sensitive substring test; no wildcard escaping needed.
                let position = match f.serializer.flavor {
                    Flavor::Sqlite => "instr(",
                    Flavor::Postgresql => "strpos(",
                };
                let needle = Value::String(needle.clone());
                fmt!(f, position, Qualified(attr), ", ", &needle, ") > 0");
            }
            Condition::In(_, values) if values.is_empty() => fmt!(f, "1 = 0"),
            Condition::In(attr, values) => fmt!(f, Compared(attr), " IN (", Comma(values), ")"),
            Condition::EqAttributes(lhs, rhs) => fmt!(f, Compared(lhs), " = ", Qualified(rhs)),
            Condition::And(lhs, rhs) => fmt!(f, "(", &**lhs, " AND ", &**rhs, ")"),
            Condition::Or(lhs, rhs) => fmt!(f, "(", &**lhs, " OR ", &**rhs, ")"),
            Condition::Raw(Raw::Sql { fragment, params }) => {
                let mut rest = 0;

                f.dst.push('(');
                for (offset, param) in raw::placeholders(fragment).into_iter().zip(params) {
                    f.dst.push_str(&fragment[rest..offset]);
                    param.to_sql(f);
                    rest = offset + 1;
                }
                f.dst.push_str(&fragment[rest..]);
                f.dst.push(')');
            }
            Condition::Raw(Raw::Document(_)) => {
                unreachable!("document filters are rejected before serialization")
            }
        }
    }
}
