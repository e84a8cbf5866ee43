use super::{
    flavor::{DECIMAL_AVG, DECIMAL_SUM},
    Bare, Comma, Compared, Flavor, Formatter, Ident, Params, Qualified, ToSql,
};

use tessera_core::{
    driver::operation::{
        Aggregate, Column, Count, Delete, Find, Insert, Operation, OrderBy, Update,
    },
    query::Aggregation,
    stmt::{AttributeRef, Condition, Type, Value},
};

impl ToSql for &Operation {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Operation::Find(stmt) => stmt.to_sql(f),
            Operation::Count(stmt) => stmt.to_sql(f),
            Operation::Aggregate(stmt) => stmt.to_sql(f),
            Operation::Insert(stmt) => stmt.to_sql(f),
            Operation::Update(stmt) => stmt.to_sql(f),
            Operation::Delete(stmt) => stmt.to_sql(f),
        }
    }
}

struct Filter<'a>(Option<&'a Condition>);

impl ToSql for Filter<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if let Some(condition) = self.0 {
            fmt!(f, " WHERE ", condition);
        }
    }
}

struct GroupBy<'a>(&'a [AttributeRef]);

impl ToSql for GroupBy<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if !self.0.is_empty() {
            fmt!(f, " GROUP BY ", Comma(self.0.iter().map(Qualified)));
        }
    }
}

impl ToSql for &Column {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Qualified(&self.attribute), " AS ", Ident(&self.alias));
    }
}

impl ToSql for &OrderBy {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let direction = if self.descending { " DESC" } else { " ASC" };
        fmt!(f, Compared(&self.attribute), direction);
    }
}

impl ToSql for &Find {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let columns = Comma(&self.columns);

        fmt!(
            f,
            "SELECT ",
            columns,
            " FROM ",
            &self.source,
            Filter(self.filter.as_ref()),
            GroupBy(&self.group_by),
        );

        if !self.order_by.is_empty() {
            fmt!(f, " ORDER BY ", Comma(&self.order_by));
        }

        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                fmt!(f, " LIMIT ", limit, offset.map(|offset| (" OFFSET ", offset)));
            }
            (None, Some(offset)) => match f.serializer.flavor {
                // SQLite only accepts OFFSET after a LIMIT clause.
                Flavor::Sqlite => fmt!(f, " LIMIT -1 OFFSET ", offset),
                Flavor::Postgresql => fmt!(f, " OFFSET ", offset),
            },
            (None, None) => {}
        }
    }
}

impl ToSql for &Count {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if self.group_by.is_empty() {
            fmt!(
                f,
                "SELECT COUNT(*) FROM ",
                &self.source,
                Filter(self.filter.as_ref())
            );
        } else {
            fmt!(
                f,
                "SELECT COUNT(*) FROM (SELECT 1 FROM ",
                &self.source,
                Filter(self.filter.as_ref()),
                GroupBy(&self.group_by),
                ") AS \"groups\""
            );
        }
    }
}

impl ToSql for &Aggregate {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let decimal_text = matches!(f.serializer.flavor, Flavor::Sqlite)
            && matches!(&self.attribute, Some(attribute) if attribute.ty == Type::Decimal);

        // SQLite's own SUM and AVG go through floating point.
        let function = match self.function {
            Aggregation::Count => "COUNT",
            Aggregation::Sum if decimal_text => DECIMAL_SUM,
            Aggregation::Sum => "SUM",
            Aggregation::Min => "MIN",
            Aggregation::Max => "MAX",
            Aggregation::Avg if decimal_text => DECIMAL_AVG,
            Aggregation::Avg => "AVG",
        };

        fmt!(f, "SELECT ", function, "(");
        match (&self.attribute, self.function) {
            (Some(attribute), Aggregation::Min | Aggregation::Max) => fmt!(f, Compared(attribute)),
            (Some(attribute), _) => fmt!(f, Qualified(attribute)),
            (None, _) => fmt!(f, "*"),
        }
        fmt!(f, ") AS ", Ident(Aggregate::VALUE));

        for (i, attribute) in self.group_by.iter().enumerate() {
            fmt!(
                f,
                ", ",
                Qualified(attribute),
                " AS ",
                Ident(Aggregate::group_key(i))
            );
        }

        fmt!(
            f,
            " FROM ",
            &self.source,
            Filter(self.filter.as_ref()),
            GroupBy(&self.group_by)
        );
    }
}

impl ToSql for &Insert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "INSERT INTO ", Ident(&self.data_set));

        if self.values.is_empty() {
            fmt!(f, " DEFAULT VALUES");
        } else {
            let columns = Comma(self.values.iter().map(|(attribute, _)| Bare(attribute)));
            let values = Comma(self.values.iter().map(|(_, value)| value));
            fmt!(f, " (", columns, ") VALUES (", values, ")");
        }

        if let Some(key) = &self.generated_key {
            fmt!(f, " RETURNING ", Bare(key));
        }
    }
}

struct Assignment<'a>(&'a AttributeRef, &'a Value);

impl ToSql for Assignment<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Bare(self.0), " = ", self.1);
    }
}

impl ToSql for &Update {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let assignments = Comma(
            self.assignments
                .iter()
                .map(|(attribute, value)| Assignment(attribute, value)),
        );

        fmt!(
            f,
            "UPDATE ",
            Ident(&self.data_set),
            " SET ",
            assignments,
            Filter(self.filter.as_ref())
        );
    }
}

impl ToSql for &Delete {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(
            f,
            "DELETE FROM ",
            Ident(&self.data_set),
            Filter(self.filter.as_ref())
        );
    }
}
