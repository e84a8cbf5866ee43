use crate::{
    mapper::JoinKind,
    stmt::{AttributeRef, Condition},
};

/// Where a query reads from: one data set, or a join tree of data sets.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table(String),
    Join(Box<Join>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub left: Source,
    pub right: Source,
    pub kind: JoinKind,

    /// Equality between an attribute of the left side and one of the right.
    pub on: (AttributeRef, AttributeRef),

    /// Extra on-conditions, applied while joining rather than after.
    pub extra: Option<Condition>,
}

impl Source {
    pub fn table(name: impl Into<String>) -> Source {
        Source::Table(name.into())
    }

    /// The left-most data set, which a join tree is rooted at.
    pub fn root(&self) -> &str {
        match self {
            Source::Table(name) => name,
            Source::Join(join) => join.left.root(),
        }
    }

    pub fn is_join(&self) -> bool {
        matches!(self, Source::Join(_))
    }

    /// Every data set in the tree, left to right.
    pub fn data_sets(&self) -> Vec<&str> {
        let mut dst = vec![];
        self.collect_data_sets(&mut dst);
        dst
    }

    fn collect_data_sets<'a>(&'a self, dst: &mut Vec<&'a str>) {
        match self {
            Source::Table(name) => dst.push(name),
            Source::Join(join) => {
                join.left.collect_data_sets(dst);
                join.right.collect_data_sets(dst);
            }
        }
    }
}
