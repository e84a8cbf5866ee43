/// Grouping by the qualified names of one or more attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Group {
    pub attributes: Vec<String>,
}

impl Group {
    pub fn by<S: Into<String>>(attributes: impl IntoIterator<Item = S>) -> Group {
        Group {
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
