/// One ordering entry: an attribute's qualified name and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Order {
    pub attribute: String,
    pub descending: bool,
}

impl Order {
    pub fn asc(attribute: impl Into<String>) -> Order {
        Order {
            attribute: attribute.into(),
            descending: false,
        }
    }

    pub fn desc(attribute: impl Into<String>) -> Order {
        Order {
            attribute: attribute.into(),
            descending: true,
        }
    }
}
