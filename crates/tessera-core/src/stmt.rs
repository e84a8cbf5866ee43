mod condition;
pub use condition::{
    and, contains, eq, eq_attributes, gt, gte, is_in, lt, lte, or, AttributeRef, Condition, Raw,
};

mod primitive;
pub use primitive::Primitive;

mod record;
pub use record::Record;

mod ty;
pub use ty::Type;

mod value;
pub use value::Value;
