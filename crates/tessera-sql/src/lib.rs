pub mod serializer;
pub use serializer::{
    Params, Placeholder, Serializer, DECIMAL_AVG, DECIMAL_COLLATION, DECIMAL_SUM,
};
