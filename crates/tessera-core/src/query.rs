mod aggregation;
pub use aggregation::Aggregation;

mod group;
pub use group::Group;

mod order;
pub use order::Order;

mod overview;
pub use overview::Overview;

mod pagination;
pub use pagination::Pagination;
