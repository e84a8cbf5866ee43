use super::{Group, Order, Pagination};

/// The shape of one query: filter, ordering, grouping and pagination.
#[derive(Debug, Clone)]
pub struct Overview<F> {
    pub filter: Option<F>,
    pub order: Vec<Order>,
    pub group: Option<Group>,
    pub pagination: Option<Pagination>,
}

impl<F> Overview<F> {
    pub fn new() -> Overview<F> {
        Overview {
            filter: None,
            order: vec![],
            group: None,
            pagination: None,
        }
    }

    pub fn filtered(filter: F) -> Overview<F> {
        Overview::new().with_filter(filter)
    }

    pub fn with_filter(self, filter: F) -> Overview<F> {
        Overview {
            filter: Some(filter),
            ..self
        }
    }

    /// Appends one ordering entry.
    pub fn with_order(mut self, order: Order) -> Overview<F> {
        self.order.push(order);
        self
    }

    /// Replaces the ordering.
    pub fn with_ordering(self, order: Vec<Order>) -> Overview<F> {
        Overview { order, ..self }
    }

    pub fn with_group(self, group: Group) -> Overview<F> {
        Overview {
            group: Some(group),
            ..self
        }
    }

    pub fn with_pagination(self, pagination: Pagination) -> Overview<F> {
        Overview {
            pagination: Some(pagination),
            ..self
        }
    }

    /// Same shape with the filter mapped through `f`.
    pub fn map_filter<G>(self, f: impl FnOnce(F) -> G) -> Overview<G> {
        Overview {
            filter: self.filter.map(f),
            order: self.order,
            group: self.group,
            pagination: self.pagination,
        }
    }
}

impl<F> Default for Overview<F> {
    fn default() -> Self {
        Overview::new()
    }
}
