use crate::Pagination;

/// One page of entities together with the pagination that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Results<E> {
    pub items: Vec<E>,

    /// The requested pagination with its total filled in, or `None` when the
    /// query was not paginated.
    pub pagination: Option<Pagination>,

    /// Number of entities (or groups) matching the filter across all pages.
    pub total: u64,
}

impl<E> Results<E> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` unless a later page exists.
    pub fn is_last_page(&self) -> bool {
        self.pagination
            .as_ref()
            .map_or(true, |pagination| pagination.is_last_page())
    }
}

impl<E> IntoIterator for Results<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
