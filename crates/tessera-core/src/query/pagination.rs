use crate::{Error, Result};

/// Offset/limit window over an ordered result set.
///
/// `total` stays `None` until a count query has run for the same filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    offset: u64,
    limit: u64,
    total: Option<u64>,
}

impl Pagination {
    pub fn new(offset: u64, limit: u64) -> Result<Pagination> {
        if limit == 0 {
            return Err(Error::invalid_argument("pagination limit must be positive"));
        }

        Ok(Pagination {
            offset,
            limit,
            total: None,
        })
    }

    /// Window for the 1-based `page` of `size` records.
    pub fn of_page(page: u64, size: u64) -> Result<Pagination> {
        if page == 0 {
            return Err(Error::invalid_argument("page numbers start at 1"));
        }

        Pagination::new((page - 1).saturating_mul(size), size)
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn with_total(self, total: u64) -> Pagination {
        Pagination {
            total: Some(total),
            ..self
        }
    }

    /// 1-based page number.
    pub fn page(&self) -> u64 {
        self.offset / self.limit + 1
    }

    pub fn page_count(&self) -> Option<u64> {
        self.total.map(|total| total.div_ceil(self.limit))
    }

    pub fn is_first_page(&self) -> bool {
        self.offset < self.limit
    }

    /// `false` until the total is known.
    pub fn is_last_page(&self) -> bool {
        match self.total {
            Some(total) => self.offset.saturating_add(self.limit) >= total,
            None => false,
        }
    }

    pub fn next(&self) -> Pagination {
        Pagination {
            offset: self.offset.saturating_add(self.limit),
            ..*self
        }
    }

    pub fn previous(&self) -> Option<Pagination> {
        if self.offset == 0 {
            return None;
        }

        Some(Pagination {
            offset: self.offset.saturating_sub(self.limit),
            ..*self
        })
    }
}
