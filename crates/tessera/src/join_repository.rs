use crate::{repository::find_results, Db, Results};

use tessera_core::{
    query::{Overview, Pagination},
    Mapper, Result,
};

use std::{fmt, sync::Arc};

/// Read operations over a composed mapper, typically a
/// [`JoinEntityMapper`](crate::JoinEntityMapper).
///
/// Writes go through the [`Repository`](crate::Repository) of each side.
pub struct JoinRepository<E, F> {
    db: Db,
    mapper: Arc<dyn Mapper<E, F>>,
}

impl<E, F> JoinRepository<E, F> {
    pub fn new(db: Db, mapper: impl Mapper<E, F> + 'static) -> JoinRepository<E, F> {
        JoinRepository {
            db,
            mapper: Arc::new(mapper),
        }
    }

    pub fn find_all(&self) -> Result<Vec<E>> {
        self.find_by_overview(&Overview::new())
    }

    pub fn find_by_filter(&self, filter: F) -> Result<Vec<E>> {
        self.find_by_overview(&Overview::filtered(filter))
    }

    pub fn find_first_by_filter(&self, filter: F) -> Result<Option<E>> {
        let overview = Overview::filtered(filter).with_pagination(Pagination::new(0, 1)?);
        Ok(self.find_by_overview(&overview)?.into_iter().next())
    }

    /// Pagination limits first-side entities, whatever the cardinality.
    pub fn find_by_overview(&self, overview: &Overview<F>) -> Result<Vec<E>> {
        self.db
            .transact(|conn| self.mapper.fetch(conn, overview, vec![]))
    }

    pub fn find_results_with_overview(&self, overview: &Overview<F>) -> Result<Results<E>> {
        find_results(&self.db, &*self.mapper, overview)
    }

    pub fn count_by_filter(&self, filter: Option<&F>) -> Result<u64> {
        self.db
            .transact(|conn| self.mapper.count(conn, filter, None))
    }
}

impl<E, F> Clone for JoinRepository<E, F> {
    fn clone(&self) -> Self {
        JoinRepository {
            db: self.db.clone(),
            mapper: self.mapper.clone(),
        }
    }
}

impl<E, F> fmt::Debug for JoinRepository<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinRepository")
            .field("db", &self.db)
            .field("data_set", &self.mapper.data_set())
            .finish()
    }
}
