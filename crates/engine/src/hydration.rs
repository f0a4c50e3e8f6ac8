//! Hydration fallbacks for entities without event history.

use crate::traits::{HydrationFallback, Mapper, Repository, RepositoryFactory};
use eventgrain_core::Result;
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::debug;

/// Fallback that always yields `S::default()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFallback;

impl<K, S: Default> HydrationFallback<K, S> for DefaultFallback {
    fn hydrate(&self, _identity: &K) -> Result<S> {
        Ok(S::default())
    }
}

/// Fallback backed by a plain function or closure.
pub struct FnFallback<F>(pub F);

impl<K, S, F> HydrationFallback<K, S> for FnFallback<F>
where
    F: Fn(&K) -> Result<S> + Send + Sync,
{
    fn hydrate(&self, identity: &K) -> Result<S> {
        (self.0)(identity)
    }
}

/// Seeds state from a legacy repository row.
///
/// Opens one repository handle per hydration and releases it before
/// returning. A missing row falls through to `S::default()`.
pub struct RepositoryFallback<F, M, E> {
    factory: F,
    mapper: M,
    _row: PhantomData<fn() -> E>,
}

impl<F, M, E> RepositoryFallback<F, M, E> {
    /// Create a fallback from a repository factory and a row-to-state mapper.
    pub fn new(factory: F, mapper: M) -> Self {
        RepositoryFallback {
            factory,
            mapper,
            _row: PhantomData,
        }
    }
}

impl<K, S, E, F, M> HydrationFallback<K, S> for RepositoryFallback<F, M, E>
where
    K: Debug,
    S: Default,
    F: RepositoryFactory<K, E>,
    M: Mapper<E, S>,
{
    fn hydrate(&self, identity: &K) -> Result<S> {
        let row = {
            let repo = self.factory.open()?;
            repo.first_or_default(identity)?
        };

        match row {
            Some(row) => {
                debug!(target: "eventgrain::entity", identity = ?identity, "Seeding snapshot from repository row");
                Ok(self.mapper.map(&row))
            }
            None => Ok(S::default()),
        }
    }
}
