//! The owning context: configuration, backend pool and state registry.
//!
//! A [`MediaContext`] is a plain single-owner value; every operation takes
//! `&mut self`. [`SharedMedia`] puts one behind a mutex for hosts that call in
//! from several threads.

use std::sync::{Arc, Mutex};

use xm_core::{Handle, MismatchTolerance};
use xm_fluids::{Backend, FluidKey};

use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};
use crate::pool::{Acquired, BackendPool};
use crate::registry::MediumRegistry;

#[derive(Debug)]
pub struct MediaContext {
    config: MediaConfig,
    pub(crate) pool: BackendPool,
    pub(crate) registry: MediumRegistry,
}

impl MediaContext {
    pub fn new(config: MediaConfig) -> MediaResult<Self> {
        config.validate()?;
        Ok(Self {
            pool: BackendPool::new(config.max_solver)?,
            registry: MediumRegistry::new(),
            config,
        })
    }

    pub fn mismatch(&self) -> MismatchTolerance {
        self.config.mismatch
    }

    pub fn pool(&self) -> &BackendPool {
        &self.pool
    }

    pub fn registry(&self) -> &MediumRegistry {
        &self.registry
    }

    /// Backend for `key`, keeping the registry consistent with any eviction.
    pub fn backend_for(&mut self, key: &FluidKey) -> MediaResult<Arc<Backend>> {
        let Acquired { backend, evicted } = self.pool.acquire(key)?;
        if let Some(old) = evicted {
            if self.registry.has_states_for(&old) {
                tracing::warn!(
                    evicted = %old,
                    incoming = %key,
                    "evicted a backend that registered states still use; it will be rebuilt on next use"
                );
            }
            self.registry.drop_solver_scoped(&old);
        }
        Ok(backend)
    }

    /// Register a permanent state, or confirm `existing` is live.
    pub fn create_permanent(
        &mut self,
        key: &FluidKey,
        existing: Option<Handle>,
    ) -> MediaResult<Handle> {
        if existing.is_none() {
            self.backend_for(key)?;
        }
        self.registry.create_permanent(key, existing)
    }

    /// Register a transient state, reclaiming old ones first if the threshold is reached.
    pub fn create_transient(&mut self, key: &FluidKey) -> MediaResult<Handle> {
        if let Some(limit) = self.config.reclaim_transients_above {
            if self.registry.transient_count() >= limit {
                self.registry.reclaim_transients();
            }
        }
        self.backend_for(key)?;
        self.registry.create_transient(key)
    }

    pub fn reclaim_transients(&mut self) -> usize {
        self.registry.reclaim_transients()
    }
}

/// A [`MediaContext`] shared between threads.
///
/// Handle allocation, ring advancement and every mutate-then-read pair happen
/// under one lock.
#[derive(Debug, Clone)]
pub struct SharedMedia {
    inner: Arc<Mutex<MediaContext>>,
}

impl SharedMedia {
    pub fn new(context: MediaContext) -> Self {
        Self {
            inner: Arc::new(Mutex::new(context)),
        }
    }

    /// Run `f` with exclusive access to the context.
    pub fn with<R>(&self, f: impl FnOnce(&mut MediaContext) -> MediaResult<R>) -> MediaResult<R> {
        let mut guard = self.inner.lock().map_err(|_| {
            MediaError::contract("media context lock is poisoned (a previous call panicked)")
        })?;
        f(&mut guard)
    }
}
