//! Handle registry for medium states.
//!
//! Permanent handles count up from 1, transient handles down from -1, from two
//! independent counters. Handle-less queries use one solver-scoped state per
//! fluid key, which has no handle at all.

use std::collections::HashMap;

use xm_core::{Handle, HandleCounter, Lifetime};
use xm_fluids::{FluidKey, PropertyRecord};

use crate::error::{MediaError, MediaResult};

/// One medium state: a property record plus the fluid it belongs to.
///
/// The backend is not stored; it is re-resolved through the pool by key on
/// every mutation, so an evicted backend is simply reconstructed.
#[derive(Debug, Clone)]
pub struct MediumState {
    key: FluidKey,
    record: PropertyRecord,
    handle: Option<Handle>,
    root: Option<Handle>,
}

impl MediumState {
    fn new(key: FluidKey, handle: Option<Handle>, root: Option<Handle>) -> Self {
        Self {
            key,
            record: PropertyRecord::new(),
            handle,
            root,
        }
    }

    pub fn key(&self) -> &FluidKey {
        &self.key
    }

    pub fn record(&self) -> &PropertyRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut PropertyRecord {
        &mut self.record
    }

    /// `None` for the solver-scoped state.
    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    /// Root state this dew or bubble state was derived from.
    pub fn root(&self) -> Option<Handle> {
        self.root
    }

    pub fn is_derived(&self) -> bool {
        self.root.is_some()
    }
}

#[derive(Debug)]
pub struct MediumRegistry {
    permanent: HandleCounter,
    transient: HandleCounter,
    states: HashMap<Handle, MediumState>,
    solver_scoped: HashMap<FluidKey, MediumState>,
}

impl Default for MediumRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MediumRegistry {
    pub fn new() -> Self {
        Self {
            permanent: HandleCounter::new(Lifetime::Permanent),
            transient: HandleCounter::new(Lifetime::Transient),
            states: HashMap::new(),
            solver_scoped: HashMap::new(),
        }
    }

    /// Register a new permanent state, or return `existing` unchanged if it is live.
    pub fn create_permanent(
        &mut self,
        key: &FluidKey,
        existing: Option<Handle>,
    ) -> MediaResult<Handle> {
        if let Some(handle) = existing {
            self.resolve(handle)?;
            return Ok(handle);
        }
        self.insert(key, Lifetime::Permanent, None)
    }

    pub fn create_transient(&mut self, key: &FluidKey) -> MediaResult<Handle> {
        self.insert(key, Lifetime::Transient, None)
    }

    /// Register a dew or bubble state of `root`, with the root's lifetime class.
    pub fn create_derived(&mut self, root: Handle) -> MediaResult<Handle> {
        let key = self.resolve(root)?.key().clone();
        self.insert(&key, root.lifetime(), Some(root))
    }

    fn insert(
        &mut self,
        key: &FluidKey,
        lifetime: Lifetime,
        root: Option<Handle>,
    ) -> MediaResult<Handle> {
        let handle = match lifetime {
            Lifetime::Permanent => self.permanent.allocate()?,
            Lifetime::Transient => self.transient.allocate()?,
        };
        tracing::debug!(%handle, key = %key, ?lifetime, "allocated medium state");
        self.states
            .insert(handle, MediumState::new(key.clone(), Some(handle), root));
        Ok(handle)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.states.contains_key(&handle)
    }

    pub fn resolve(&self, handle: Handle) -> MediaResult<&MediumState> {
        self.states
            .get(&handle)
            .ok_or_else(|| unknown_handle(handle))
    }

    pub fn resolve_mut(&mut self, handle: Handle) -> MediaResult<&mut MediumState> {
        self.states
            .get_mut(&handle)
            .ok_or_else(|| unknown_handle(handle))
    }

    /// Solver-scoped state of `key`, created empty on first use.
    pub fn solver_scoped(&mut self, key: &FluidKey) -> &mut MediumState {
        self.solver_scoped
            .entry(key.clone())
            .or_insert_with(|| MediumState::new(key.clone(), None, None))
    }

    pub fn peek_solver_scoped(&self, key: &FluidKey) -> Option<&MediumState> {
        self.solver_scoped.get(key)
    }

    pub fn drop_solver_scoped(&mut self, key: &FluidKey) -> bool {
        self.solver_scoped.remove(key).is_some()
    }

    /// Whether any handle-addressed state belongs to `key`.
    pub fn has_states_for(&self, key: &FluidKey) -> bool {
        self.states.values().any(|state| state.key() == key)
    }

    /// Remove a single state, e.g. a transient whose first evaluation failed.
    pub fn discard(&mut self, handle: Handle) -> bool {
        self.states.remove(&handle).is_some()
    }

    /// Drop every transient state. Permanent and solver-scoped states are kept.
    pub fn reclaim_transients(&mut self) -> usize {
        let before = self.states.len();
        self.states.retain(|handle, _| handle.is_permanent());
        let reclaimed = before - self.states.len();
        if reclaimed > 0 {
            tracing::debug!(reclaimed, "reclaimed transient medium states");
        }
        reclaimed
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn transient_count(&self) -> usize {
        self.states.keys().filter(|h| !h.is_permanent()).count()
    }

    pub fn solver_scoped_count(&self) -> usize {
        self.solver_scoped.len()
    }
}

fn unknown_handle(handle: Handle) -> MediaError {
    MediaError::contract(format!("no medium state is registered under handle {handle}"))
}
