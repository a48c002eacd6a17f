//! Bounded pool of live backends keyed by fluid identity.
//!
//! Each newly constructed backend takes the next slot of a fixed ring. When the
//! ring wraps, whatever key occupies the slot is evicted, even if states still
//! refer to it. Eviction follows creation order, not access order.

use std::collections::HashMap;
use std::sync::Arc;

use xm_fluids::{Backend, FluidKey};

use crate::error::{MediaError, MediaResult};

/// Result of a pool lookup.
#[derive(Debug)]
pub struct Acquired {
    pub backend: Arc<Backend>,
    /// Key pushed out of the ring to make room, if any.
    pub evicted: Option<FluidKey>,
}

#[derive(Debug)]
pub struct BackendPool {
    ring: Vec<Option<FluidKey>>,
    next_slot: u64,
    live: HashMap<FluidKey, Arc<Backend>>,
    constructed: u64,
}

impl BackendPool {
    pub fn new(capacity: usize) -> MediaResult<Self> {
        if capacity == 0 {
            return Err(MediaError::Config {
                what: "backend pool capacity must be at least 1".into(),
            });
        }
        Ok(Self {
            ring: vec![None; capacity],
            next_slot: 0,
            live: HashMap::with_capacity(capacity),
            constructed: 0,
        })
    }

    /// Live backend for `key`, constructing it (and possibly evicting) when absent.
    ///
    /// A failed construction leaves the ring untouched.
    pub fn acquire(&mut self, key: &FluidKey) -> MediaResult<Acquired> {
        if let Some(backend) = self.live.get(key) {
            return Ok(Acquired {
                backend: Arc::clone(backend),
                evicted: None,
            });
        }

        let backend = Arc::new(Backend::new(key.clone())?);
        let slot = (self.next_slot % self.ring.len() as u64) as usize;
        self.next_slot += 1;

        let evicted = self.ring[slot].take();
        if let Some(old) = &evicted {
            self.live.remove(old);
            tracing::debug!(evicted = %old, slot, "evicted backend from pool");
        }
        self.ring[slot] = Some(key.clone());
        self.live.insert(key.clone(), Arc::clone(&backend));
        self.constructed += 1;

        Ok(Acquired { backend, evicted })
    }

    pub fn get(&mut self, key: &FluidKey) -> MediaResult<Arc<Backend>> {
        Ok(self.acquire(key)?.backend)
    }

    /// Live backend without constructing one.
    pub fn peek(&self, key: &FluidKey) -> Option<Arc<Backend>> {
        self.live.get(key).cloned()
    }

    pub fn is_live(&self, key: &FluidKey) -> bool {
        self.live.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Backends constructed over the pool's lifetime, reconstructions included.
    pub fn constructed_count(&self) -> u64 {
        self.constructed
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn pool_never_exceeds_capacity(
            capacity in 1_usize..5,
            picks in prop::collection::vec(0_usize..8, 1..40),
        ) {
            let mut pool = BackendPool::new(capacity).unwrap();
            for pick in picks {
                let key = FluidKey::new("TestMedium", format!("fluid{pick}"));
                let backend = pool.get(&key).unwrap();
                prop_assert_eq!(backend.key(), &key);
                prop_assert!(pool.len() <= capacity);
            }
        }
    }
}
