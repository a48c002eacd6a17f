use core::fmt;
use core::num::NonZeroI64;

use crate::error::{XmError, XmResult};

/// Identity of a medium state in the registry.
///
/// - positive values are permanent states, negative values transient ones
/// - zero is reserved for "no handle", so `Option<Handle>` stays the size of an `i64`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(NonZeroI64);

/// Lifetime class encoded in the sign of a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifetime {
    Permanent,
    Transient,
}

impl Handle {
    /// Interpret a raw boundary integer; 0 means "no handle".
    pub fn new(raw: i64) -> Option<Self> {
        NonZeroI64::new(raw).map(Self)
    }

    /// Interpret a raw boundary integer that must name a state.
    pub fn require(raw: i64, operation: &str) -> XmResult<Self> {
        Self::new(raw)
            .ok_or_else(|| XmError::contract(format!("{operation} called without a valid handle")))
    }

    pub fn get(self) -> i64 {
        self.0.get()
    }

    pub fn lifetime(self) -> Lifetime {
        if self.0.get() > 0 {
            Lifetime::Permanent
        } else {
            Lifetime::Transient
        }
    }

    pub fn is_permanent(self) -> bool {
        self.lifetime() == Lifetime::Permanent
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.get())
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Monotonic handle allocator for one lifetime class.
///
/// Permanent handles count up from 1, transient handles count down from -1.
/// Handles are never reused.
#[derive(Clone, Debug)]
pub struct HandleCounter {
    lifetime: Lifetime,
    issued: i64,
}

impl HandleCounter {
    pub fn new(lifetime: Lifetime) -> Self {
        Self {
            lifetime,
            issued: 0,
        }
    }

    /// Allocate the next handle of this class.
    pub fn allocate(&mut self) -> XmResult<Handle> {
        let next = self.issued.checked_add(1).ok_or(XmError::Invariant {
            what: "handle space exhausted",
        })?;
        let raw = match self.lifetime {
            Lifetime::Permanent => next,
            Lifetime::Transient => -next,
        };
        let handle = Handle::new(raw).ok_or(XmError::Invariant {
            what: "allocated handle must be nonzero",
        })?;
        self.issued = next;
        Ok(handle)
    }

    /// Number of handles issued so far.
    pub fn issued(&self) -> u64 {
        self.issued.unsigned_abs()
    }
}
