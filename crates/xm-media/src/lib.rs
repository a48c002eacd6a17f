//! xm-media: identity, caching and staleness management for medium states.
//!
//! Provides:
//! - [`BackendPool`]: fluid key to live backend, bounded by a creation-order ring
//! - [`MediumRegistry`]: permanent and transient handles, solver-scoped states
//! - dispatch: property queries that trust the cache unless the caller's
//!   inputs fail the mismatch test
//! - the dew/bubble graph: derived states allocated once per root and side
//! - [`boundary`]: the same operations over raw integer handles and codes
//!
//! # Example
//!
//! ```
//! use xm_fluids::{FluidKey, Phase, Prop, StateInput, StateQuery};
//! use xm_media::{MediaConfig, MediaContext};
//!
//! let mut ctx = MediaContext::new(MediaConfig::default()).unwrap();
//! let key = FluidKey::new("TestMedium", "water");
//! let h1 = ctx.create_permanent(&key, None).unwrap();
//! ctx.set_state(&key, StateInput::PH { p: 1e5, h: 1e5 }, Phase::Unknown, Some(h1))
//!     .unwrap();
//!
//! // same (p, h): served from the cache
//! let d = ctx
//!     .state_property(Prop::D, &key, Some(h1), &StateQuery::ph(1e5, 1e5))
//!     .unwrap();
//! assert!(d > 900.0);
//! ```

pub mod boundary;
pub mod config;
pub mod context;
pub mod derived;
pub mod dispatch;
pub mod error;
pub mod pool;
pub mod registry;

// Re-exports for ergonomics
pub use boundary::ConstantKind;
pub use config::{DEFAULT_MAX_SOLVER, MediaConfig};
pub use context::{MediaContext, SharedMedia};
pub use dispatch::{SaturationSummary, StateSummary};
pub use error::{MediaError, MediaResult};
pub use pool::{Acquired, BackendPool};
pub use registry::{MediumRegistry, MediumState};
