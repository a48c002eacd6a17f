//! xm-core: handles, tolerances and units shared by the media crates.
//!
//! - [`ids`]: medium-state handles, their lifetimes and allocators
//! - [`numeric`]: the cache mismatch test and float checks
//! - [`units`]: SI quantities for fluid constants
//! - [`error`]: errors raised below the fluid layer

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{XmError, XmResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
