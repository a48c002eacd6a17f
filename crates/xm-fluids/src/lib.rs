//! xm-fluids: property records and the backends that fill them.
//!
//! Provides:
//! - [`PropertyRecord`]: every thermodynamic field of one state point, each
//!   individually unset until a setter computes it
//! - [`FluidKey`]: library + substance (+ composition) identity
//! - [`Backend`]: a closed set of property backends behind one contract
//!
//! # Backends
//!
//! | library name        | backend           | capability                   |
//! |---------------------|-------------------|------------------------------|
//! | `TestMedium`        | water-like model  | all inputs, saturation       |
//! | `IdealGas*`         | ideal gas         | all inputs, no saturation    |
//! | `Incompressible*`   | constant density  | `ph` and `pT` only           |
//!
//! # Example
//!
//! ```
//! use xm_fluids::{Backend, FluidKey, Phase, Prop, PropertyRecord, StateInput};
//!
//! let backend = Backend::new(FluidKey::new("TestMedium", "water")).unwrap();
//! let mut record = PropertyRecord::new();
//! backend
//!     .set_state(StateInput::PH { p: 1e5, h: 1e5 }, Phase::Unknown, &mut record)
//!     .unwrap();
//! assert!(record.get(Prop::T).unwrap() > 290.0);
//! ```

pub mod backend;
pub mod composition;
pub mod constants;
pub mod error;
pub mod ideal_gas;
pub mod incompressible;
pub mod key;
pub mod record;
pub mod state;
pub mod test_medium;

// Re-exports for ergonomics
pub use backend::{Backend, Library, SATURATION_NUDGE, SolverModel, endpoint_enthalpy};
pub use composition::Composition;
pub use constants::FluidConstants;
pub use error::{FluidError, FluidResult};
pub use ideal_gas::IdealGas;
pub use incompressible::Incompressible;
pub use key::FluidKey;
pub use record::{DerivedRefs, MAX_COMPONENTS, Prop, PropKind, PropertyRecord, SaturationPoint};
pub use state::{
    Endpoint, InputChoice, Phase, PhaseSide, SpecEnthalpy, SpecEntropy, StateInput, StateQuery,
    StateValues,
};
pub use test_medium::TestMedium;
