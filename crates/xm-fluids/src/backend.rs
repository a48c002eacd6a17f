//! Closed set of property backends behind one state-setting contract.
//!
//! A [`Backend`] is built once per fluid key. The library name picks the
//! variant; after that every call goes through the [`SolverModel`] contract,
//! which writes into an explicit [`PropertyRecord`] and keeps no per-call state.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::constants::FluidConstants;
use crate::error::{FluidError, FluidResult};
use crate::ideal_gas::IdealGas;
use crate::incompressible::Incompressible;
use crate::key::FluidKey;
use crate::record::{Prop, PropertyRecord, SaturationPoint};
use crate::state::{Endpoint, Phase, PhaseSide, StateInput};
use crate::test_medium::TestMedium;

/// Relative enthalpy offset placing a dew/bubble state just off the saturation line.
pub const SATURATION_NUDGE: f64 = 1e-6;

/// Libraries served by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Library {
    /// Exact name `TestMedium`.
    TestMedium,
    /// Names starting with `IdealGas`.
    IdealGas,
    /// Names starting with `Incompressible`.
    Incompressible,
}

impl Library {
    pub fn resolve(name: &str) -> Option<Self> {
        if name == "TestMedium" {
            Some(Self::TestMedium)
        } else if name.starts_with("IdealGas") {
            Some(Self::IdealGas)
        } else if name.starts_with("Incompressible") {
            Some(Self::Incompressible)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TestMedium => "TestMedium",
            Self::IdealGas => "IdealGas",
            Self::Incompressible => "Incompressible",
        }
    }
}

/// State-setting contract every backend variant implements.
///
/// Defaults report [`FluidError::UnsupportedOperation`], so a reduced-capability
/// backend only overrides what it can compute. Setters receive a cleared record.
pub trait SolverModel: Send + Sync {
    fn label(&self) -> &'static str;

    fn constants(&self) -> &FluidConstants;

    fn set_state_dt(&self, _d: f64, _t: f64, _phase: Phase, _out: &mut PropertyRecord) -> FluidResult<()> {
        Err(self.unsupported("setState_dT"))
    }

    fn set_state_ph(&self, _p: f64, _h: f64, _phase: Phase, _out: &mut PropertyRecord) -> FluidResult<()> {
        Err(self.unsupported("setState_ph"))
    }

    fn set_state_ps(&self, _p: f64, _s: f64, _phase: Phase, _out: &mut PropertyRecord) -> FluidResult<()> {
        Err(self.unsupported("setState_ps"))
    }

    fn set_state_pt(&self, _p: f64, _t: f64, _out: &mut PropertyRecord) -> FluidResult<()> {
        Err(self.unsupported("setState_pT"))
    }

    /// Overwrite only the saturation fields of `out`.
    fn set_sat_p(&self, _p: f64, _out: &mut PropertyRecord) -> FluidResult<()> {
        Err(self.unsupported("setSat_p"))
    }

    /// Overwrite only the saturation fields of `out`.
    fn set_sat_t(&self, _t: f64, _out: &mut PropertyRecord) -> FluidResult<()> {
        Err(self.unsupported("setSat_T"))
    }

    /// Whether dew and bubble states can be derived from a saturation point.
    fn has_saturation(&self) -> bool {
        false
    }

    fn unsupported(&self, function: &'static str) -> FluidError {
        FluidError::UnsupportedOperation {
            function,
            backend: self.label(),
        }
    }
}

#[derive(Debug)]
enum Model {
    TestMedium(TestMedium),
    IdealGas(IdealGas),
    Incompressible(Incompressible),
}

/// One live backend instance, owned by a pool and shared with callers.
#[derive(Debug)]
pub struct Backend {
    key: FluidKey,
    library: Library,
    model: Model,
    calls: AtomicU64,
}

impl Backend {
    /// Construct the backend the key's library names.
    pub fn new(key: FluidKey) -> FluidResult<Self> {
        let library =
            Library::resolve(key.library()).ok_or_else(|| FluidError::UnsupportedBackend {
                library: key.library().to_owned(),
            })?;
        let model = match library {
            Library::TestMedium => Model::TestMedium(TestMedium::new(&key)?),
            Library::IdealGas => Model::IdealGas(IdealGas::new(&key)?),
            Library::Incompressible => Model::Incompressible(Incompressible::new(&key)?),
        };
        tracing::debug!(key = %key, backend = library.label(), "constructed backend");
        Ok(Self {
            key,
            library,
            model,
            calls: AtomicU64::new(0),
        })
    }

    fn model(&self) -> &dyn SolverModel {
        match &self.model {
            Model::TestMedium(m) => m,
            Model::IdealGas(m) => m,
            Model::Incompressible(m) => m,
        }
    }

    pub fn key(&self) -> &FluidKey {
        &self.key
    }

    pub fn library(&self) -> Library {
        self.library
    }

    pub fn constants(&self) -> &FluidConstants {
        self.model().constants()
    }

    /// Number of property evaluations performed so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn count(&self, function: &'static str) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(key = %self.key, function, "backend evaluation");
    }

    /// Recompute `out` from an input pair. All previous state fields are discarded.
    pub fn set_state(
        &self,
        input: StateInput,
        phase: Phase,
        out: &mut PropertyRecord,
    ) -> FluidResult<()> {
        self.count(input.function_name());
        input.validate()?;
        out.clear_state();
        let model = self.model();
        match input {
            StateInput::DT { d, t } => model.set_state_dt(d, t, phase, out)?,
            StateInput::PH { p, h } => model.set_state_ph(p, h, phase, out)?,
            StateInput::PS { p, s } => model.set_state_ps(p, s, phase, out)?,
            StateInput::PT { p, t } => model.set_state_pt(p, t, out)?,
        }
        // input pair is echoed bit-exact; cache checks compare against it
        let (a, b) = match input {
            StateInput::DT { d, t } => ((Prop::D, d), (Prop::T, t)),
            StateInput::PH { p, h } => ((Prop::P, p), (Prop::H, h)),
            StateInput::PS { p, s } => ((Prop::P, p), (Prop::S, s)),
            StateInput::PT { p, t } => ((Prop::P, p), (Prop::T, t)),
        };
        out.set(a.0, a.1);
        out.set(b.0, b.1);
        Ok(())
    }

    /// Recompute the saturation fields of `out` at pressure `p`.
    pub fn set_sat_p(&self, p: f64, out: &mut PropertyRecord) -> FluidResult<()> {
        self.count("setSat_p");
        xm_core::ensure_finite(p, "saturation pressure")?;
        out.clear_saturation();
        self.model().set_sat_p(p, out)
    }

    /// Recompute the saturation fields of `out` at temperature `t`.
    pub fn set_sat_t(&self, t: f64, out: &mut PropertyRecord) -> FluidResult<()> {
        self.count("setSat_T");
        xm_core::ensure_finite(t, "saturation temperature")?;
        out.clear_saturation();
        self.model().set_sat_t(t, out)
    }

    /// Saturation at the record's own pressure.
    pub fn set_sat_p_state(&self, out: &mut PropertyRecord) -> FluidResult<()> {
        let p = out.get(Prop::P)?;
        self.set_sat_p(p, out)
    }

    /// Fill `target` with the dew (saturated vapour) state of `root`.
    pub fn set_dew_state(
        &self,
        side: PhaseSide,
        root: &PropertyRecord,
        target: &mut PropertyRecord,
    ) -> FluidResult<()> {
        self.set_endpoint_state(Endpoint::Dew, side, root, target)
    }

    /// Fill `target` with the bubble (saturated liquid) state of `root`.
    pub fn set_bubble_state(
        &self,
        side: PhaseSide,
        root: &PropertyRecord,
        target: &mut PropertyRecord,
    ) -> FluidResult<()> {
        self.set_endpoint_state(Endpoint::Bubble, side, root, target)
    }

    /// Dew or bubble state, evaluated through `setState_ph` just off the saturation line.
    pub fn set_endpoint_state(
        &self,
        endpoint: Endpoint,
        side: PhaseSide,
        root: &PropertyRecord,
        target: &mut PropertyRecord,
    ) -> FluidResult<()> {
        let input = self.endpoint_input(endpoint, side, root)?;
        self.set_state(input, side.phase(), target)
    }

    /// The `(p, h)` pair a dew or bubble state of `root` is evaluated at.
    ///
    /// Fails without touching any record when the model has no saturation line
    /// or `root` carries no saturation fields.
    pub fn endpoint_input(
        &self,
        endpoint: Endpoint,
        side: PhaseSide,
        root: &PropertyRecord,
    ) -> FluidResult<StateInput> {
        let model = self.model();
        if !model.has_saturation() {
            return Err(model.unsupported(match endpoint {
                Endpoint::Dew => "setDewState",
                Endpoint::Bubble => "setBubbleState",
            }));
        }
        let sat = root.saturation_point()?;
        let h = endpoint_enthalpy(endpoint, side, &sat);
        Ok(StateInput::PH { p: sat.ps, h })
    }

    /// Enthalpy at `p` with the entropy of `state`.
    pub fn isentropic_enthalpy(&self, p: f64, state: &PropertyRecord) -> FluidResult<f64> {
        let s = state.get(Prop::S)?;
        let mut scratch = PropertyRecord::new();
        self.set_state(StateInput::PS { p, s }, Phase::Unknown, &mut scratch)?;
        scratch.get(Prop::H)
    }
}

/// Enthalpy used to evaluate a dew or bubble state on the requested side.
///
/// The one-phase side lies outside the dome (above `hv`, below `hl`), the
/// two-phase side just inside it.
pub fn endpoint_enthalpy(endpoint: Endpoint, side: PhaseSide, sat: &SaturationPoint) -> f64 {
    let (h, outward) = match endpoint {
        Endpoint::Dew => (sat.hv, 1.0),
        Endpoint::Bubble => (sat.hl, -1.0),
    };
    let direction = match side {
        PhaseSide::OnePhase => outward,
        PhaseSide::TwoPhase => -outward,
    };
    h + direction * SATURATION_NUDGE * h.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_dispatch_is_closed() {
        assert_eq!(Library::resolve("TestMedium"), Some(Library::TestMedium));
        assert_eq!(Library::resolve("TestMediumX"), None);
        assert_eq!(Library::resolve("IdealGas.NASA"), Some(Library::IdealGas));
        assert_eq!(
            Library::resolve("Incompressible"),
            Some(Library::Incompressible)
        );
        assert_eq!(Library::resolve("FluidProp.RefProp"), None);
    }

    #[test]
    fn unsupported_library_is_reported() {
        let err = Backend::new(FluidKey::new("FluidProp", "water")).unwrap_err();
        assert!(matches!(err, FluidError::UnsupportedBackend { library } if library == "FluidProp"));
    }

    #[test]
    fn endpoint_enthalpy_sides() {
        let sat = SaturationPoint {
            ps: 1e5,
            hl: 4.0e5,
            hv: 2.6e6,
        };
        assert!(endpoint_enthalpy(Endpoint::Dew, PhaseSide::OnePhase, &sat) > sat.hv);
        assert!(endpoint_enthalpy(Endpoint::Dew, PhaseSide::TwoPhase, &sat) < sat.hv);
        assert!(endpoint_enthalpy(Endpoint::Bubble, PhaseSide::OnePhase, &sat) < sat.hl);
        assert!(endpoint_enthalpy(Endpoint::Bubble, PhaseSide::TwoPhase, &sat) > sat.hl);
    }

    #[test]
    fn negative_saturation_enthalpy_nudges_the_same_way() {
        let sat = SaturationPoint {
            ps: 1e5,
            hl: -2.0e5,
            hv: -1.0e4,
        };
        assert!(endpoint_enthalpy(Endpoint::Bubble, PhaseSide::OnePhase, &sat) < sat.hl);
        assert!(endpoint_enthalpy(Endpoint::Dew, PhaseSide::OnePhase, &sat) > sat.hv);
    }

    #[test]
    fn calls_are_counted() {
        let backend = Backend::new(FluidKey::new("TestMedium", "water")).unwrap();
        let mut record = PropertyRecord::new();
        assert_eq!(backend.call_count(), 0);
        backend
            .set_state(StateInput::PT { p: 1e5, t: 300.0 }, Phase::Unknown, &mut record)
            .unwrap();
        backend.set_sat_p(1e5, &mut record).unwrap();
        assert_eq!(backend.call_count(), 2);
    }
}
