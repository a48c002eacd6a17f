//! Property record: every field a state point can carry, each explicitly unset
//! until a state setter computes it.

use crate::error::{FluidError, FluidResult};
use crate::state::{Endpoint, Phase, PhaseSide};
use xm_core::{Handle, Real};

/// Maximum number of mixture components a record can describe.
pub const MAX_COMPONENTS: usize = 20;

/// Which setter family fills a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKind {
    State,
    Saturation,
}

/// Scalar fields of a [`PropertyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prop {
    // one-phase / mixture state
    Beta,
    Cp,
    Cv,
    D,
    DdDpH,
    DdDhP,
    H,
    U,
    Kappa,
    P,
    S,
    T,
    DTDpH,
    DTDhP,
    Eta,
    Lambda,
    Pr,
    A,
    // saturation
    Ps,
    Ts,
    Dl,
    Dv,
    Hl,
    Hv,
    Sl,
    Sv,
    Sigma,
    DTsDp,
    DdlDp,
    DdvDp,
    DhlDp,
    DhvDp,
}

impl Prop {
    pub const COUNT: usize = 32;

    pub const ALL: [Prop; Prop::COUNT] = [
        Prop::Beta,
        Prop::Cp,
        Prop::Cv,
        Prop::D,
        Prop::DdDpH,
        Prop::DdDhP,
        Prop::H,
        Prop::U,
        Prop::Kappa,
        Prop::P,
        Prop::S,
        Prop::T,
        Prop::DTDpH,
        Prop::DTDhP,
        Prop::Eta,
        Prop::Lambda,
        Prop::Pr,
        Prop::A,
        Prop::Ps,
        Prop::Ts,
        Prop::Dl,
        Prop::Dv,
        Prop::Hl,
        Prop::Hv,
        Prop::Sl,
        Prop::Sv,
        Prop::Sigma,
        Prop::DTsDp,
        Prop::DdlDp,
        Prop::DdvDp,
        Prop::DhlDp,
        Prop::DhvDp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Prop::Beta => "beta",
            Prop::Cp => "cp",
            Prop::Cv => "cv",
            Prop::D => "d",
            Prop::DdDpH => "dd_dp_h",
            Prop::DdDhP => "dd_dh_p",
            Prop::H => "h",
            Prop::U => "u",
            Prop::Kappa => "kappa",
            Prop::P => "p",
            Prop::S => "s",
            Prop::T => "T",
            Prop::DTDpH => "dT_dp_h",
            Prop::DTDhP => "dT_dh_p",
            Prop::Eta => "eta",
            Prop::Lambda => "lambda",
            Prop::Pr => "Pr",
            Prop::A => "a",
            Prop::Ps => "ps",
            Prop::Ts => "Ts",
            Prop::Dl => "dl",
            Prop::Dv => "dv",
            Prop::Hl => "hl",
            Prop::Hv => "hv",
            Prop::Sl => "sl",
            Prop::Sv => "sv",
            Prop::Sigma => "sigma",
            Prop::DTsDp => "d_Ts_dp",
            Prop::DdlDp => "d_dl_dp",
            Prop::DdvDp => "d_dv_dp",
            Prop::DhlDp => "d_hl_dp",
            Prop::DhvDp => "d_hv_dp",
        }
    }

    pub fn from_name(name: &str) -> Option<Prop> {
        Prop::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn kind(self) -> PropKind {
        if self.index() >= Prop::Ps.index() {
            PropKind::Saturation
        } else {
            PropKind::State
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Handles of the dew and bubble states derived from a root state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DerivedRefs {
    dew_one_phase: Option<Handle>,
    dew_two_phase: Option<Handle>,
    bubble_one_phase: Option<Handle>,
    bubble_two_phase: Option<Handle>,
}

impl DerivedRefs {
    pub fn get(&self, endpoint: Endpoint, side: PhaseSide) -> Option<Handle> {
        *self.slot(endpoint, side)
    }

    pub fn set(&mut self, endpoint: Endpoint, side: PhaseSide, handle: Handle) {
        *self.slot_mut(endpoint, side) = Some(handle);
    }

    fn slot(&self, endpoint: Endpoint, side: PhaseSide) -> &Option<Handle> {
        match (endpoint, side) {
            (Endpoint::Dew, PhaseSide::OnePhase) => &self.dew_one_phase,
            (Endpoint::Dew, PhaseSide::TwoPhase) => &self.dew_two_phase,
            (Endpoint::Bubble, PhaseSide::OnePhase) => &self.bubble_one_phase,
            (Endpoint::Bubble, PhaseSide::TwoPhase) => &self.bubble_two_phase,
        }
    }

    fn slot_mut(&mut self, endpoint: Endpoint, side: PhaseSide) -> &mut Option<Handle> {
        match (endpoint, side) {
            (Endpoint::Dew, PhaseSide::OnePhase) => &mut self.dew_one_phase,
            (Endpoint::Dew, PhaseSide::TwoPhase) => &mut self.dew_two_phase,
            (Endpoint::Bubble, PhaseSide::OnePhase) => &mut self.bubble_one_phase,
            (Endpoint::Bubble, PhaseSide::TwoPhase) => &mut self.bubble_two_phase,
        }
    }
}

/// Saturation values a dew or bubble computation starts from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationPoint {
    pub ps: Real,
    pub hl: Real,
    pub hv: Real,
}

/// Thermodynamic fields for one state point.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    phase: Phase,
    values: [Option<Real>; Prop::COUNT],
    liquid_fractions: Option<Vec<Real>>,
    vapour_fractions: Option<Vec<Real>>,
    derived: DerivedRefs,
}

impl Default for PropertyRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyRecord {
    pub fn new() -> Self {
        Self {
            phase: Phase::Unknown,
            values: [None; Prop::COUNT],
            liquid_fractions: None,
            vapour_fractions: None,
            derived: DerivedRefs::default(),
        }
    }

    /// Read a field; unset fields are a contract violation.
    pub fn get(&self, prop: Prop) -> FluidResult<Real> {
        self.values[prop.index()].ok_or_else(|| {
            FluidError::contract(format!(
                "state setter did not set the {} field",
                prop.name()
            ))
        })
    }

    pub fn cached(&self, prop: Prop) -> Option<Real> {
        self.values[prop.index()]
    }

    pub fn is_set(&self, prop: Prop) -> bool {
        self.values[prop.index()].is_some()
    }

    pub fn set(&mut self, prop: Prop, value: Real) {
        self.values[prop.index()] = Some(value);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Forget everything a state setter computed; cross-references survive.
    pub fn clear_state(&mut self) {
        self.phase = Phase::Unknown;
        self.values = [None; Prop::COUNT];
        self.liquid_fractions = None;
        self.vapour_fractions = None;
    }

    /// Forget the saturation fields only.
    pub fn clear_saturation(&mut self) {
        for prop in Prop::ALL {
            if prop.kind() == PropKind::Saturation {
                self.values[prop.index()] = None;
            }
        }
    }

    pub fn liquid_fractions(&self) -> FluidResult<&[Real]> {
        self.liquid_fractions
            .as_deref()
            .ok_or_else(|| FluidError::contract("state setter did not set the x field"))
    }

    pub fn vapour_fractions(&self) -> FluidResult<&[Real]> {
        self.vapour_fractions
            .as_deref()
            .ok_or_else(|| FluidError::contract("state setter did not set the y field"))
    }

    pub fn has_composition(&self) -> bool {
        self.liquid_fractions.is_some() && self.vapour_fractions.is_some()
    }

    pub fn set_composition(&mut self, x: Vec<Real>, y: Vec<Real>) -> FluidResult<()> {
        if x.len() > MAX_COMPONENTS || y.len() > MAX_COMPONENTS {
            return Err(FluidError::InvalidArg {
                what: "too many mixture components",
            });
        }
        self.liquid_fractions = Some(x);
        self.vapour_fractions = Some(y);
        Ok(())
    }

    pub fn derived(&self) -> &DerivedRefs {
        &self.derived
    }

    pub fn derived_mut(&mut self) -> &mut DerivedRefs {
        &mut self.derived
    }

    pub fn saturation_point(&self) -> FluidResult<SaturationPoint> {
        Ok(SaturationPoint {
            ps: self.get(Prop::Ps)?,
            hl: self.get(Prop::Hl)?,
            hv: self.get(Prop::Hv)?,
        })
    }

    /// Fill `dd_dp_h` and `dd_dh_p` from `beta`, `kappa`, `cp`, `d` and `T`.
    ///
    /// Returns `false` (leaving both unset) when `cp` or `d` is zero.
    pub fn compute_derivatives(&mut self) -> FluidResult<bool> {
        let cp = self.get(Prop::Cp)?;
        let d = self.get(Prop::D)?;
        if cp == 0.0 || d == 0.0 {
            return Ok(false);
        }
        let beta = self.get(Prop::Beta)?;
        let kappa = self.get(Prop::Kappa)?;
        let t = self.get(Prop::T)?;
        self.set(
            Prop::DdDpH,
            -(t * beta * beta - beta - kappa * d * cp) / cp,
        );
        self.set(Prop::DdDhP, -beta * d / cp);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xm_core::{Tolerances, nearly_equal};

    #[test]
    fn every_field_starts_unset() {
        let record = PropertyRecord::new();
        for prop in Prop::ALL {
            let err = record.get(prop).unwrap_err();
            assert!(
                matches!(&err, FluidError::ContractViolation { what } if what.contains(prop.name())),
                "{prop:?}: {err}"
            );
        }
        assert!(record.liquid_fractions().is_err());
        assert!(record.vapour_fractions().is_err());
        assert_eq!(record.phase(), Phase::Unknown);
    }

    #[test]
    fn prop_table_is_consistent() {
        for (i, prop) in Prop::ALL.iter().enumerate() {
            assert_eq!(prop.index(), i);
            assert_eq!(Prop::from_name(prop.name()), Some(*prop));
        }
        assert_eq!(Prop::D.kind(), PropKind::State);
        assert_eq!(Prop::A.kind(), PropKind::State);
        assert_eq!(Prop::Ps.kind(), PropKind::Saturation);
        assert_eq!(Prop::DhvDp.kind(), PropKind::Saturation);
    }

    #[test]
    fn clear_state_keeps_cross_references() {
        let mut record = PropertyRecord::new();
        let h = Handle::new(7).unwrap();
        record.set(Prop::P, 1e5);
        record.set_phase(Phase::OnePhase);
        record
            .derived_mut()
            .set(Endpoint::Dew, PhaseSide::TwoPhase, h);

        record.clear_state();

        assert!(!record.is_set(Prop::P));
        assert_eq!(record.phase(), Phase::Unknown);
        assert_eq!(
            record.derived().get(Endpoint::Dew, PhaseSide::TwoPhase),
            Some(h)
        );
        assert_eq!(record.derived().get(Endpoint::Bubble, PhaseSide::TwoPhase), None);
    }

    #[test]
    fn clear_saturation_leaves_state_fields() {
        let mut record = PropertyRecord::new();
        record.set(Prop::P, 1e5);
        record.set(Prop::Ps, 1e5);
        record.clear_saturation();
        assert!(record.is_set(Prop::P));
        assert!(!record.is_set(Prop::Ps));
    }

    #[test]
    fn composition_arity_is_bounded() {
        let mut record = PropertyRecord::new();
        assert!(
            record
                .set_composition(vec![0.5; MAX_COMPONENTS + 1], vec![0.5])
                .is_err()
        );
        record.set_composition(vec![0.4, 0.6], vec![0.7, 0.3]).unwrap();
        assert_eq!(record.liquid_fractions().unwrap(), &[0.4, 0.6]);
        assert!(record.has_composition());
    }

    #[test]
    fn derivatives_for_ideal_gas_reduce_to_closed_form() {
        // Ideal gas: beta = 1/T, kappa = 1/p, so dd_dp_h = d/p and dd_dh_p = -d/(T cp).
        let (p, t, d, cp) = (1e5, 300.0, 1.16, 1040.0);
        let mut record = PropertyRecord::new();
        record.set(Prop::Cp, cp);
        record.set(Prop::D, d);
        record.set(Prop::T, t);
        record.set(Prop::Beta, 1.0 / t);
        record.set(Prop::Kappa, 1.0 / p);

        assert!(record.compute_derivatives().unwrap());

        let tol = Tolerances::default();
        assert!(nearly_equal(record.get(Prop::DdDpH).unwrap(), d / p, tol));
        assert!(nearly_equal(
            record.get(Prop::DdDhP).unwrap(),
            -d / (t * cp),
            tol
        ));
    }

    #[test]
    fn derivatives_skipped_for_zero_cp() {
        let mut record = PropertyRecord::new();
        record.set(Prop::Cp, 0.0);
        record.set(Prop::D, 1.0);
        assert!(!record.compute_derivatives().unwrap());
        assert!(!record.is_set(Prop::DdDpH));
    }
}
