//! Incompressible liquids with constant density and specific heat.
//!
//! Only pressure-based inputs are meaningful: density carries no pressure
//! information and entropy is a function of temperature alone, so `dT` and
//! `ps` fall back to the unsupported defaults.

use crate::backend::SolverModel;
use crate::constants::FluidConstants;
use crate::error::{FluidError, FluidResult};
use crate::key::FluidKey;
use crate::record::{Prop, PropertyRecord};
use crate::state::{Phase, StateInput};

const T_REF: f64 = 293.15;
const P_REF: f64 = 101_325.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct LiquidData {
    d: f64,
    cp: f64,
    eta: f64,
    lambda: f64,
    molar_mass: f64,
    tc: f64,
    pc: f64,
    dc: f64,
}

fn lookup(name: &str) -> Option<LiquidData> {
    match name.trim().to_lowercase().as_str() {
        "water" | "h2o" => Some(LiquidData {
            d: 998.2,
            cp: 4182.0,
            eta: 1.0e-3,
            lambda: 0.6,
            molar_mass: 0.018_015,
            tc: 647.096,
            pc: 22.064e6,
            dc: 322.0,
        }),
        "ethanol" => Some(LiquidData {
            d: 789.0,
            cp: 2440.0,
            eta: 1.2e-3,
            lambda: 0.171,
            molar_mass: 0.046_07,
            tc: 514.7,
            pc: 6.137e6,
            dc: 276.0,
        }),
        "glycerol" => Some(LiquidData {
            d: 1261.0,
            cp: 2430.0,
            eta: 1.41,
            lambda: 0.285,
            molar_mass: 0.092_09,
            tc: 850.0,
            pc: 7.5e6,
            dc: 350.0,
        }),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct Incompressible {
    data: LiquidData,
    constants: FluidConstants,
}

impl Incompressible {
    pub fn new(key: &FluidKey) -> FluidResult<Self> {
        if key.composition().is_some() {
            return Err(FluidError::InvalidArg {
                what: "Incompressible supports pure liquids only",
            });
        }
        let data = lookup(key.substance()).ok_or_else(|| FluidError::UnknownSubstance {
            library: key.library().to_owned(),
            substance: key.substance().to_owned(),
        })?;
        Ok(Self {
            data,
            constants: FluidConstants::from_si(data.molar_mass, data.tc, data.pc, data.dc),
        })
    }

    fn fill(&self, function: &'static str, p: f64, t: f64, phase: Phase, out: &mut PropertyRecord) -> FluidResult<()> {
        if phase == Phase::TwoPhase {
            return Err(FluidError::failed(
                function,
                StateInput::PT { p, t }.describe(),
                "incompressible liquids have no two-phase region",
            ));
        }
        if t <= 0.0 {
            return Err(FluidError::failed(
                function,
                StateInput::PT { p, t }.describe(),
                "temperature must be positive",
            ));
        }
        let LiquidData {
            d,
            cp,
            eta,
            lambda,
            ..
        } = self.data;
        let h = cp * (t - T_REF) + (p - P_REF) / d;

        out.set_phase(Phase::OnePhase);
        out.set(Prop::P, p);
        out.set(Prop::T, t);
        out.set(Prop::D, d);
        out.set(Prop::H, h);
        out.set(Prop::S, cp * (t / T_REF).ln());
        out.set(Prop::U, h - p / d);
        out.set(Prop::Cp, cp);
        out.set(Prop::Cv, cp);
        out.set(Prop::Beta, 0.0);
        out.set(Prop::Kappa, 0.0);
        out.compute_derivatives()?;
        out.set(Prop::DTDpH, -1.0 / (d * cp));
        out.set(Prop::DTDhP, 1.0 / cp);
        out.set(Prop::Eta, eta);
        out.set(Prop::Lambda, lambda);
        out.set(Prop::Pr, cp * eta / lambda);
        Ok(())
    }
}

impl SolverModel for Incompressible {
    fn label(&self) -> &'static str {
        "Incompressible"
    }

    fn constants(&self) -> &FluidConstants {
        &self.constants
    }

    fn set_state_ph(&self, p: f64, h: f64, phase: Phase, out: &mut PropertyRecord) -> FluidResult<()> {
        let t = T_REF + (h - (p - P_REF) / self.data.d) / self.data.cp;
        self.fill("setState_ph", p, t, phase, out)
    }

    fn set_state_pt(&self, p: f64, t: f64, out: &mut PropertyRecord) -> FluidResult<()> {
        self.fill("setState_pT", p, t, Phase::OnePhase, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::state::StateInput;
    use xm_core::{Tolerances, nearly_equal};

    fn water() -> Backend {
        Backend::new(FluidKey::new("Incompressible.Table", "water")).unwrap()
    }

    #[test]
    fn density_is_constant() {
        let b = water();
        let mut rec = PropertyRecord::new();
        b.set_state(StateInput::PT { p: 5e5, t: 330.0 }, Phase::Unknown, &mut rec)
            .unwrap();
        assert_eq!(rec.get(Prop::D).unwrap(), 998.2);
        assert_eq!(rec.get(Prop::DdDpH).unwrap(), 0.0);
        assert_eq!(rec.get(Prop::DdDhP).unwrap(), 0.0);
    }

    #[test]
    fn ph_inverts_pt() {
        let b = water();
        let mut rec = PropertyRecord::new();
        b.set_state(StateInput::PT { p: 2e5, t: 310.0 }, Phase::Unknown, &mut rec)
            .unwrap();
        let h = rec.get(Prop::H).unwrap();
        b.set_state(StateInput::PH { p: 2e5, h }, Phase::Unknown, &mut rec)
            .unwrap();
        let tol = Tolerances {
            abs: 1e-9,
            rel: 1e-12,
        };
        assert!(nearly_equal(rec.get(Prop::T).unwrap(), 310.0, tol));
    }

    #[test]
    fn density_temperature_input_is_unsupported() {
        let mut rec = PropertyRecord::new();
        let err = water()
            .set_state(StateInput::DT { d: 998.2, t: 300.0 }, Phase::Unknown, &mut rec)
            .unwrap_err();
        assert_eq!(
            err,
            FluidError::UnsupportedOperation {
                function: "setState_dT",
                backend: "Incompressible"
            }
        );
    }

    #[test]
    fn dew_state_is_unsupported() {
        let b = water();
        let root = PropertyRecord::new();
        let mut target = PropertyRecord::new();
        let err = b
            .set_dew_state(crate::state::PhaseSide::OnePhase, &root, &mut target)
            .unwrap_err();
        assert!(matches!(err, FluidError::UnsupportedOperation { function: "setDewState", .. }));
    }
}
