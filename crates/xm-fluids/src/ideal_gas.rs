//! Calorically perfect ideal gases and their mixtures.
//!
//! Mixture properties use mole-fraction weighting (Kay's rule for the critical
//! point). There is no condensed phase, so saturation queries are unsupported.

use xm_core::units::constants::R_UNIVERSAL;

use crate::backend::SolverModel;
use crate::constants::FluidConstants;
use crate::error::{FluidError, FluidResult};
use crate::key::FluidKey;
use crate::record::{Prop, PropertyRecord};
use crate::state::{Phase, StateInput};

/// Reference temperature for h = 0, s = 0 [K].
const T_REF: f64 = 298.15;
/// Reference pressure for s = 0 [Pa].
const P_REF: f64 = 101_325.0;

/// Tabulated gas: molar mass [kg/mol], molar cp [J/(mol·K)], Tc [K], pc [Pa], dc [kg/m³].
#[derive(Debug, Clone, Copy, PartialEq)]
struct GasData {
    molar_mass: f64,
    cp_molar: f64,
    tc: f64,
    pc: f64,
    dc: f64,
}

const fn gas(molar_mass: f64, cp_molar: f64, tc: f64, pc: f64, dc: f64) -> GasData {
    GasData {
        molar_mass,
        cp_molar,
        tc,
        pc,
        dc,
    }
}

fn lookup(name: &str) -> Option<GasData> {
    match name.trim().to_lowercase().as_str() {
        "helium" | "he" => Some(gas(4.0026e-3, 20.786, 5.1953, 227_460.0, 69.58)),
        "nitrogen" | "n2" => Some(gas(28.0134e-3, 29.12, 126.192, 3.3958e6, 313.3)),
        "air" => Some(gas(28.9647e-3, 29.10, 132.53, 3.786e6, 342.68)),
        "argon" | "ar" => Some(gas(39.948e-3, 20.786, 150.687, 4.863e6, 535.6)),
        "hydrogen" | "h2" => Some(gas(2.01588e-3, 28.84, 33.145, 1.2964e6, 31.262)),
        "oxygen" | "o2" => Some(gas(31.9988e-3, 29.38, 154.581, 5.043e6, 436.14)),
        "methane" | "ch4" => Some(gas(16.0428e-3, 35.69, 190.564, 4.5992e6, 162.66)),
        "carbondioxide" | "co2" => Some(gas(44.0095e-3, 37.12, 304.128, 7.3773e6, 467.6)),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct IdealGas {
    constants: FluidConstants,
    /// Specific gas constant [J/(kg·K)].
    r: f64,
    /// Specific heat at constant pressure [J/(kg·K)].
    cp: f64,
    /// Mole fractions, present for mixtures only.
    fractions: Option<Vec<f64>>,
}

impl IdealGas {
    pub fn new(key: &FluidKey) -> FluidResult<Self> {
        let unknown = |substance: &str| FluidError::UnknownSubstance {
            library: key.library().to_owned(),
            substance: substance.to_owned(),
        };

        let components: Vec<(GasData, f64)> = match key.composition() {
            Some(comp) => comp
                .iter()
                .map(|(name, y)| lookup(name).map(|g| (g, y)).ok_or_else(|| unknown(name)))
                .collect::<FluidResult<_>>()?,
            None => vec![(lookup(key.substance()).ok_or_else(|| unknown(key.substance()))?, 1.0)],
        };

        let weighted = |f: fn(&GasData) -> f64| -> f64 {
            components.iter().map(|(g, y)| y * f(g)).sum()
        };
        let molar_mass = weighted(|g| g.molar_mass);
        let cp_molar = weighted(|g| g.cp_molar);
        let molar_volume_c = weighted(|g| g.molar_mass / g.dc);

        Ok(Self {
            constants: FluidConstants::from_si(
                molar_mass,
                weighted(|g| g.tc),
                weighted(|g| g.pc),
                molar_mass / molar_volume_c,
            ),
            r: R_UNIVERSAL / molar_mass,
            cp: cp_molar / molar_mass,
            fractions: key.composition().map(|c| c.fractions()),
        })
    }

    fn fill(&self, function: &'static str, p: f64, t: f64, phase: Phase, out: &mut PropertyRecord) -> FluidResult<()> {
        if phase == Phase::TwoPhase {
            return Err(FluidError::failed(
                function,
                StateInput::PT { p, t }.describe(),
                "an ideal gas has no two-phase region",
            ));
        }
        if !(p > 0.0 && t > 0.0) {
            return Err(FluidError::failed(
                function,
                StateInput::PT { p, t }.describe(),
                "pressure and temperature must be positive",
            ));
        }
        let cv = self.cp - self.r;
        let d = p / (self.r * t);
        let h = self.cp * (t - T_REF);

        out.set_phase(Phase::OnePhase);
        out.set(Prop::P, p);
        out.set(Prop::T, t);
        out.set(Prop::D, d);
        out.set(Prop::H, h);
        out.set(Prop::S, self.cp * (t / T_REF).ln() - self.r * (p / P_REF).ln());
        out.set(Prop::U, h - self.r * t);
        out.set(Prop::Cp, self.cp);
        out.set(Prop::Cv, cv);
        out.set(Prop::Beta, 1.0 / t);
        out.set(Prop::Kappa, 1.0 / p);
        out.compute_derivatives()?;
        out.set(Prop::DTDpH, 0.0);
        out.set(Prop::DTDhP, 1.0 / self.cp);
        out.set(Prop::A, (self.cp / cv * self.r * t).sqrt());
        if let Some(fractions) = &self.fractions {
            out.set_composition(fractions.clone(), fractions.clone())?;
        }
        Ok(())
    }
}

impl SolverModel for IdealGas {
    fn label(&self) -> &'static str {
        "IdealGas"
    }

    fn constants(&self) -> &FluidConstants {
        &self.constants
    }

    fn set_state_dt(&self, d: f64, t: f64, phase: Phase, out: &mut PropertyRecord) -> FluidResult<()> {
        self.fill("setState_dT", d * self.r * t, t, phase, out)
    }

    fn set_state_ph(&self, p: f64, h: f64, phase: Phase, out: &mut PropertyRecord) -> FluidResult<()> {
        self.fill("setState_ph", p, T_REF + h / self.cp, phase, out)
    }

    fn set_state_ps(&self, p: f64, s: f64, phase: Phase, out: &mut PropertyRecord) -> FluidResult<()> {
        if p <= 0.0 {
            return Err(FluidError::failed(
                "setState_ps",
                StateInput::PS { p, s }.describe(),
                "pressure must be positive",
            ));
        }
        let t = T_REF * ((s + self.r * (p / P_REF).ln()) / self.cp).exp();
        self.fill("setState_ps", p, t, phase, out)
    }

    fn set_state_pt(&self, p: f64, t: f64, out: &mut PropertyRecord) -> FluidResult<()> {
        self.fill("setState_pT", p, t, Phase::OnePhase, out)
    }
}
