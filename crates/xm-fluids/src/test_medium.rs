//! Water-like analytic test fluid.
//!
//! Liquid: constant cp, density linear in p and T. Vapour: ideal gas anchored on
//! the saturation line. Saturation follows a Clausius-Clapeyron curve through
//! (1 bar, 373.15 K) with a Watson-type latent heat. Accuracy is a few percent
//! near ambient water conditions, enough to exercise every code path.

use crate::backend::SolverModel;
use crate::constants::FluidConstants;
use crate::error::{FluidError, FluidResult};
use crate::key::FluidKey;
use crate::record::{Prop, PropertyRecord};
use crate::state::{Phase, StateInput};

const T_DATUM: f64 = 273.15;
const CP_L: f64 = 4184.0;
const CV_L: f64 = 4130.0;
const RHO_0: f64 = 1000.0;
const T_RHO: f64 = 293.15;
const BETA_L: f64 = 2.0e-4;
const KAPPA_L: f64 = 4.5e-10;
const P_0: f64 = 1.0e5;
const TS_0: f64 = 373.15;
const HLV_0: f64 = 2.257e6;
const R_V: f64 = 461.5;
const CP_V: f64 = 2080.0;
const P_TRIPLE: f64 = 611.657;
const T_TRIPLE: f64 = 273.16;
const TC: f64 = 647.096;
const PC: f64 = 22.064e6;
const DC: f64 = 322.0;
const MOLAR_MASS: f64 = 0.018_015_268;

/// Saturation line at one pressure.
#[derive(Debug, Clone, Copy)]
struct Saturation {
    p: f64,
    ts: f64,
    dl: f64,
    dv: f64,
    hl: f64,
    hv: f64,
    sl: f64,
    sv: f64,
    sigma: f64,
    d_ts_dp: f64,
    d_dl_dp: f64,
    d_dv_dp: f64,
    d_hl_dp: f64,
    d_hv_dp: f64,
}

/// Where a one-phase or two-phase state lies.
#[derive(Debug, Clone, Copy)]
enum Branch {
    Liquid { t: f64 },
    Vapour { t: f64 },
    Mixed { h: f64 },
}

#[derive(Debug, Clone)]
pub struct TestMedium {
    constants: FluidConstants,
}

impl TestMedium {
    pub fn new(key: &FluidKey) -> FluidResult<Self> {
        if key.composition().is_some() {
            return Err(FluidError::InvalidArg {
                what: "TestMedium supports pure fluids only",
            });
        }
        Ok(Self {
            constants: FluidConstants::from_si(MOLAR_MASS, TC, PC, DC),
        })
    }

    fn liquid_density(p: f64, t: f64) -> f64 {
        RHO_0 * (1.0 - BETA_L * (t - T_RHO) + KAPPA_L * (p - P_0))
    }

    /// Saturation line, or `None` outside the triple-to-critical pressure range.
    fn saturation_opt(p: f64) -> Option<Saturation> {
        if !(P_TRIPLE..PC).contains(&p) {
            return None;
        }
        let ts = 1.0 / (1.0 / TS_0 - (R_V / HLV_0) * (p / P_0).ln());
        let d_ts_dp = ts * ts * (R_V / HLV_0) / p;

        let hlv = HLV_0 * ((TC - ts) / (TC - TS_0)).powf(0.38);
        let dhlv_dts = -0.38 * hlv / (TC - ts);

        let hl = CP_L * (ts - T_DATUM);
        let d_hl_dp = CP_L * d_ts_dp;
        let sl = CP_L * (ts / T_DATUM).ln();
        let tau = 1.0 - ts / TC;

        Some(Saturation {
            p,
            ts,
            dl: Self::liquid_density(p, ts),
            dv: p / (R_V * ts),
            hl,
            hv: hl + hlv,
            sl,
            sv: sl + hlv / ts,
            sigma: 0.2358 * tau.powf(1.256) * (1.0 - 0.625 * tau),
            d_ts_dp,
            d_dl_dp: RHO_0 * (KAPPA_L - BETA_L * d_ts_dp),
            d_dv_dp: 1.0 / (R_V * ts) - p * d_ts_dp / (R_V * ts * ts),
            d_hl_dp,
            d_hv_dp: d_hl_dp + dhlv_dts * d_ts_dp,
        })
    }

    fn saturation(p: f64, function: &'static str) -> FluidResult<Saturation> {
        Self::saturation_opt(p).ok_or_else(|| {
            FluidError::failed(
                function,
                format!("p = {p}"),
                "pressure outside the saturation range",
            )
        })
    }

    fn write_saturation(sat: &Saturation, out: &mut PropertyRecord) {
        out.set(Prop::Ps, sat.p);
        out.set(Prop::Ts, sat.ts);
        out.set(Prop::Dl, sat.dl);
        out.set(Prop::Dv, sat.dv);
        out.set(Prop::Hl, sat.hl);
        out.set(Prop::Hv, sat.hv);
        out.set(Prop::Sl, sat.sl);
        out.set(Prop::Sv, sat.sv);
        out.set(Prop::Sigma, sat.sigma);
        out.set(Prop::DTsDp, sat.d_ts_dp);
        out.set(Prop::DdlDp, sat.d_dl_dp);
        out.set(Prop::DdvDp, sat.d_dv_dp);
        out.set(Prop::DhlDp, sat.d_hl_dp);
        out.set(Prop::DhvDp, sat.d_hv_dp);
    }

    fn fill(
        &self,
        function: &'static str,
        p: f64,
        branch: Branch,
        sat: Option<&Saturation>,
        out: &mut PropertyRecord,
    ) -> FluidResult<()> {
        match (branch, sat) {
            (Branch::Liquid { t }, _) => Self::liquid(function, p, t, out)?,
            (Branch::Vapour { t }, Some(sat)) => Self::vapour(function, p, t, sat, out)?,
            (Branch::Mixed { h }, Some(sat)) => Self::two_phase(function, h, sat, out)?,
            (_, None) => {
                return Err(FluidError::failed(
                    function,
                    format!("p = {p}"),
                    "vapour and two-phase states need a saturation line",
                ));
            }
        }
        if let Some(sat) = sat {
            Self::write_saturation(sat, out);
        }
        Ok(())
    }

    fn liquid(function: &'static str, p: f64, t: f64, out: &mut PropertyRecord) -> FluidResult<()> {
        let d = Self::liquid_density(p, t);
        if t <= 0.0 || d <= 0.0 {
            return Err(FluidError::failed(
                function,
                format!("p = {p}, T = {t}"),
                "liquid state out of range",
            ));
        }
        let h = CP_L * (t - T_DATUM);
        let eta = 1.002e-3 * (-0.0215 * (t - T_RHO)).exp();
        let lambda = 0.598 + 1.5e-3 * (t - T_RHO);

        out.set_phase(Phase::OnePhase);
        out.set(Prop::P, p);
        out.set(Prop::T, t);
        out.set(Prop::D, d);
        out.set(Prop::H, h);
        out.set(Prop::S, CP_L * (t / T_DATUM).ln());
        out.set(Prop::U, h - p / d);
        out.set(Prop::Cp, CP_L);
        out.set(Prop::Cv, CV_L);
        out.set(Prop::Beta, RHO_0 * BETA_L / d);
        out.set(Prop::Kappa, RHO_0 * KAPPA_L / d);
        out.set(Prop::DdDpH, RHO_0 * KAPPA_L);
        out.set(Prop::DdDhP, -RHO_0 * BETA_L / CP_L);
        out.set(Prop::DTDpH, 0.0);
        out.set(Prop::DTDhP, 1.0 / CP_L);
        out.set(Prop::A, (1.0 / (RHO_0 * KAPPA_L)).sqrt());
        out.set(Prop::Eta, eta);
        out.set(Prop::Lambda, lambda);
        out.set(Prop::Pr, CP_L * eta / lambda);
        Ok(())
    }

    fn vapour(
        function: &'static str,
        p: f64,
        t: f64,
        sat: &Saturation,
        out: &mut PropertyRecord,
    ) -> FluidResult<()> {
        if t <= 0.0 {
            return Err(FluidError::failed(
                function,
                format!("p = {p}, T = {t}"),
                "vapour state out of range",
            ));
        }
        let d = p / (R_V * t);
        let h = sat.hv + CP_V * (t - sat.ts);
        let cv = CP_V - R_V;
        let dt_dp_h = sat.d_ts_dp - sat.d_hv_dp / CP_V;
        let eta = 1.2e-5 + 4.0e-8 * (t - TS_0);
        let lambda = 0.025 + 8.0e-5 * (t - TS_0);

        out.set_phase(Phase::OnePhase);
        out.set(Prop::P, p);
        out.set(Prop::T, t);
        out.set(Prop::D, d);
        out.set(Prop::H, h);
        out.set(Prop::S, sat.sv + CP_V * (t / sat.ts).ln());
        out.set(Prop::U, h - p / d);
        out.set(Prop::Cp, CP_V);
        out.set(Prop::Cv, cv);
        out.set(Prop::Beta, 1.0 / t);
        out.set(Prop::Kappa, 1.0 / p);
        out.set(Prop::DdDpH, d / p - d / t * dt_dp_h);
        out.set(Prop::DdDhP, -d / (t * CP_V));
        out.set(Prop::DTDpH, dt_dp_h);
        out.set(Prop::DTDhP, 1.0 / CP_V);
        out.set(Prop::A, (CP_V / cv * R_V * t).sqrt());
        out.set(Prop::Eta, eta);
        out.set(Prop::Lambda, lambda);
        out.set(Prop::Pr, CP_V * eta / lambda);
        Ok(())
    }

    fn two_phase(
        function: &'static str,
        h: f64,
        sat: &Saturation,
        out: &mut PropertyRecord,
    ) -> FluidResult<()> {
        let hlv = sat.hv - sat.hl;
        let x = (h - sat.hl) / hlv;
        if !(0.0..=1.0).contains(&x) {
            return Err(FluidError::failed(
                function,
                format!("p = {}, h = {h}", sat.p),
                "enthalpy outside the two-phase region",
            ));
        }
        let vl = 1.0 / sat.dl;
        let vv = 1.0 / sat.dv;
        let v = vl + x * (vv - vl);
        let d = 1.0 / v;
        let dx_dp = -(sat.d_hl_dp + x * (sat.d_hv_dp - sat.d_hl_dp)) / hlv;
        let dv_dp = (1.0 - x) * (-sat.d_dl_dp * vl * vl)
            + x * (-sat.d_dv_dp * vv * vv)
            + (vv - vl) * dx_dp;

        out.set_phase(Phase::TwoPhase);
        out.set(Prop::P, sat.p);
        out.set(Prop::T, sat.ts);
        out.set(Prop::D, d);
        out.set(Prop::H, h);
        out.set(Prop::S, sat.sl + x * (sat.sv - sat.sl));
        out.set(Prop::U, h - sat.p * v);
        out.set(Prop::DdDpH, -d * d * dv_dp);
        out.set(Prop::DdDhP, -d * d * (vv - vl) / hlv);
        out.set(Prop::DTDpH, sat.d_ts_dp);
        out.set(Prop::DTDhP, 0.0);
        Ok(())
    }

    fn check_pressure(function: &'static str, inputs: String, p: f64) -> FluidResult<()> {
        if p <= 0.0 {
            return Err(FluidError::failed(function, inputs, "pressure must be positive"));
        }
        Ok(())
    }

    fn one_phase_from_h(h: f64, sat: Option<&Saturation>) -> Branch {
        match sat {
            Some(sat) if h >= sat.hv || h > 0.5 * (sat.hl + sat.hv) => Branch::Vapour {
                t: sat.ts + (h - sat.hv) / CP_V,
            },
            _ => Branch::Liquid {
                t: T_DATUM + h / CP_L,
            },
        }
    }

    fn one_phase_from_s(s: f64, sat: Option<&Saturation>) -> Branch {
        match sat {
            Some(sat) if s >= sat.sv || s > 0.5 * (sat.sl + sat.sv) => Branch::Vapour {
                t: sat.ts * ((s - sat.sv) / CP_V).exp(),
            },
            _ => Branch::Liquid {
                t: T_DATUM * (s / CP_L).exp(),
            },
        }
    }
}

impl SolverModel for TestMedium {
    fn label(&self) -> &'static str {
        "TestMedium"
    }

    fn constants(&self) -> &FluidConstants {
        &self.constants
    }

    fn set_state_dt(&self, d: f64, t: f64, _phase: Phase, out: &mut PropertyRecord) -> FluidResult<()> {
        const F: &str = "setState_dT";
        let inputs = StateInput::DT { d, t }.describe();
        if d <= 0.0 || t <= 0.0 {
            return Err(FluidError::failed(F, inputs, "density and temperature must be positive"));
        }

        let p_liquid = P_0 + (d / RHO_0 - 1.0 + BETA_L * (t - T_RHO)) / KAPPA_L;
        if p_liquid > 0.0 {
            let sat = Self::saturation_opt(p_liquid);
            if sat.is_none_or(|s| t <= s.ts) {
                return self.fill(F, p_liquid, Branch::Liquid { t }, sat.as_ref(), out);
            }
        }

        let p_vapour = d * R_V * t;
        if let Some(sat) = Self::saturation_opt(p_vapour) {
            if t >= sat.ts {
                return self.fill(F, p_vapour, Branch::Vapour { t }, Some(&sat), out);
            }
        }

        Err(FluidError::failed(F, inputs, "no single-phase state matches"))
    }

    fn set_state_ph(&self, p: f64, h: f64, phase: Phase, out: &mut PropertyRecord) -> FluidResult<()> {
        const F: &str = "setState_ph";
        Self::check_pressure(F, StateInput::PH { p, h }.describe(), p)?;
        let sat = Self::saturation_opt(p);
        let branch = match (phase, sat.as_ref()) {
            (Phase::TwoPhase, _) => Branch::Mixed { h },
            (Phase::Unknown, Some(s)) if s.hl < h && h < s.hv => Branch::Mixed { h },
            _ => Self::one_phase_from_h(h, sat.as_ref()),
        };
        self.fill(F, p, branch, sat.as_ref(), out)
    }

    fn set_state_ps(&self, p: f64, s: f64, phase: Phase, out: &mut PropertyRecord) -> FluidResult<()> {
        const F: &str = "setState_ps";
        Self::check_pressure(F, StateInput::PS { p, s }.describe(), p)?;
        let sat = Self::saturation_opt(p);
        let mixed = |sat: &Saturation| Branch::Mixed {
            h: sat.hl + (s - sat.sl) / (sat.sv - sat.sl) * (sat.hv - sat.hl),
        };
        let branch = match (phase, sat.as_ref()) {
            (Phase::TwoPhase, Some(st)) => mixed(st),
            (Phase::Unknown, Some(st)) if st.sl < s && s < st.sv => mixed(st),
            _ => Self::one_phase_from_s(s, sat.as_ref()),
        };
        self.fill(F, p, branch, sat.as_ref(), out)
    }

    fn set_state_pt(&self, p: f64, t: f64, out: &mut PropertyRecord) -> FluidResult<()> {
        const F: &str = "setState_pT";
        Self::check_pressure(F, StateInput::PT { p, t }.describe(), p)?;
        let sat = Self::saturation_opt(p);
        let branch = match sat.as_ref() {
            Some(s) if t > s.ts => Branch::Vapour { t },
            _ => Branch::Liquid { t },
        };
        self.fill(F, p, branch, sat.as_ref(), out)
    }

    fn set_sat_p(&self, p: f64, out: &mut PropertyRecord) -> FluidResult<()> {
        let sat = Self::saturation(p, "setSat_p")?;
        Self::write_saturation(&sat, out);
        Ok(())
    }

    fn set_sat_t(&self, t: f64, out: &mut PropertyRecord) -> FluidResult<()> {
        if !(T_TRIPLE..TC).contains(&t) {
            return Err(FluidError::failed(
                "setSat_T",
                format!("T = {t}"),
                "temperature outside the saturation range",
            ));
        }
        let p = P_0 * ((HLV_0 / R_V) * (1.0 / TS_0 - 1.0 / t)).exp();
        let sat = Self::saturation(p, "setSat_T")?;
        Self::write_saturation(&sat, out);
        Ok(())
    }

    fn has_saturation(&self) -> bool {
        true
    }
}
