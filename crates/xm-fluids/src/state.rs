//! State-defining inputs, input-pair selectors and phase tags.

use crate::error::{FluidError, FluidResult};
use xm_core::{Real, ensure_finite};

/// Specific enthalpy [J/kg].
pub type SpecEnthalpy = f64;

/// Specific entropy [J/(kg·K)].
pub type SpecEntropy = f64;

/// Phase tag carried by a property record and used as a phase hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Not known; the backend decides.
    #[default]
    Unknown,
    OnePhase,
    TwoPhase,
}

impl Phase {
    pub fn code(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::OnePhase => 1,
            Self::TwoPhase => 2,
        }
    }

    pub fn from_code(code: i32) -> FluidResult<Self> {
        match code {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::OnePhase),
            2 => Ok(Self::TwoPhase),
            other => Err(FluidError::contract(format!("invalid phase code {other}"))),
        }
    }
}

/// Side of the saturation boundary a dew or bubble state is evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseSide {
    OnePhase,
    TwoPhase,
}

impl PhaseSide {
    pub fn code(self) -> i32 {
        self.phase().code()
    }

    /// Only 1 and 2 are valid; anything else is a caller bug.
    pub fn from_code(code: i32) -> FluidResult<Self> {
        match code {
            1 => Ok(Self::OnePhase),
            2 => Ok(Self::TwoPhase),
            other => Err(FluidError::contract(format!(
                "phase side must be 1 or 2, got {other}"
            ))),
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            Self::OnePhase => Phase::OnePhase,
            Self::TwoPhase => Phase::TwoPhase,
        }
    }
}

/// Saturated endpoint derived from a root state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Saturated vapour.
    Dew,
    /// Saturated liquid.
    Bubble,
}

impl Endpoint {
    pub fn label(self) -> &'static str {
        match self {
            Self::Dew => "dew",
            Self::Bubble => "bubble",
        }
    }
}

/// Input-pair selector used by the property queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputChoice {
    DT,
    PH,
    PS,
    PT,
}

impl InputChoice {
    pub fn code(self) -> i32 {
        match self {
            Self::DT => 0,
            Self::PH => 1,
            Self::PS => 2,
            Self::PT => 3,
        }
    }

    pub fn from_code(code: i32) -> FluidResult<Self> {
        match code {
            0 => Ok(Self::DT),
            1 => Ok(Self::PH),
            2 => Ok(Self::PS),
            3 => Ok(Self::PT),
            other => Err(FluidError::contract(format!(
                "wrong choice of inputs: {other}"
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DT => "d-T",
            Self::PH => "p-h",
            Self::PS => "p-s",
            Self::PT => "p-T",
        }
    }
}

/// State-defining input pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateInput {
    /// Density [kg/m³] and temperature [K].
    DT { d: Real, t: Real },
    /// Pressure [Pa] and specific enthalpy.
    PH { p: Real, h: SpecEnthalpy },
    /// Pressure [Pa] and specific entropy.
    PS { p: Real, s: SpecEntropy },
    /// Pressure [Pa] and temperature [K].
    PT { p: Real, t: Real },
}

impl StateInput {
    /// Name of the state setter, used in error messages.
    pub fn function_name(&self) -> &'static str {
        match self {
            Self::DT { .. } => "setState_dT",
            Self::PH { .. } => "setState_ph",
            Self::PS { .. } => "setState_ps",
            Self::PT { .. } => "setState_pT",
        }
    }

    /// Input values as quoted in failure messages.
    pub fn describe(&self) -> String {
        match *self {
            Self::DT { d, t } => format!("d = {d}, T = {t}"),
            Self::PH { p, h } => format!("p = {p}, h = {h}"),
            Self::PS { p, s } => format!("p = {p}, s = {s}"),
            Self::PT { p, t } => format!("p = {p}, T = {t}"),
        }
    }

    /// Reject non-finite inputs before they reach a backend.
    pub fn validate(&self) -> FluidResult<()> {
        match *self {
            Self::DT { d, t } => {
                ensure_finite(d, "density")?;
                ensure_finite(t, "temperature")?;
            }
            Self::PH { p, h } => {
                ensure_finite(p, "pressure")?;
                ensure_finite(h, "specific enthalpy")?;
            }
            Self::PS { p, s } => {
                ensure_finite(p, "pressure")?;
                ensure_finite(s, "specific entropy")?;
            }
            Self::PT { p, t } => {
                ensure_finite(p, "pressure")?;
                ensure_finite(t, "temperature")?;
            }
        }
        Ok(())
    }
}

/// The redundant state values a caller passes along with every property query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateValues {
    pub d: Real,
    pub h: Real,
    pub p: Real,
    pub s: Real,
    pub t: Real,
}

impl StateValues {
    pub fn select(&self, choice: InputChoice) -> StateInput {
        match choice {
            InputChoice::DT => StateInput::DT {
                d: self.d,
                t: self.t,
            },
            InputChoice::PH => StateInput::PH {
                p: self.p,
                h: self.h,
            },
            InputChoice::PS => StateInput::PS {
                p: self.p,
                s: self.s,
            },
            InputChoice::PT => StateInput::PT {
                p: self.p,
                t: self.t,
            },
        }
    }
}

/// Default-input tuple of a property query: values, selector and phase hint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateQuery {
    pub choice: InputChoice,
    pub values: StateValues,
    pub phase: Phase,
}

impl StateQuery {
    pub fn new(choice: InputChoice, values: StateValues, phase: Phase) -> Self {
        Self {
            choice,
            values,
            phase,
        }
    }

    /// Query defined by pressure and enthalpy only.
    pub fn ph(p: Real, h: Real) -> Self {
        Self::new(
            InputChoice::PH,
            StateValues {
                p,
                h,
                ..StateValues::default()
            },
            Phase::Unknown,
        )
    }

    pub fn input(&self) -> StateInput {
        self.values.select(self.choice)
    }
}
