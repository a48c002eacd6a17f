//! Integer-coded entry points.
//!
//! Hosts pass handles as `i64` (0 = no handle), phase tags and phase sides as
//! `i32`, input-pair selectors as `i32` (dT = 0, ph = 1, ps = 2, pT = 3) and
//! property fields by name. Every code is validated here; a bad code is a
//! contract violation.

use xm_core::Handle;
use xm_fluids::{FluidKey, InputChoice, Phase, PhaseSide, Prop, PropKind, StateQuery, StateValues};

use crate::context::MediaContext;
use crate::dispatch::{SaturationSummary, StateSummary};
use crate::error::{MediaError, MediaResult};

/// Fluid constant selected by [`fluid_constant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantKind {
    MolarMass,
    CriticalTemperature,
    CriticalPressure,
    CriticalDensity,
    CriticalMolarVolume,
}

fn required(raw: i64, operation: &str) -> MediaResult<Handle> {
    Ok(Handle::require(raw, operation)?)
}

fn phase(code: i32) -> MediaResult<Phase> {
    Ok(Phase::from_code(code)?)
}

fn side(code: i32) -> MediaResult<PhaseSide> {
    Ok(PhaseSide::from_code(code)?)
}

fn query(choice: i32, values: StateValues, phase_code: i32) -> MediaResult<StateQuery> {
    Ok(StateQuery::new(
        InputChoice::from_code(choice)?,
        values,
        phase(phase_code)?,
    ))
}

fn prop(name: &str) -> MediaResult<Prop> {
    Prop::from_name(name)
        .ok_or_else(|| MediaError::contract(format!("unknown property field {name:?}")))
}

/// Compute a state from the pair `choice` selects out of `values`.
pub fn set_state(
    ctx: &mut MediaContext,
    key: &FluidKey,
    choice: i32,
    values: StateValues,
    phase_code: i32,
    handle: i64,
) -> MediaResult<StateSummary> {
    let query = query(choice, values, phase_code)?;
    ctx.set_state(key, query.input(), query.phase, Handle::new(handle))
}

pub fn set_sat_p(
    ctx: &mut MediaContext,
    key: &FluidKey,
    p: f64,
    handle: i64,
) -> MediaResult<SaturationSummary> {
    ctx.set_sat_p(key, p, Handle::new(handle))
}

pub fn set_sat_t(
    ctx: &mut MediaContext,
    key: &FluidKey,
    t: f64,
    handle: i64,
) -> MediaResult<SaturationSummary> {
    ctx.set_sat_t(key, t, Handle::new(handle))
}

pub fn set_sat_p_state(ctx: &mut MediaContext, handle: i64) -> MediaResult<SaturationSummary> {
    ctx.set_sat_p_state(required(handle, "setSat_p_state")?)
}

/// Any property field by name.
///
/// State fields are checked against `values.p` and `values.h`; saturation
/// fields against `psat`.
#[allow(clippy::too_many_arguments)]
pub fn property(
    ctx: &mut MediaContext,
    name: &str,
    key: &FluidKey,
    handle: i64,
    choice: i32,
    values: StateValues,
    phase_code: i32,
    psat: f64,
) -> MediaResult<f64> {
    let prop = prop(name)?;
    let handle = Handle::new(handle);
    match prop.kind() {
        PropKind::State => {
            let query = query(choice, values, phase_code)?;
            ctx.state_property(prop, key, handle, &query)
        }
        PropKind::Saturation => ctx.saturation_property(prop, key, handle, psat),
    }
}

pub fn density_ph_der(
    ctx: &mut MediaContext,
    key: &FluidKey,
    handle: i64,
    values: StateValues,
    phase_code: i32,
    p_der: f64,
    h_der: f64,
) -> MediaResult<f64> {
    let query = StateQuery::new(InputChoice::PH, values, phase(phase_code)?);
    ctx.density_ph_der(key, Handle::new(handle), &query, p_der, h_der)
}

pub fn temperature_ph_der(
    ctx: &mut MediaContext,
    key: &FluidKey,
    handle: i64,
    values: StateValues,
    phase_code: i32,
    p_der: f64,
    h_der: f64,
) -> MediaResult<f64> {
    let query = StateQuery::new(InputChoice::PH, values, phase(phase_code)?);
    ctx.temperature_ph_der(key, Handle::new(handle), &query, p_der, h_der)
}

pub fn isentropic_enthalpy(
    ctx: &mut MediaContext,
    key: &FluidKey,
    handle: i64,
    choice: i32,
    values: StateValues,
    phase_code: i32,
    p_iso: f64,
) -> MediaResult<f64> {
    let query = query(choice, values, phase_code)?;
    ctx.isentropic_enthalpy(key, Handle::new(handle), &query, p_iso)
}

pub fn dew_handle(ctx: &mut MediaContext, root: i64, side_code: i32) -> MediaResult<i64> {
    let root = required(root, "getDewHandle")?;
    Ok(ctx.dew_handle(root, side(side_code)?)?.get())
}

pub fn bubble_handle(ctx: &mut MediaContext, root: i64, side_code: i32) -> MediaResult<i64> {
    let root = required(root, "getBubbleHandle")?;
    Ok(ctx.bubble_handle(root, side(side_code)?)?.get())
}

pub fn set_dew_state(ctx: &mut MediaContext, root: i64, side_code: i32) -> MediaResult<i64> {
    let root = required(root, "setDewState")?;
    Ok(ctx.set_dew_state(root, side(side_code)?)?.get())
}

pub fn set_bubble_state(ctx: &mut MediaContext, root: i64, side_code: i32) -> MediaResult<i64> {
    let root = required(root, "setBubbleState")?;
    Ok(ctx.set_bubble_state(root, side(side_code)?)?.get())
}

pub fn fluid_constant(
    ctx: &mut MediaContext,
    key: &FluidKey,
    kind: ConstantKind,
) -> MediaResult<f64> {
    let constants = ctx.fluid_constants(key)?;
    Ok(match kind {
        ConstantKind::MolarMass => constants.molar_mass.value,
        ConstantKind::CriticalTemperature => constants.critical_temperature.value,
        ConstantKind::CriticalPressure => constants.critical_pressure.value,
        ConstantKind::CriticalDensity => constants.critical_density.value,
        ConstantKind::CriticalMolarVolume => constants.critical_molar_volume(),
    })
}
