//! Property queries with cache-trust checks.
//!
//! Every query carries the caller's own copy of the state-defining values. With a
//! handle, the cached record is trusted unless pressure or enthalpy (saturation
//! pressure, for saturation fields) fails the mismatch test, in which case the
//! record is recomputed in place first. Without a handle, the fluid's
//! solver-scoped state is always recomputed.

use xm_core::Handle;
use xm_fluids::{
    FluidConstants, FluidKey, InputChoice, Phase, Prop, PropKind, PropertyRecord, StateInput,
    StateQuery,
};

use crate::context::MediaContext;
use crate::error::{MediaError, MediaResult};

/// State-setting result handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSummary {
    pub handle: Handle,
    pub phase: Phase,
    pub d: f64,
    pub h: f64,
    pub p: f64,
    pub s: f64,
    pub t: f64,
    /// Liquid and vapour mole fractions, mixtures only.
    pub fractions: Option<(Vec<f64>, Vec<f64>)>,
}

impl StateSummary {
    fn read(handle: Handle, record: &PropertyRecord) -> MediaResult<Self> {
        let fractions = if record.has_composition() {
            Some((
                record.liquid_fractions()?.to_vec(),
                record.vapour_fractions()?.to_vec(),
            ))
        } else {
            None
        };
        Ok(Self {
            handle,
            phase: record.phase(),
            d: record.get(Prop::D)?,
            h: record.get(Prop::H)?,
            p: record.get(Prop::P)?,
            s: record.get(Prop::S)?,
            t: record.get(Prop::T)?,
            fractions,
        })
    }
}

/// Saturation-setting result handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationSummary {
    pub handle: Handle,
    pub psat: f64,
    pub tsat: f64,
}

impl SaturationSummary {
    fn read(handle: Handle, record: &PropertyRecord) -> MediaResult<Self> {
        Ok(Self {
            handle,
            psat: record.get(Prop::Ps)?,
            tsat: record.get(Prop::Ts)?,
        })
    }
}

/// Which record a query ends up reading.
enum Target {
    Handle(Handle),
    Solver(FluidKey),
}

#[derive(Clone, Copy)]
enum SatInput {
    P(f64),
    T(f64),
}

impl MediaContext {
    /// Compute a state from `input`. `None` creates a transient state.
    pub fn set_state(
        &mut self,
        key: &FluidKey,
        input: StateInput,
        phase: Phase,
        handle: Option<Handle>,
    ) -> MediaResult<StateSummary> {
        let created = handle.is_none();
        let handle = self.existing_or_transient(key, handle)?;
        let result = self.state_backend(handle).and_then(|backend| {
            let state = self.registry.resolve_mut(handle)?;
            backend.set_state(input, phase, state.record_mut())?;
            StateSummary::read(handle, state.record())
        });
        self.discard_on_error(created, handle, result)
    }

    /// Saturation at pressure `p`. `None` creates a transient state.
    pub fn set_sat_p(
        &mut self,
        key: &FluidKey,
        p: f64,
        handle: Option<Handle>,
    ) -> MediaResult<SaturationSummary> {
        self.set_sat(key, SatInput::P(p), handle)
    }

    /// Saturation at temperature `t`. `None` creates a transient state.
    pub fn set_sat_t(
        &mut self,
        key: &FluidKey,
        t: f64,
        handle: Option<Handle>,
    ) -> MediaResult<SaturationSummary> {
        self.set_sat(key, SatInput::T(t), handle)
    }

    /// Saturation at the state's own pressure.
    pub fn set_sat_p_state(&mut self, handle: Handle) -> MediaResult<SaturationSummary> {
        let backend = self.state_backend(handle)?;
        let state = self.registry.resolve_mut(handle)?;
        backend.set_sat_p_state(state.record_mut())?;
        SaturationSummary::read(handle, state.record())
    }

    fn set_sat(
        &mut self,
        key: &FluidKey,
        input: SatInput,
        handle: Option<Handle>,
    ) -> MediaResult<SaturationSummary> {
        let created = handle.is_none();
        let handle = self.existing_or_transient(key, handle)?;
        let result = self.state_backend(handle).and_then(|backend| {
            let state = self.registry.resolve_mut(handle)?;
            match input {
                SatInput::P(p) => backend.set_sat_p(p, state.record_mut())?,
                SatInput::T(t) => backend.set_sat_t(t, state.record_mut())?,
            }
            SaturationSummary::read(handle, state.record())
        });
        self.discard_on_error(created, handle, result)
    }

    /// One state field, recomputing through the query's input pair if stale.
    pub fn state_property(
        &mut self,
        prop: Prop,
        key: &FluidKey,
        handle: Option<Handle>,
        query: &StateQuery,
    ) -> MediaResult<f64> {
        if prop.kind() != PropKind::State {
            return Err(MediaError::contract(format!(
                "{} is a saturation field; query it with its saturation pressure",
                prop.name()
            )));
        }
        let target = self.refresh_state(key, handle, query, true)?;
        Ok(self.target_record(&target)?.get(prop)?)
    }

    /// One saturation field, recomputing at `psat` if the cached one differs.
    pub fn saturation_property(
        &mut self,
        prop: Prop,
        key: &FluidKey,
        handle: Option<Handle>,
        psat: f64,
    ) -> MediaResult<f64> {
        if prop.kind() != PropKind::Saturation {
            return Err(MediaError::contract(format!(
                "{} is a state field; query it with the state inputs",
                prop.name()
            )));
        }
        let target = match handle {
            None => {
                let backend = self.backend_for(key)?;
                backend.set_sat_p(psat, self.registry.solver_scoped(key).record_mut())?;
                Target::Solver(key.clone())
            }
            Some(handle) => {
                let stale = {
                    let record = self.registry.resolve(handle)?.record();
                    self.mismatch().mismatch_cached(psat, record.cached(Prop::Ps))
                };
                if stale {
                    tracing::debug!(%handle, psat, "cached saturation does not match; recomputing");
                    let backend = self.state_backend(handle)?;
                    backend.set_sat_p(psat, self.registry.resolve_mut(handle)?.record_mut())?;
                }
                Target::Handle(handle)
            }
        };
        Ok(self.target_record(&target)?.get(prop)?)
    }

    /// `dd_dp_h * p_der + dd_dh_p * h_der`.
    pub fn density_ph_der(
        &mut self,
        key: &FluidKey,
        handle: Option<Handle>,
        query: &StateQuery,
        p_der: f64,
        h_der: f64,
    ) -> MediaResult<f64> {
        self.ph_derivative(key, handle, query, (Prop::DdDpH, Prop::DdDhP), p_der, h_der)
    }

    /// `dT_dp_h * p_der + dT_dh_p * h_der`.
    pub fn temperature_ph_der(
        &mut self,
        key: &FluidKey,
        handle: Option<Handle>,
        query: &StateQuery,
        p_der: f64,
        h_der: f64,
    ) -> MediaResult<f64> {
        self.ph_derivative(key, handle, query, (Prop::DTDpH, Prop::DTDhP), p_der, h_der)
    }

    /// Rates read straight from the cache with a handle; the caller set the state.
    fn ph_derivative(
        &mut self,
        key: &FluidKey,
        handle: Option<Handle>,
        query: &StateQuery,
        (along_p, along_h): (Prop, Prop),
        p_der: f64,
        h_der: f64,
    ) -> MediaResult<f64> {
        let ph = StateQuery {
            choice: InputChoice::PH,
            ..*query
        };
        let target = self.refresh_state(key, handle, &ph, false)?;
        let record = self.target_record(&target)?;
        Ok(record.get(along_p)? * p_der + record.get(along_h)? * h_der)
    }

    /// Enthalpy at `p_iso` with the entropy of the (checked) state.
    pub fn isentropic_enthalpy(
        &mut self,
        key: &FluidKey,
        handle: Option<Handle>,
        query: &StateQuery,
        p_iso: f64,
    ) -> MediaResult<f64> {
        let target = self.refresh_state(key, handle, query, true)?;
        let backend = match &target {
            Target::Handle(handle) => self.state_backend(*handle)?,
            Target::Solver(key) => self.backend_for(key)?,
        };
        let record = self.target_record(&target)?;
        Ok(backend.isentropic_enthalpy(p_iso, record)?)
    }

    pub fn saturation_pressure(&mut self, key: &FluidKey, t: f64) -> MediaResult<f64> {
        let backend = self.backend_for(key)?;
        let record = self.registry.solver_scoped(key).record_mut();
        backend.set_sat_t(t, record)?;
        Ok(record.get(Prop::Ps)?)
    }

    pub fn saturation_temperature(&mut self, key: &FluidKey, p: f64) -> MediaResult<f64> {
        self.solver_saturation(key, p, Prop::Ts)
    }

    /// dTs/dp at pressure `p`.
    pub fn saturation_temperature_derp(&mut self, key: &FluidKey, p: f64) -> MediaResult<f64> {
        self.solver_saturation(key, p, Prop::DTsDp)
    }

    fn solver_saturation(&mut self, key: &FluidKey, p: f64, prop: Prop) -> MediaResult<f64> {
        let backend = self.backend_for(key)?;
        let record = self.registry.solver_scoped(key).record_mut();
        backend.set_sat_p(p, record)?;
        Ok(record.get(prop)?)
    }

    pub fn fluid_constants(&mut self, key: &FluidKey) -> MediaResult<FluidConstants> {
        Ok(*self.backend_for(key)?.constants())
    }

    fn existing_or_transient(&mut self, key: &FluidKey, handle: Option<Handle>) -> MediaResult<Handle> {
        match handle {
            Some(handle) => {
                self.registry.resolve(handle)?;
                Ok(handle)
            }
            None => self.create_transient(key),
        }
    }

    /// Drop a transient this call created if its first evaluation failed.
    fn discard_on_error<T>(
        &mut self,
        created: bool,
        handle: Handle,
        result: MediaResult<T>,
    ) -> MediaResult<T> {
        if created && result.is_err() && self.registry.discard(handle) {
            tracing::debug!(%handle, "discarded transient state after a failed evaluation");
        }
        result
    }

    /// Backend of a registered state, re-resolved by the state's own key.
    fn state_backend(&mut self, handle: Handle) -> MediaResult<std::sync::Arc<xm_fluids::Backend>> {
        let key = self.registry.resolve(handle)?.key().clone();
        self.backend_for(&key)
    }

    /// Bring the record a query reads up to date.
    ///
    /// Handle-less queries always recompute the solver-scoped state. With a
    /// handle, `check` decides whether a mismatch on p or h triggers a recompute;
    /// without it the cache is read as is.
    fn refresh_state(
        &mut self,
        key: &FluidKey,
        handle: Option<Handle>,
        query: &StateQuery,
        check: bool,
    ) -> MediaResult<Target> {
        let Some(handle) = handle else {
            let backend = self.backend_for(key)?;
            let state = self.registry.solver_scoped(key);
            backend.set_state(query.input(), query.phase, state.record_mut())?;
            return Ok(Target::Solver(key.clone()));
        };

        let stale = check && {
            let record = self.registry.resolve(handle)?.record();
            let tol = self.mismatch();
            tol.mismatch_cached(query.values.p, record.cached(Prop::P))
                || tol.mismatch_cached(query.values.h, record.cached(Prop::H))
        };
        if stale {
            tracing::debug!(
                %handle,
                p = query.values.p,
                h = query.values.h,
                inputs = query.choice.label(),
                "cached state does not match the caller's inputs; recomputing"
            );
            let backend = self.state_backend(handle)?;
            let state = self.registry.resolve_mut(handle)?;
            backend.set_state(query.input(), query.phase, state.record_mut())?;
        } else {
            self.registry.resolve(handle)?;
        }
        Ok(Target::Handle(handle))
    }

    fn target_record(&self, target: &Target) -> MediaResult<&PropertyRecord> {
        match target {
            Target::Handle(handle) => Ok(self.registry.resolve(*handle)?.record()),
            Target::Solver(key) => self
                .registry
                .peek_solver_scoped(key)
                .map(|state| state.record())
                .ok_or_else(|| MediaError::contract(format!("no solver-scoped state for {key}"))),
        }
    }
}
