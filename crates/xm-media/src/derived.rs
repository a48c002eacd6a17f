//! Dew and bubble states hanging off a root state.
//!
//! Each root owns up to four derived handles (dew/bubble on either side of the
//! saturation line). A handle is allocated once, on first request, and stays
//! stable for the root's lifetime. Derived states do not get derived states of
//! their own.

use xm_core::Handle;
use xm_fluids::{Endpoint, PhaseSide};

use crate::context::MediaContext;
use crate::error::{MediaError, MediaResult};

impl MediaContext {
    pub fn dew_handle(&mut self, root: Handle, side: PhaseSide) -> MediaResult<Handle> {
        self.endpoint_handle(Endpoint::Dew, root, side)
    }

    pub fn bubble_handle(&mut self, root: Handle, side: PhaseSide) -> MediaResult<Handle> {
        self.endpoint_handle(Endpoint::Bubble, root, side)
    }

    /// Handle of the `endpoint` state of `root`, allocated on first request.
    pub fn endpoint_handle(
        &mut self,
        endpoint: Endpoint,
        root: Handle,
        side: PhaseSide,
    ) -> MediaResult<Handle> {
        let state = self.registry.resolve(root)?;
        if state.is_derived() {
            return Err(MediaError::contract(format!(
                "state {root} is itself a derived state and has no {} state",
                endpoint.label()
            )));
        }
        if let Some(existing) = state.record().derived().get(endpoint, side) {
            return Ok(existing);
        }

        let child = self.registry.create_derived(root)?;
        self.registry
            .resolve_mut(root)?
            .record_mut()
            .derived_mut()
            .set(endpoint, side, child);
        tracing::debug!(
            %root,
            %child,
            endpoint = endpoint.label(),
            side = side.code(),
            "allocated derived state"
        );
        Ok(child)
    }

    /// Recompute the dew state of `root` from the root's saturation fields.
    pub fn set_dew_state(&mut self, root: Handle, side: PhaseSide) -> MediaResult<Handle> {
        self.set_endpoint_state(Endpoint::Dew, root, side)
    }

    /// Recompute the bubble state of `root` from the root's saturation fields.
    pub fn set_bubble_state(&mut self, root: Handle, side: PhaseSide) -> MediaResult<Handle> {
        self.set_endpoint_state(Endpoint::Bubble, root, side)
    }

    /// Recompute the derived state; the root record is left untouched.
    ///
    /// The child handle is only allocated once the backend can evaluate it.
    pub fn set_endpoint_state(
        &mut self,
        endpoint: Endpoint,
        root: Handle,
        side: PhaseSide,
    ) -> MediaResult<Handle> {
        let key = self.registry.resolve(root)?.key().clone();
        let backend = self.backend_for(&key)?;
        let input = backend.endpoint_input(endpoint, side, self.registry.resolve(root)?.record())?;
        let child = self.endpoint_handle(endpoint, root, side)?;
        let target = self.registry.resolve_mut(child)?;
        backend.set_state(input, side.phase(), target.record_mut())?;
        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaConfig;
    use xm_fluids::{FluidKey, Phase, Prop, StateInput};

    fn water() -> FluidKey {
        FluidKey::new("TestMedium", "water")
    }

    fn two_phase_root(ctx: &mut MediaContext, permanent: bool) -> Handle {
        let handle = if permanent {
            Some(ctx.create_permanent(&water(), None).unwrap())
        } else {
            None
        };
        ctx.set_state(&water(), StateInput::PH { p: 2e5, h: 1.2e6 }, Phase::Unknown, handle)
            .unwrap()
            .handle
    }

    #[test]
    fn handles_are_allocated_once_per_endpoint_and_side() {
        let mut ctx = MediaContext::new(MediaConfig::default()).unwrap();
        let root = two_phase_root(&mut ctx, true);

        let dew1 = ctx.dew_handle(root, PhaseSide::OnePhase).unwrap();
        let dew2 = ctx.dew_handle(root, PhaseSide::TwoPhase).unwrap();
        let bub1 = ctx.bubble_handle(root, PhaseSide::OnePhase).unwrap();
        assert_ne!(dew1, dew2);
        assert_ne!(dew1, bub1);
        assert!(dew1.is_permanent());
        assert_eq!(ctx.dew_handle(root, PhaseSide::OnePhase).unwrap(), dew1);
    }

    #[test]
    fn transient_root_gets_transient_children() {
        let mut ctx = MediaContext::new(MediaConfig::default()).unwrap();
        let root = two_phase_root(&mut ctx, false);
        let bubble = ctx.bubble_handle(root, PhaseSide::TwoPhase).unwrap();
        assert!(!bubble.is_permanent());
    }

    #[test]
    fn set_dew_state_fills_child_not_root() {
        let mut ctx = MediaContext::new(MediaConfig::default()).unwrap();
        let root = two_phase_root(&mut ctx, true);
        let before = ctx.registry().resolve(root).unwrap().record().clone();

        let dew = ctx.set_dew_state(root, PhaseSide::OnePhase).unwrap();
        let child = ctx.registry().resolve(dew).unwrap().record();
        assert_eq!(child.phase(), Phase::OnePhase);
        assert!(child.get(Prop::H).unwrap() > before.get(Prop::Hv).unwrap());

        let after = ctx.registry().resolve(root).unwrap().record();
        assert_eq!(after.get(Prop::D).unwrap(), before.get(Prop::D).unwrap());
        assert_eq!(after.derived().get(Endpoint::Dew, PhaseSide::OnePhase), Some(dew));
    }

    #[test]
    fn derived_states_have_no_children() {
        let mut ctx = MediaContext::new(MediaConfig::default()).unwrap();
        let root = two_phase_root(&mut ctx, true);
        let dew = ctx.set_dew_state(root, PhaseSide::OnePhase).unwrap();
        let err = ctx.bubble_handle(dew, PhaseSide::OnePhase).unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn root_without_saturation_is_a_contract_violation() {
        let mut ctx = MediaContext::new(MediaConfig::default()).unwrap();
        let root = ctx.create_permanent(&water(), None).unwrap();
        let err = ctx.set_bubble_state(root, PhaseSide::OnePhase).unwrap_err();
        assert!(err.is_contract_violation());
        assert_eq!(ctx.registry().len(), 1);
    }

    #[test]
    fn failed_dew_state_allocates_no_child() {
        let mut ctx = MediaContext::new(MediaConfig::default()).unwrap();
        let gas = FluidKey::new("IdealGas", "nitrogen");
        let root = ctx.create_permanent(&gas, None).unwrap();
        ctx.set_state(&gas, StateInput::PT { p: 1e5, t: 300.0 }, Phase::Unknown, Some(root))
            .unwrap();

        let err = ctx.set_dew_state(root, PhaseSide::OnePhase).unwrap_err();
        assert!(matches!(
            err,
            MediaError::UnsupportedOperation {
                function: "setDewState",
                ..
            }
        ));
        assert_eq!(ctx.registry().len(), 1);
        let record = ctx.registry().resolve(root).unwrap().record();
        assert_eq!(record.derived().get(Endpoint::Dew, PhaseSide::OnePhase), None);
    }
}
