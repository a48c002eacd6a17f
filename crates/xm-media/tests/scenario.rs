//! End-to-end behaviour of the medium-state layer on the water-like test fluid.

use std::sync::Arc;

use xm_fluids::{FluidKey, Phase, PhaseSide, Prop, StateInput, StateQuery};
use xm_media::{MediaConfig, MediaContext, MediaError};

fn context(max_solver: usize) -> MediaContext {
    MediaContext::new(MediaConfig::default().with_max_solver(max_solver)).unwrap()
}

fn water() -> FluidKey {
    FluidKey::new("TestMedium", "water").with_medium("TestMedium")
}

fn calls(ctx: &MediaContext, key: &FluidKey) -> u64 {
    ctx.pool().peek(key).map_or(0, |b| b.call_count())
}

#[test]
fn third_key_evicts_the_first_with_two_slots() {
    let mut ctx = context(2);
    let a = FluidKey::new("TestMedium", "a");
    let b = FluidKey::new("TestMedium", "b");
    let c = FluidKey::new("TestMedium", "c");

    let first_a = ctx.backend_for(&a).unwrap();
    ctx.backend_for(&b).unwrap();
    ctx.backend_for(&c).unwrap();
    assert_eq!(ctx.pool().len(), 2);
    assert!(!ctx.pool().is_live(&a));

    let constructed = ctx.pool().constructed_count();
    let second_a = ctx.backend_for(&a).unwrap();
    assert_eq!(ctx.pool().constructed_count(), constructed + 1);
    assert!(!Arc::ptr_eq(&first_a, &second_a));
}

#[test]
fn mixture_keys_share_a_backend_by_normalised_composition() {
    let mut ctx = context(4);
    let air = FluidKey::mixture("IdealGas", "nitrogen-oxygen", &[0.79, 0.21]).unwrap();
    let scaled = FluidKey::mixture("IdealGas", "nitrogen-oxygen", &[79.0, 21.0]).unwrap();
    let rich = FluidKey::mixture("IdealGas", "nitrogen-oxygen", &[0.5, 0.5]).unwrap();

    let first = ctx.backend_for(&air).unwrap();
    let constructed = ctx.pool().constructed_count();
    let second = ctx.backend_for(&scaled).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(ctx.pool().constructed_count(), constructed);

    let other = ctx.backend_for(&rich).unwrap();
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(ctx.pool().constructed_count(), constructed + 1);

    let summary = ctx
        .set_state(&scaled, StateInput::PT { p: 1e5, t: 300.0 }, Phase::Unknown, None)
        .unwrap();
    let (x, y) = summary.fractions.unwrap();
    assert!((x[0] - 0.79).abs() < 1e-12 && (x[1] - 0.21).abs() < 1e-12);
    assert_eq!(x, y);
}

#[test]
fn cached_density_then_recompute_on_tiny_pressure_change() {
    let mut ctx = context(2);
    let key = water();
    let h1 = ctx.create_permanent(&key, None).unwrap();
    assert!(h1.is_permanent());

    let summary = ctx
        .set_state(&key, StateInput::PH { p: 1e5, h: 1e5 }, Phase::Unknown, Some(h1))
        .unwrap();
    assert_eq!(summary.phase, Phase::OnePhase);
    let after_set = calls(&ctx, &key);

    let d = ctx
        .state_property(Prop::D, &key, Some(h1), &StateQuery::ph(1e5, 1e5))
        .unwrap();
    assert_eq!(d, summary.d);
    assert_eq!(calls(&ctx, &key), after_set, "cache hit must not call the backend");

    let p_new = 1.000000000001e5;
    ctx.state_property(Prop::D, &key, Some(h1), &StateQuery::ph(p_new, 1e5))
        .unwrap();
    assert_eq!(calls(&ctx, &key), after_set + 1);
    let cached_p = ctx.registry().resolve(h1).unwrap().record().get(Prop::P).unwrap();
    assert_eq!(cached_p, p_new);
}

#[test]
fn relative_change_of_1e_10_triggers_recompute() {
    let mut ctx = context(4);
    let key = water();
    let h = ctx.create_permanent(&key, None).unwrap();
    let (p0, h0) = (3e5, 2.5e5);
    ctx.set_state(&key, StateInput::PH { p: p0, h: h0 }, Phase::Unknown, Some(h))
        .unwrap();
    let base = calls(&ctx, &key);

    ctx.state_property(Prop::T, &key, Some(h), &StateQuery::ph(p0, h0))
        .unwrap();
    assert_eq!(calls(&ctx, &key), base);

    ctx.state_property(Prop::T, &key, Some(h), &StateQuery::ph(p0 * (1.0 + 1e-10), h0))
        .unwrap();
    assert_eq!(calls(&ctx, &key), base + 1);

    // enthalpy is compared too
    ctx.state_property(Prop::T, &key, Some(h), &StateQuery::ph(p0 * (1.0 + 1e-10), h0 + 1.0))
        .unwrap();
    assert_eq!(calls(&ctx, &key), base + 2);
}

#[test]
fn handle_less_queries_always_recompute() {
    let mut ctx = context(4);
    let key = water();
    let query = StateQuery::ph(1e5, 1e5);
    ctx.state_property(Prop::D, &key, None, &query).unwrap();
    let base = calls(&ctx, &key);
    ctx.state_property(Prop::D, &key, None, &query).unwrap();
    assert_eq!(calls(&ctx, &key), base + 1);
    assert!(ctx.registry().is_empty());
    assert_eq!(ctx.registry().solver_scoped_count(), 1);
}

#[test]
fn state_outlives_eviction_of_its_backend() {
    let mut ctx = context(1);
    let key = water();
    let h = ctx.create_permanent(&key, None).unwrap();
    ctx.set_state(&key, StateInput::PH { p: 1e5, h: 1e5 }, Phase::Unknown, Some(h))
        .unwrap();

    // a different fluid takes the only slot
    ctx.state_property(
        Prop::D,
        &FluidKey::new("IdealGas", "nitrogen"),
        None,
        &StateQuery::ph(1e5, 0.0),
    )
    .unwrap();
    assert!(!ctx.pool().is_live(&key));

    // the cached record is still readable, and a mismatch rebuilds the backend
    let d = ctx
        .state_property(Prop::D, &key, Some(h), &StateQuery::ph(2e5, 1e5))
        .unwrap();
    assert!(d > 900.0);
    assert!(ctx.pool().is_live(&key));
}

#[test]
fn dew_handle_is_stable_across_root_changes() {
    let mut ctx = context(4);
    let key = water();
    let root = ctx.create_permanent(&key, None).unwrap();
    ctx.set_state(&key, StateInput::PH { p: 2e5, h: 1.0e6 }, Phase::Unknown, Some(root))
        .unwrap();
    let dew = ctx.dew_handle(root, PhaseSide::TwoPhase).unwrap();

    ctx.set_state(&key, StateInput::PH { p: 4e5, h: 2.0e6 }, Phase::Unknown, Some(root))
        .unwrap();
    assert_eq!(ctx.dew_handle(root, PhaseSide::TwoPhase).unwrap(), dew);

    let filled = ctx.set_dew_state(root, PhaseSide::TwoPhase).unwrap();
    assert_eq!(filled, dew);
    let record = ctx.registry().resolve(dew).unwrap().record();
    assert_eq!(record.phase(), Phase::TwoPhase);
    assert_eq!(record.get(Prop::P).unwrap(), 4e5);
}

#[test]
fn unsupported_library_surfaces_immediately() {
    let mut ctx = context(2);
    let err = ctx
        .state_property(
            Prop::D,
            &FluidKey::new("FluidProp.RefProp", "water"),
            None,
            &StateQuery::ph(1e5, 1e5),
        )
        .unwrap_err();
    assert!(matches!(err, MediaError::UnsupportedBackend { .. }));
    assert!(err.to_string().contains("FluidProp.RefProp"));
}

#[test]
fn backend_failure_reports_inputs() {
    let mut ctx = context(2);
    let err = ctx
        .set_state(
            &water(),
            StateInput::PH { p: 1e5, h: 1e5 },
            Phase::TwoPhase,
            None,
        )
        .unwrap_err();
    match err {
        MediaError::BackendComputationFailed {
            function, inputs, ..
        } => {
            assert_eq!(function, "setState_ph");
            assert!(inputs.contains("h = 100000"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(ctx.registry().is_empty());
}

#[test]
fn reclaiming_transients_keeps_permanent_states() {
    let mut ctx = context(2);
    let key = water();
    let permanent = ctx.create_permanent(&key, None).unwrap();
    let transient = ctx
        .set_state(&key, StateInput::PT { p: 1e5, t: 300.0 }, Phase::Unknown, None)
        .unwrap()
        .handle;

    assert_eq!(ctx.reclaim_transients(), 1);
    assert!(ctx.registry().contains(permanent));
    let err = ctx
        .state_property(Prop::D, &key, Some(transient), &StateQuery::ph(1e5, 1e5))
        .unwrap_err();
    assert!(err.is_contract_violation());
}
