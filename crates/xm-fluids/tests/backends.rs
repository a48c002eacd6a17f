//! Backend integration tests.
//!
//! Each backend is exercised through the public `Backend` contract only. Values are
//! checked for physical plausibility rather than digits.

use xm_fluids::{
    Backend, FluidError, FluidKey, Library, Phase, PhaseSide, Prop, PropertyRecord, StateInput,
};

fn state(backend: &Backend, input: StateInput, phase: Phase) -> PropertyRecord {
    let mut record = PropertyRecord::new();
    backend.set_state(input, phase, &mut record).unwrap();
    record
}

#[test]
fn test_medium_subcooled_water() {
    let backend = Backend::new(FluidKey::new("TestMedium", "water")).unwrap();
    assert_eq!(backend.library(), Library::TestMedium);

    let rec = state(&backend, StateInput::PH { p: 1e5, h: 1e5 }, Phase::Unknown);
    let t = rec.get(Prop::T).unwrap();
    let d = rec.get(Prop::D).unwrap();

    // Liquid water near 24 °C
    assert!(t > 290.0 && t < 305.0, "T = {t} K");
    assert!(d > 950.0 && d < 1050.0, "d = {d} kg/m³");
    assert_eq!(rec.phase(), Phase::OnePhase);
    // Saturation fields come along with the state below the critical pressure
    let ts = rec.get(Prop::Ts).unwrap();
    assert!(ts > 370.0 && ts < 376.0, "Ts = {ts} K");
}

#[test]
fn test_medium_density_drops_across_the_dome() {
    let backend = Backend::new(FluidKey::new("TestMedium", "water")).unwrap();
    let hs = [1e5, 8e5, 1.5e6, 2.2e6, 3.0e6];
    let densities: Vec<f64> = hs
        .iter()
        .map(|&h| {
            state(&backend, StateInput::PH { p: 1e5, h }, Phase::Unknown)
                .get(Prop::D)
                .unwrap()
        })
        .collect();

    for pair in densities.windows(2) {
        assert!(pair[1] < pair[0], "densities not decreasing: {densities:?}");
    }
}

#[test]
fn dew_state_of_a_two_phase_root() {
    let backend = Backend::new(FluidKey::new("TestMedium", "water")).unwrap();
    let root = state(&backend, StateInput::PH { p: 5e5, h: 1.5e6 }, Phase::Unknown);
    assert_eq!(root.phase(), Phase::TwoPhase);

    let mut dew = PropertyRecord::new();
    backend
        .set_dew_state(PhaseSide::OnePhase, &root, &mut dew)
        .unwrap();
    let dv = root.get(Prop::Dv).unwrap();
    let d = dew.get(Prop::D).unwrap();
    assert!((d - dv).abs() / dv < 1e-3, "dew d = {d}, dv = {dv}");
}

#[test]
fn ideal_gas_density_increases_with_pressure() {
    let backend = Backend::new(FluidKey::new("IdealGas", "nitrogen")).unwrap();
    let d1 = state(&backend, StateInput::PT { p: 1e5, t: 300.0 }, Phase::Unknown)
        .get(Prop::D)
        .unwrap();
    let d2 = state(&backend, StateInput::PT { p: 5e5, t: 300.0 }, Phase::Unknown)
        .get(Prop::D)
        .unwrap();
    assert!(d1 > 1.0 && d1 < 1.3, "d1 = {d1}");
    assert!((d2 / d1 - 5.0).abs() < 1e-9);
}

#[test]
fn ideal_gas_has_no_saturation() {
    let backend = Backend::new(FluidKey::new("IdealGas", "air")).unwrap();
    let root = state(&backend, StateInput::PT { p: 1e5, t: 300.0 }, Phase::Unknown);
    let mut target = PropertyRecord::new();
    let err = backend
        .set_bubble_state(PhaseSide::OnePhase, &root, &mut target)
        .unwrap_err();
    assert!(matches!(
        err,
        FluidError::UnsupportedOperation {
            function: "setBubbleState",
            backend: "IdealGas"
        }
    ));
}

#[test]
fn incompressible_rejects_entropy_input() {
    let backend = Backend::new(FluidKey::new("Incompressible", "ethanol")).unwrap();
    let mut record = PropertyRecord::new();
    let err = backend
        .set_state(StateInput::PS { p: 1e5, s: 100.0 }, Phase::Unknown, &mut record)
        .unwrap_err();
    assert!(matches!(err, FluidError::UnsupportedOperation { .. }));
    // A failed setter leaves nothing readable behind
    assert!(record.get(Prop::T).is_err());
}

#[test]
fn unset_transport_fields_are_contract_violations() {
    let backend = Backend::new(FluidKey::new("IdealGas", "helium")).unwrap();
    let rec = state(&backend, StateInput::PT { p: 1e5, t: 300.0 }, Phase::Unknown);
    let err = rec.get(Prop::Eta).unwrap_err();
    assert!(matches!(err, FluidError::ContractViolation { .. }));
}
