mod support;

use adp_core::{AdpConfig, AdpEventKind, AttachState, OtgRole, PowerDownDepth};
use support::{build_engine, deliver_probe, steady_probe, PowerOp, RoleCall};

#[test]
fn host_srp_stops_probe_and_powers_port() {
    let mut engine = build_engine(AdpConfig::default());
    engine.hardware_mut().id_host = true;
    steady_probe(&mut engine);

    engine.handle_srp_interrupt();

    assert!(!engine.context().probe_enabled());
    assert!(engine.hardware().port_power);
    assert_eq!(
        engine.roles().calls.as_slice(),
        &[RoleCall::StartHost, RoleCall::SessionSupervision]
    );
    assert_eq!(engine.context().attached(), AttachState::Attached);
    assert!(engine.events().contains(AdpEventKind::SrpDetected));
}

#[test]
fn peripheral_srp_releases_power_down_logic() {
    let mut engine = build_engine(AdpConfig::new(PowerDownDepth::Cold));
    steady_probe(&mut engine);

    engine.handle_srp_interrupt();

    assert!(!engine.context().probe_enabled());
    assert!(!engine.hardware().port_power);
    assert_eq!(engine.roles().calls.as_slice(), &[RoleCall::StartPeripheral]);
    assert_eq!(
        engine.hardware().power_ops.as_slice(),
        &[PowerOp::Switch(true), PowerOp::Logic(false)]
    );
}

#[test]
fn host_srp_with_adp_disabled_still_supervises_session() {
    let mut engine = build_engine(AdpConfig::disabled());
    engine.hardware_mut().id_host = true;

    engine.handle_srp_interrupt();

    assert!(engine.hardware().port_power);
    assert_eq!(
        engine.roles().calls.as_slice(),
        &[RoleCall::SessionSupervision]
    );
    assert_eq!(engine.hardware().writes, 0);
}

#[test]
fn peripheral_srp_with_adp_disabled_does_nothing() {
    let mut engine = build_engine(AdpConfig::disabled());

    engine.handle_srp_interrupt();

    assert!(engine.roles().calls.is_empty());
    assert!(engine.hardware().power_ops.is_empty());
}

#[test]
fn srp_after_ramp_attach_does_not_restart_role() {
    let mut engine = build_engine(AdpConfig::default());
    engine.hardware_mut().id_host = true;
    steady_probe(&mut engine);
    deliver_probe(&mut engine, 100);
    deliver_probe(&mut engine, 150);

    engine.handle_srp_interrupt();

    assert_eq!(engine.roles().count(RoleCall::StartHost), 1);
    assert_eq!(engine.roles().count(RoleCall::SessionSupervision), 1);
    assert_eq!(engine.context().role_decided(), Some(OtgRole::Host));
}
