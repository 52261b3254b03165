//! Attach Detect Protocol state machine.
//!
//! The engine alternates between two hardware timing loops. While probing,
//! the ADP block charges the port capacitance and reports the ramp timer on
//! every probe or timeout interrupt; a change between consecutive readings
//! means something is now attached. While sensing, the block waits for a
//! remote probe and reports it through the sense interrupt. Once attachment is
//! confirmed the engine hands the port to the host or peripheral stack through
//! the [`RoleInitializer`].
//!
//! Every entry point (`start`, the probe/sense controls, `handle_interrupt`,
//! `handle_srp_interrupt`, `handle_timer`, `connection_detected`) must be
//! serialized by the owner; `adp-runtime` does so with a blocking mutex.
//! Register reset waits block the caller for up to a second and fail open.

use crate::config::{AdpConfig, ConfigError};
use crate::controller::OtgHardware;
use crate::power::PowerSequencer;
use crate::register::ControlRegister;
use crate::role::{OtgRole, RoleInitializer};
use crate::telemetry::{AdpEventKind, EventLog};
use crate::timer::{AdpTimer, TimerService};

/// Which ADP loop currently owns the block. At most one runs at a time.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdpMode {
    #[default]
    ProbeIdle,
    Probing,
    SenseIdle,
    Sensing,
}

/// Last attach verdict, kept for diagnostics only.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttachState {
    #[default]
    Unknown,
    Attached,
    NotAttached,
}

/// Per-port ADP bookkeeping.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdpContext {
    mode: AdpMode,
    initial_probe: bool,
    ramp_samples: [Option<u16>; 2],
    attached: AttachState,
    probe_enabled: bool,
    sense_enabled: bool,
    sense_timer_armed: bool,
    vbuson_timer_armed: bool,
    role_decided: Option<OtgRole>,
}

impl AdpContext {
    /// Creates a context with every field cleared.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: AdpMode::ProbeIdle,
            initial_probe: false,
            ramp_samples: [None, None],
            attached: AttachState::Unknown,
            probe_enabled: false,
            sense_enabled: false,
            sense_timer_armed: false,
            vbuson_timer_armed: false,
            role_decided: None,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> AdpMode {
        self.mode
    }

    #[must_use]
    pub const fn initial_probe(&self) -> bool {
        self.initial_probe
    }

    /// Most recent reading first.
    #[must_use]
    pub const fn ramp_samples(&self) -> [Option<u16>; 2] {
        self.ramp_samples
    }

    #[must_use]
    pub const fn attached(&self) -> AttachState {
        self.attached
    }

    #[must_use]
    pub const fn probe_enabled(&self) -> bool {
        self.probe_enabled
    }

    #[must_use]
    pub const fn sense_enabled(&self) -> bool {
        self.sense_enabled
    }

    #[must_use]
    pub const fn sense_timer_armed(&self) -> bool {
        self.sense_timer_armed
    }

    #[must_use]
    pub const fn vbuson_timer_armed(&self) -> bool {
        self.vbuson_timer_armed
    }

    #[must_use]
    pub const fn role_decided(&self) -> Option<OtgRole> {
        self.role_decided
    }

    /// Shifts a new ramp reading in. Returns `true` for the first reading of a session.
    fn push_ramp_sample(&mut self, value: u16) -> bool {
        match self.ramp_samples[0] {
            None => {
                self.ramp_samples = [Some(value), None];
                true
            }
            Some(previous) => {
                self.ramp_samples = [Some(value), Some(previous)];
                false
            }
        }
    }

    /// Returns `true` when the two latest readings exist and differ.
    fn ramp_changed(&self) -> bool {
        matches!(self.ramp_samples, [Some(latest), Some(previous)] if latest != previous)
    }
}

/// ADP engine for a single OTG port.
pub struct AdpEngine<H, T, R> {
    config: AdpConfig,
    power: PowerSequencer,
    context: AdpContext,
    hardware: H,
    timers: T,
    roles: R,
    events: EventLog,
}

impl<H, T, R> AdpEngine<H, T, R>
where
    H: OtgHardware,
    T: TimerService,
    R: RoleInitializer,
{
    /// Creates an engine with a cleared context.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `config` fails validation.
    pub fn new(config: AdpConfig, hardware: H, timers: T, roles: R) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            config,
            power: PowerSequencer::new(config.power_down()),
            context: AdpContext::new(),
            hardware,
            timers,
            roles,
            events: EventLog::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdpConfig {
        &self.config
    }

    #[must_use]
    pub fn context(&self) -> &AdpContext {
        &self.context
    }

    /// Diagnostics history.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    #[must_use]
    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    #[must_use]
    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }

    #[must_use]
    pub fn roles(&self) -> &R {
        &self.roles
    }

    pub fn roles_mut(&mut self) -> &mut R {
        &mut self.roles
    }

    /// Kicks off attach detection right after ADP was enabled.
    ///
    /// Probing is skipped only when the port is a B-device with a session
    /// already valid; the peripheral stack is started directly in that case.
    pub fn start(&mut self, id_is_host: bool, session_valid: bool) {
        if !self.config.enabled() {
            crate::debug!("adp: disabled, ignoring start");
            return;
        }

        self.power.arm(&mut self.hardware);

        if id_is_host || !session_valid {
            self.context.initial_probe = true;
            self.probe_start();
        } else {
            crate::info!("adp: session already valid, skipping probe");
            self.enter_role(OtgRole::Peripheral);
        }
    }

    /// Enters the probe loop, resetting the ramp history of the previous session.
    pub fn probe_start(&mut self) {
        self.hardware.set_global_interrupts(false);
        self.hardware.mask_all_interrupts();
        if self.hardware.is_host_mode() {
            self.hardware.unmask_session_request_interrupt();
        }
        self.hardware.set_global_interrupts(true);

        self.context.probe_enabled = true;
        self.context.sense_enabled = false;
        self.context.mode = AdpMode::Probing;
        self.context.ramp_samples = [None, None];
        self.context.role_decided = None;

        self.reset_block();
        let value = self.probe_configuration();
        self.hardware.write_control(value);

        self.events.record(AdpEventKind::ProbeStarted);
        crate::debug!("adp: probe started");
    }

    /// Leaves the probe loop. Does not touch hardware when probing is not active.
    pub fn probe_stop(&mut self) {
        let was_enabled = core::mem::replace(&mut self.context.probe_enabled, false);
        if !was_enabled {
            crate::trace!("adp: probe not active");
            return;
        }

        self.reset_block();
        self.hardware.write_control(ControlRegister::zero());
        self.hardware.set_global_interrupts(true);

        if self.context.mode == AdpMode::Probing {
            self.context.mode = AdpMode::ProbeIdle;
        }
        self.events.record(AdpEventKind::ProbeStopped);
        crate::debug!("adp: probe stopped");
    }

    /// Enters the sense loop and arms the sense timer.
    pub fn sense_start(&mut self) {
        self.hardware.set_global_interrupts(false);

        self.context.sense_enabled = true;
        self.context.probe_enabled = false;
        self.context.mode = AdpMode::Sensing;

        self.reset_block();
        let mut value = ControlRegister::zero();
        value.set_enable(true);
        value.set_sense_enable(true);
        value.set_sense_interrupt_mask(true);
        self.hardware.write_control(value);

        self.arm_sense_timer();

        self.events.record(AdpEventKind::SenseStarted);
        crate::debug!("adp: sense started");
    }

    /// Leaves the sense loop, cancelling a pending sense timeout.
    pub fn sense_stop(&mut self) {
        if self.context.sense_timer_armed {
            self.context.sense_timer_armed = false;
            self.timers.cancel(AdpTimer::Sense);
        }

        let was_enabled = core::mem::replace(&mut self.context.sense_enabled, false);
        if !was_enabled {
            crate::trace!("adp: sense not active");
            return;
        }

        self.reset_block();
        self.hardware.write_control(ControlRegister::zero());
        self.hardware.set_global_interrupts(true);

        if self.context.mode == AdpMode::Sensing {
            self.context.mode = AdpMode::SenseIdle;
        }
        self.events.record(AdpEventKind::SenseStopped);
        crate::debug!("adp: sense stopped");
    }

    /// Reads the control register and handles whatever it reports.
    pub fn service_interrupt(&mut self) {
        let snapshot = self.hardware.read_control();
        self.handle_interrupt(snapshot);
    }

    /// Handles an ADP interrupt described by `snapshot`.
    ///
    /// Sense and probe/timeout conditions are handled independently; all three
    /// status bits are cleared afterwards whether or not they were set.
    pub fn handle_interrupt(&mut self, snapshot: ControlRegister) {
        if snapshot.sense_pending() {
            self.timers.cancel(AdpTimer::Sense);
            self.arm_sense_timer();
        }

        if snapshot.probe_pending() || snapshot.timeout_pending() {
            self.compare_ramp(snapshot.ramp_timer());
        }

        self.hardware
            .modify_control(0, ControlRegister::INTERRUPT_STATUS);
    }

    /// Handles the power-down logic reporting a Session Request.
    pub fn handle_srp_interrupt(&mut self) {
        self.context.attached = AttachState::Attached;
        self.events.record(AdpEventKind::SrpDetected);
        let enabled = self.config.enabled();

        if self.hardware.id_is_host() {
            crate::info!("adp: srp detected in host mode");
            if enabled {
                self.probe_stop();
                self.power.wake(&mut self.hardware);
                self.enter_role(OtgRole::Host);
            }

            self.hardware.set_port_power(true);
            self.roles.session_start_supervision();
        } else {
            crate::info!("adp: srp detected in device mode");
            if enabled {
                self.probe_stop();
                self.power.wake(&mut self.hardware);
                self.power.release(&mut self.hardware);
                self.enter_role(OtgRole::Peripheral);
            }
        }
    }

    /// Dispatches an expired timer.
    ///
    /// Expiries for timers the engine no longer considers armed are ignored.
    pub fn handle_timer(&mut self, timer: AdpTimer) {
        match timer {
            AdpTimer::Sense => self.sense_timeout(),
            AdpTimer::VbusOn => self.vbuson_timeout(),
        }
    }

    /// Reports that the host stack saw a downstream connect after VBUS was turned on.
    pub fn connection_detected(&mut self) {
        self.context.attached = AttachState::Attached;
        self.events.record(AdpEventKind::ConnectionDetected);

        if self.context.vbuson_timer_armed {
            self.context.vbuson_timer_armed = false;
            self.timers.cancel(AdpTimer::VbusOn);
        }
    }

    /// Tears the engine down, cancelling armed timers first.
    #[must_use]
    pub fn into_parts(mut self) -> (H, T, R) {
        if self.context.sense_timer_armed {
            self.context.sense_timer_armed = false;
            self.timers.cancel(AdpTimer::Sense);
        }
        if self.context.vbuson_timer_armed {
            self.context.vbuson_timer_armed = false;
            self.timers.cancel(AdpTimer::VbusOn);
        }

        (self.hardware, self.timers, self.roles)
    }

    fn probe_configuration(&self) -> ControlRegister {
        let calibration = self.config.probe_calibration();
        let mut value = ControlRegister::zero();
        value.set_probe_discharge(calibration.discharge);
        value.set_probe_delta(calibration.delta);
        value.set_probe_period(calibration.period);
        value.set_enable(true);
        value.set_probe_enable(true);
        value.set_probe_interrupt_mask(true);
        value.set_timeout_interrupt_mask(true);
        value
    }

    fn reset_block(&mut self) {
        if self.hardware.reset_and_wait().timed_out() {
            self.events.record(AdpEventKind::ResetTimeout);
        }
    }

    fn arm_sense_timer(&mut self) {
        self.context.sense_timer_armed = true;
        self.timers.arm(AdpTimer::Sense, self.config.sense_timeout());
    }

    fn compare_ramp(&mut self, value: u16) {
        self.events.record(AdpEventKind::RampSample(value));
        let first = self.context.push_ramp_sample(value);

        if first && self.context.initial_probe {
            self.resolve_initial_probe();
            return;
        }

        let id_is_host = self.hardware.id_is_host();
        let session_valid = self.hardware.session_valid();

        if self.context.ramp_changed() {
            self.attach_detected(id_is_host, session_valid);
        }

        if session_valid {
            self.session_valid_override();
        }
    }

    // First reading after power-up: nothing to compare against, so the ID pin
    // alone picks the role.
    fn resolve_initial_probe(&mut self) {
        self.context.initial_probe = false;
        self.events.record(AdpEventKind::InitialProbeResolved);

        self.probe_stop();
        self.power.release(&mut self.hardware);

        if self.hardware.id_is_host() {
            if self.enter_role(OtgRole::Host) {
                self.turn_on_vbus();
            }
        } else if self.enter_role(OtgRole::Peripheral) {
            self.roles.initiate_srp();
        }
    }

    fn attach_detected(&mut self, id_is_host: bool, session_valid: bool) {
        self.context.attached = AttachState::Attached;
        self.events.record(AdpEventKind::AttachDetected);
        crate::info!("adp: ramp changed, attach detected");

        self.probe_stop();
        self.power.wake(&mut self.hardware);

        if id_is_host {
            self.power.resume_host(&mut self.hardware);
            self.enter_role(OtgRole::Host);
        } else {
            self.power.resume_peripheral(&mut self.hardware);
            if self.enter_role(OtgRole::Peripheral) && !session_valid {
                self.roles.initiate_srp();
            }
        }
    }

    fn session_valid_override(&mut self) {
        if self.context.role_decided == Some(OtgRole::Peripheral) {
            return;
        }

        crate::debug!("adp: session valid while probing");
        self.power.resume_peripheral(&mut self.hardware);
        self.enter_role(OtgRole::Peripheral);
    }

    fn turn_on_vbus(&mut self) {
        self.hardware.set_port_power(true);
        self.context.vbuson_timer_armed = true;
        self.timers.arm(AdpTimer::VbusOn, self.config.vbuson_timeout());
        self.events.record(AdpEventKind::VbusOn);
    }

    fn sense_timeout(&mut self) {
        if !self.context.sense_timer_armed {
            crate::debug!("adp: stale sense timeout");
            return;
        }
        self.context.sense_timer_armed = false;
        self.events.record(AdpEventKind::SenseTimeout);

        if !self.config.enabled() {
            return;
        }

        crate::info!("adp: no sense signal, back to probing");
        self.sense_stop();
        self.probe_start();
    }

    fn vbuson_timeout(&mut self) {
        if !self.context.vbuson_timer_armed {
            crate::debug!("adp: stale vbus-on timeout");
            return;
        }
        self.context.vbuson_timer_armed = false;
        self.context.attached = AttachState::NotAttached;
        self.context.role_decided = None;
        self.events.record(AdpEventKind::VbusTimeout);
        crate::info!("adp: no connect after vbus on, powering down");

        self.hardware.set_port_power(false);
        self.power.power_down(&mut self.hardware);
        self.probe_start();
    }

    /// Returns `true` when `role` was not yet decided and the stack was started.
    fn enter_role(&mut self, role: OtgRole) -> bool {
        if self.context.role_decided == Some(role) {
            crate::debug!("adp: role {:?} already started", role);
            return false;
        }

        self.context.role_decided = Some(role);
        self.events.record(AdpEventKind::RoleDecided(role));
        crate::info!("adp: entering {:?}", role);

        match role {
            OtgRole::Host => self.roles.start_host(),
            OtgRole::Peripheral => self.roles.start_peripheral(),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_fills_only_latest_slot() {
        let mut context = AdpContext::new();

        assert!(context.push_ramp_sample(10));
        assert_eq!(context.ramp_samples(), [Some(10), None]);
        assert!(!context.ramp_changed());
    }

    #[test]
    fn later_samples_shift_history() {
        let mut context = AdpContext::new();
        context.push_ramp_sample(10);

        assert!(!context.push_ramp_sample(12));
        assert_eq!(context.ramp_samples(), [Some(12), Some(10)]);
        assert!(context.ramp_changed());

        assert!(!context.push_ramp_sample(12));
        assert_eq!(context.ramp_samples(), [Some(12), Some(12)]);
        assert!(!context.ramp_changed());
    }

    #[test]
    fn new_context_is_cleared() {
        let context = AdpContext::new();

        assert_eq!(context, AdpContext::default());
        assert_eq!(context.mode(), AdpMode::ProbeIdle);
        assert_eq!(context.attached(), AttachState::Unknown);
        assert_eq!(context.role_decided(), None);
    }
}
