#![allow(dead_code)]

use core::time::Duration;

use adp_core::register::{ACCESS_READ, ACCESS_WRITE};
use adp_core::{
    AdpConfig, AdpEngine, AdpTimer, ControlRegister, OtgController, PowerDomain, RegisterModel,
    RoleInitializer, TimerService,
};
use heapless::Vec as HeaplessVec;

const RESET_BIT: u32 = 1 << 19;
const RAMP_SHIFT: u32 = 6;
const RAMP_FIELD: u32 = 0x7FF << RAMP_SHIFT;

pub type TestEngine = AdpEngine<MockHardware, RecordingTimers, RecordingRoles>;

pub fn build_engine(config: AdpConfig) -> TestEngine {
    AdpEngine::new(
        config,
        MockHardware::default(),
        RecordingTimers::default(),
        RecordingRoles::default(),
    )
    .expect("test configuration should validate")
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PowerOp {
    Logic(bool),
    SrpMask(bool),
    Switch(bool),
    Isolation(bool),
    StopClock,
}

/// ADPCTL plus the controller status the engine samples.
///
/// Writes only take effect when posted with `ar = 0b10`; `ar` reads back as
/// zero unless the access handshake is stuck. Status bits are write-one-to-clear
/// and the reset bit clears itself unless `stuck_reset` is set.
#[derive(Default)]
pub struct MockHardware {
    control: u32,
    status: u32,
    ramp: u16,
    reset_latched: bool,
    pending_ar: u32,
    pub stuck_reset: bool,
    pub stuck_access: bool,
    pub id_host: bool,
    pub session_valid: bool,
    pub host_mode: bool,
    pub port_power: bool,
    pub global_interrupts: bool,
    pub session_request_unmasked: bool,
    pub interrupt_masks: u32,
    pub resets: u32,
    pub writes: u32,
    pub pauses: u32,
    pub power_ops: HeaplessVec<PowerOp, 64>,
}

impl MockHardware {
    /// Register contents as a read would return them, minus `ar`.
    pub fn control(&self) -> ControlRegister {
        let mut raw = self.control | self.status | (u32::from(self.ramp) << RAMP_SHIFT);
        if self.reset_latched {
            raw |= RESET_BIT;
        }
        ControlRegister::from_bits(raw)
    }

    /// Latches a probe interrupt carrying `ramp`.
    pub fn raise_probe(&mut self, ramp: u16) {
        self.ramp = ramp;
        self.status |= 1 << 21;
    }

    pub fn raise_sense(&mut self) {
        self.status |= 1 << 22;
    }

    pub fn raise_timeout(&mut self, ramp: u16) {
        self.ramp = ramp;
        self.status |= 1 << 23;
    }

    pub fn pending_status(&self) -> u32 {
        self.status
    }

    fn apply_write(&mut self, data: u32) {
        self.writes += 1;
        self.status &= !(data & ControlRegister::INTERRUPT_STATUS);

        if data & RESET_BIT != 0 {
            self.resets += 1;
            self.control = 0;
            self.status = 0;
            self.reset_latched = self.stuck_reset;
            return;
        }

        self.control = data
            & !(ControlRegister::INTERRUPT_STATUS
                | ControlRegister::ACCESS_REQUEST
                | RAMP_FIELD
                | RESET_BIT);
    }
}

impl RegisterModel for MockHardware {
    fn load(&mut self) -> u32 {
        self.control().bits() | self.pending_ar
    }

    fn store(&mut self, raw: u32) {
        let request = ControlRegister::from_bits(raw);
        let code = request.access_request();

        if self.stuck_access {
            self.pending_ar = raw & ControlRegister::ACCESS_REQUEST;
        }

        if code == ACCESS_WRITE {
            self.apply_write(raw & !ControlRegister::ACCESS_REQUEST);
        } else {
            assert_eq!(code, ACCESS_READ, "raw store without access request");
        }
    }

    fn pause(&mut self, _ms: u32) {
        self.pauses += 1;
    }
}

impl OtgController for MockHardware {
    fn id_is_host(&mut self) -> bool {
        self.id_host
    }

    fn session_valid(&mut self) -> bool {
        self.session_valid
    }

    fn is_host_mode(&mut self) -> bool {
        self.host_mode
    }

    fn set_global_interrupts(&mut self, enabled: bool) {
        self.global_interrupts = enabled;
    }

    fn mask_all_interrupts(&mut self) {
        self.interrupt_masks += 1;
        self.session_request_unmasked = false;
    }

    fn unmask_session_request_interrupt(&mut self) {
        self.session_request_unmasked = true;
    }

    fn set_port_power(&mut self, on: bool) {
        self.port_power = on;
    }
}

impl PowerDomain for MockHardware {
    fn set_power_down_logic(&mut self, enabled: bool) {
        self.power_ops.push(PowerOp::Logic(enabled)).unwrap();
    }

    fn mask_srp_detect(&mut self, masked: bool) {
        self.power_ops.push(PowerOp::SrpMask(masked)).unwrap();
    }

    fn switch_domain_power(&mut self, on: bool) {
        self.power_ops.push(PowerOp::Switch(on)).unwrap();
    }

    fn set_domain_isolation(&mut self, engaged: bool) {
        self.power_ops.push(PowerOp::Isolation(engaged)).unwrap();
    }

    fn stop_phy_clock(&mut self) {
        self.power_ops.push(PowerOp::StopClock).unwrap();
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TimerCall {
    Arm(AdpTimer, Duration),
    Cancel(AdpTimer),
}

/// Timer service that records calls and tracks what is armed.
#[derive(Default)]
pub struct RecordingTimers {
    pub calls: HeaplessVec<TimerCall, 32>,
    armed: [Option<Duration>; AdpTimer::COUNT],
}

impl RecordingTimers {
    pub fn armed(&self, timer: AdpTimer) -> Option<Duration> {
        self.armed[timer.as_index()]
    }

    pub fn arm_count(&self, timer: AdpTimer) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, TimerCall::Arm(armed, _) if *armed == timer))
            .count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl TimerService for RecordingTimers {
    fn arm(&mut self, timer: AdpTimer, duration: Duration) {
        self.armed[timer.as_index()] = Some(duration);
        self.calls.push(TimerCall::Arm(timer, duration)).unwrap();
    }

    fn cancel(&mut self, timer: AdpTimer) {
        self.armed[timer.as_index()] = None;
        self.calls.push(TimerCall::Cancel(timer)).unwrap();
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RoleCall {
    StartHost,
    StartPeripheral,
    InitiateSrp,
    SessionSupervision,
}

#[derive(Default)]
pub struct RecordingRoles {
    pub calls: HeaplessVec<RoleCall, 16>,
}

impl RecordingRoles {
    pub fn count(&self, call: RoleCall) -> usize {
        self.calls.iter().filter(|recorded| **recorded == call).count()
    }
}

impl RoleInitializer for RecordingRoles {
    fn start_host(&mut self) {
        self.calls.push(RoleCall::StartHost).unwrap();
    }

    fn start_peripheral(&mut self) {
        self.calls.push(RoleCall::StartPeripheral).unwrap();
    }

    fn initiate_srp(&mut self) {
        self.calls.push(RoleCall::InitiateSrp).unwrap();
    }

    fn session_start_supervision(&mut self) {
        self.calls.push(RoleCall::SessionSupervision).unwrap();
    }
}

/// Raises a probe interrupt with `ramp` and lets the engine service it.
pub fn deliver_probe(engine: &mut TestEngine, ramp: u16) {
    engine.hardware_mut().raise_probe(ramp);
    engine.service_interrupt();
}

/// Starts a steady-state probe session (no bootstrap pending).
pub fn steady_probe(engine: &mut TestEngine) {
    engine.probe_start();
    engine.roles_mut().calls.clear();
}
