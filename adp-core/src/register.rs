//! Typed view over the ADP control register and the access-request handshake.
//!
//! The ADP block lives in an always-on domain clocked independently of the
//! controller core, so every read or write goes through an access request:
//! software posts `ar = 0b01` (read) or `ar = 0b10` (write, together with the
//! data) and polls until the hardware clears `ar`. [`RegisterModel`] layers
//! that handshake over three raw primitives supplied by the platform.

use bitfield::bitfield;

/// Number of polls performed before an access request or reset wait gives up.
pub const ACCESS_POLL_LIMIT: u32 = 10;

/// Delay between successive polls, in milliseconds.
pub const ACCESS_POLL_INTERVAL_MS: u32 = 100;

/// Access-request code posted to read the register.
pub const ACCESS_READ: u8 = 0b01;

/// Access-request code posted to write the register.
pub const ACCESS_WRITE: u8 = 0b10;

bitfield! {
    /// ADPCTL register layout.
    #[derive(Copy, Clone, PartialEq, Eq, Default)]
    pub struct ControlRegister(u32);
    impl Debug;
    /// Probe discharge time calibration (write-only).
    pub u8, probe_discharge, set_probe_discharge: 1, 0;
    /// Probe delta calibration (write-only).
    pub u8, probe_delta, set_probe_delta: 3, 2;
    /// Probe period calibration (write-only).
    pub u8, probe_period, set_probe_period: 5, 4;
    /// Ramp timer captured at the last probe cycle.
    pub u16, ramp_timer, set_ramp_timer: 16, 6;
    /// Probe enable.
    pub probe_enable, set_probe_enable: 17;
    /// Sense enable.
    pub sense_enable, set_sense_enable: 18;
    /// ADP reset, self-clearing.
    pub reset, set_reset: 19;
    /// ADP block enable.
    pub enable, set_enable: 20;
    /// Probe interrupt status (write-one-to-clear).
    pub probe_interrupt, set_probe_interrupt: 21;
    /// Sense interrupt status (write-one-to-clear).
    pub sense_interrupt, set_sense_interrupt: 22;
    /// Timeout interrupt status (write-one-to-clear).
    pub timeout_interrupt, set_timeout_interrupt: 23;
    /// Probe interrupt mask, set to unmask.
    pub probe_interrupt_mask, set_probe_interrupt_mask: 24;
    /// Sense interrupt mask, set to unmask.
    pub sense_interrupt_mask, set_sense_interrupt_mask: 25;
    /// Timeout interrupt mask, set to unmask.
    pub timeout_interrupt_mask, set_timeout_interrupt_mask: 26;
    /// Access request handshake.
    pub u8, access_request, set_access_request: 28, 27;
}

#[cfg(feature = "defmt")]
impl defmt::Format for ControlRegister {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(f, "ControlRegister({=u32:#010x})", self.0);
    }
}

impl ControlRegister {
    /// Probe, sense and timeout interrupt status bits.
    pub const INTERRUPT_STATUS: u32 = (1 << 21) | (1 << 22) | (1 << 23);

    /// Access-request field.
    pub const ACCESS_REQUEST: u32 = 0b11 << 27;

    /// Register with every bit cleared.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Wraps a raw register value.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw register value.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Request that resets the ADP block.
    #[must_use]
    pub fn reset_request() -> Self {
        let mut value = Self::zero();
        value.set_reset(true);
        value
    }

    /// Returns `true` when the sense interrupt is pending and unmasked.
    #[must_use]
    pub fn sense_pending(self) -> bool {
        self.sense_interrupt() && self.sense_interrupt_mask()
    }

    /// Returns `true` when the probe interrupt is pending and unmasked.
    #[must_use]
    pub fn probe_pending(self) -> bool {
        self.probe_interrupt() && self.probe_interrupt_mask()
    }

    /// Returns `true` when the timeout interrupt is pending and unmasked.
    #[must_use]
    pub fn timeout_pending(self) -> bool {
        self.timeout_interrupt() && self.timeout_interrupt_mask()
    }
}

/// Outcome of a bounded register poll.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// Hardware acknowledged within the poll budget.
    Acknowledged(ControlRegister),
    /// Poll budget exhausted; carries the last value observed.
    TimedOut(ControlRegister),
}

impl PollOutcome {
    /// Returns the register value regardless of the outcome.
    #[must_use]
    pub const fn value(self) -> ControlRegister {
        match self {
            PollOutcome::Acknowledged(value) | PollOutcome::TimedOut(value) => value,
        }
    }

    /// Returns `true` when the poll budget ran out.
    #[must_use]
    pub const fn timed_out(self) -> bool {
        matches!(self, PollOutcome::TimedOut(_))
    }
}

/// Access to the ADP control register.
///
/// Implementors provide the raw bus primitives; the handshake, the
/// read-modify-write helper and the reset wait are shared. All polls are
/// bounded by [`ACCESS_POLL_LIMIT`] and fail open: on exhaustion the last
/// value read is returned and processing continues.
pub trait RegisterModel {
    /// Reads the raw register value without any handshake.
    fn load(&mut self) -> u32;

    /// Writes the raw register value without any handshake.
    fn store(&mut self, raw: u32);

    /// Blocks the calling context for `ms` milliseconds.
    fn pause(&mut self, ms: u32);

    /// Posts an access request and polls until the hardware clears `ar`.
    fn access(&mut self, mut request: ControlRegister, code: u8) -> PollOutcome {
        request.set_access_request(code);
        self.store(request.bits());

        let mut value = ControlRegister::from_bits(self.load());
        let mut polls = 1;
        while value.access_request() != 0 {
            if polls >= ACCESS_POLL_LIMIT {
                crate::warn!("adp: access request {} not acknowledged", code);
                return PollOutcome::TimedOut(value);
            }
            self.pause(ACCESS_POLL_INTERVAL_MS);
            value = ControlRegister::from_bits(self.load());
            polls += 1;
        }

        PollOutcome::Acknowledged(value)
    }

    /// Reads the control register through the access-request handshake.
    fn read_control(&mut self) -> ControlRegister {
        self.access(ControlRegister::zero(), ACCESS_READ).value()
    }

    /// Writes the control register through the access-request handshake.
    fn write_control(&mut self, value: ControlRegister) {
        self.access(value, ACCESS_WRITE);
    }

    /// Clears then sets bits in the control register.
    fn modify_control(&mut self, clear: u32, set: u32) {
        let current = self.read_control().bits() & !ControlRegister::ACCESS_REQUEST;
        self.write_control(ControlRegister::from_bits((current & !clear) | set));
    }

    /// Resets the ADP block and waits for the self-clearing reset bit.
    fn reset_and_wait(&mut self) -> PollOutcome {
        self.write_control(ControlRegister::reset_request());

        let mut value = self.read_control();
        let mut polls = 1;
        while value.reset() {
            if polls >= ACCESS_POLL_LIMIT {
                crate::warn!("adp: reset did not complete, continuing");
                return PollOutcome::TimedOut(value);
            }
            self.pause(ACCESS_POLL_INTERVAL_MS);
            value = self.read_control();
            polls += 1;
        }

        PollOutcome::Acknowledged(value)
    }
}
