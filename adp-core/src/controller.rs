//! Controller-level status and interrupt gating used around ADP transitions.

use crate::power::PowerDomain;
use crate::register::RegisterModel;

/// Controller signals and global controls outside the ADP register.
pub trait OtgController {
    /// ID status reported by the power-down logic; `true` selects the A-device (host).
    fn id_is_host(&mut self) -> bool;

    /// B-session valid as reported by the power-down logic.
    fn session_valid(&mut self) -> bool;

    /// Returns `true` when the controller currently operates in host mode.
    fn is_host_mode(&mut self) -> bool;

    /// Opens or closes the global interrupt gate.
    fn set_global_interrupts(&mut self, enabled: bool);

    /// Masks every controller interrupt source and clears pending status.
    fn mask_all_interrupts(&mut self);

    /// Unmasks only the session-request interrupt.
    fn unmask_session_request_interrupt(&mut self);

    /// Drives the host port power (VBUS) switch.
    fn set_port_power(&mut self, on: bool);
}

/// Everything the engine needs from the hardware of a single OTG port.
pub trait OtgHardware: RegisterModel + OtgController + PowerDomain {}

impl<T> OtgHardware for T where T: RegisterModel + OtgController + PowerDomain {}
