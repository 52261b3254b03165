//! Role initializer contract.

use core::fmt;

/// Role the local port assumes once attachment is confirmed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OtgRole {
    /// A-device acting as host.
    Host,
    /// B-device acting as peripheral.
    Peripheral,
}

impl fmt::Display for OtgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OtgRole::Host => f.write_str("a-host"),
            OtgRole::Peripheral => f.write_str("b-peripheral"),
        }
    }
}

/// Starts the controller stacks on behalf of the engine.
///
/// Calls are blocking and must not re-enter the engine.
pub trait RoleInitializer {
    /// Initializes the core for host mode and starts the host stack.
    fn start_host(&mut self);

    /// Initializes the core for device mode and starts the peripheral stack.
    fn start_peripheral(&mut self);

    /// Asks the peripheral stack to issue a Session Request.
    fn initiate_srp(&mut self);

    /// Starts host-side connect supervision (a connect is expected within 10 s).
    fn session_start_supervision(&mut self);
}
