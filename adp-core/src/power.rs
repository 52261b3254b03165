//! Power-down domain contract and the sequencing policy layered on top of it.
//!
//! The power-down logic keeps attach detection alive while the controller
//! core is idle. [`PowerSequencer`] holds no state besides the configured
//! [`PowerDownDepth`]; it only fixes the order in which the engine touches the
//! domain so SRP detection is never unmasked into a half-configured domain.

use crate::config::PowerDownDepth;

/// Abstract operations over the power-down logic domain.
pub trait PowerDomain {
    /// Enables or disables the power-down logic.
    fn set_power_down_logic(&mut self, enabled: bool);

    /// Masks or unmasks the SRP-detect interrupt raised by the power-down logic.
    fn mask_srp_detect(&mut self, masked: bool);

    /// Switches the core domain supply. Only driven for [`PowerDownDepth::Cold`].
    fn switch_domain_power(&mut self, on: bool);

    /// Engages reset and clamps between the always-on and the core domain.
    fn set_domain_isolation(&mut self, engaged: bool);

    /// Stops the PHY clock ahead of a domain collapse.
    fn stop_phy_clock(&mut self);
}

/// Ordering policy for power-domain transitions.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerSequencer {
    depth: PowerDownDepth,
}

impl PowerSequencer {
    /// Creates a sequencer for the configured depth.
    #[must_use]
    pub const fn new(depth: PowerDownDepth) -> Self {
        Self { depth }
    }

    /// Returns the configured depth.
    #[must_use]
    pub const fn depth(&self) -> PowerDownDepth {
        self.depth
    }

    /// Brings the power-down logic up so it can report SRP while probing.
    pub fn arm<D: PowerDomain + ?Sized>(&self, domain: &mut D) {
        domain.set_power_down_logic(true);
        domain.mask_srp_detect(false);
    }

    /// Restores core domain power after an attach was detected.
    pub fn wake<D: PowerDomain + ?Sized>(&self, domain: &mut D) {
        if self.depth.is_cold() {
            domain.switch_domain_power(true);
        }
    }

    /// Turns the power-down logic off without touching SRP detection.
    pub fn release<D: PowerDomain + ?Sized>(&self, domain: &mut D) {
        domain.set_power_down_logic(false);
    }

    /// Leaves power-down ahead of host-mode operation.
    pub fn resume_host<D: PowerDomain + ?Sized>(&self, domain: &mut D) {
        domain.set_power_down_logic(false);
    }

    /// Leaves power-down ahead of peripheral-mode operation.
    ///
    /// SRP detection is masked first so the domain cannot raise a wake
    /// interrupt while it is being switched off.
    pub fn resume_peripheral<D: PowerDomain + ?Sized>(&self, domain: &mut D) {
        domain.mask_srp_detect(true);
        domain.set_power_down_logic(false);
    }

    /// Parks the port in power-down after an unanswered VBUS pulse.
    ///
    /// SRP detection is unmasked only once the domain has settled.
    pub fn power_down<D: PowerDomain + ?Sized>(&self, domain: &mut D) {
        if self.depth.is_cold() {
            domain.set_domain_isolation(true);
            domain.stop_phy_clock();
            domain.set_power_down_logic(true);
            domain.switch_domain_power(false);
        } else {
            domain.set_power_down_logic(true);
        }

        domain.mask_srp_detect(false);
    }
}
