//! Timer service contract consumed by the engine.

use core::fmt;

/// One-shot timers owned by an ADP port.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdpTimer {
    /// Fires when no sense interrupt arrived within the sense timeout.
    Sense,
    /// Fires when no downstream connection appeared after VBUS was turned on.
    VbusOn,
}

impl AdpTimer {
    /// Total number of distinct timers.
    pub const COUNT: usize = 2;

    /// Every timer, in index order.
    pub const ALL: [AdpTimer; Self::COUNT] = [AdpTimer::Sense, AdpTimer::VbusOn];

    /// Deterministic index for per-timer lookup tables.
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            AdpTimer::Sense => 0,
            AdpTimer::VbusOn => 1,
        }
    }

    /// Human readable timer name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            AdpTimer::Sense => "adp-sense",
            AdpTimer::VbusOn => "adp-vbuson",
        }
    }
}

impl fmt::Display for AdpTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Schedules one pending expiry per [`AdpTimer`].
///
/// Expiry is reported back by calling
/// [`AdpEngine::handle_timer`](crate::engine::AdpEngine::handle_timer) from a
/// context serialized with every other engine entry point.
pub trait TimerService {
    /// Arms `timer`, replacing any pending expiry.
    fn arm(&mut self, timer: AdpTimer, duration: core::time::Duration);

    /// Cancels `timer`. Cancelling an idle timer is a no-op.
    fn cancel(&mut self, timer: AdpTimer);
}
