//! Deadline-based timer service.
//!
//! The engine arms timers relative to the moment it calls
//! [`TimerService::arm`]; [`DeadlineTimers`] reads the embassy-time clock at
//! that point and stores the absolute instant the driver loop sleeps on.

use adp_core::{AdpTimer, TimerService};
use embassy_time::{Duration, Instant};

pub(crate) fn core_duration_to_embassy(duration: core::time::Duration) -> Duration {
    let micros = duration.as_micros();
    let micros = u64::try_from(micros).unwrap_or(u64::MAX);
    Duration::from_micros(micros)
}

/// One optional deadline per ADP timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DeadlineTimers {
    deadlines: [Option<Instant>; AdpTimer::COUNT],
}

impl DeadlineTimers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            deadlines: [None; AdpTimer::COUNT],
        }
    }

    /// Arms `timer` to expire `duration` after `now`, replacing any pending deadline.
    pub fn arm_at(&mut self, timer: AdpTimer, now: Instant, duration: Duration) {
        let deadline = now.checked_add(duration).unwrap_or(Instant::MAX);
        self.deadlines[timer.as_index()] = Some(deadline);
        adp_core::trace!("adp: {} armed for {} ms", timer.name(), duration.as_millis());
    }

    #[must_use]
    pub fn deadline(&self, timer: AdpTimer) -> Option<Instant> {
        self.deadlines[timer.as_index()]
    }

    #[must_use]
    pub fn is_armed(&self, timer: AdpTimer) -> bool {
        self.deadline(timer).is_some()
    }

    /// Returns the earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().flatten().min().copied()
    }

    /// Disarms and returns the earliest timer whose deadline is not after `now`.
    pub fn take_expired(&mut self, now: Instant) -> Option<AdpTimer> {
        let timer = AdpTimer::ALL
            .into_iter()
            .filter_map(|timer| {
                self.deadline(timer)
                    .filter(|deadline| *deadline <= now)
                    .map(|deadline| (deadline, timer))
            })
            .min_by_key(|(deadline, _)| *deadline)
            .map(|(_, timer)| timer)?;

        self.deadlines[timer.as_index()] = None;
        Some(timer)
    }
}

impl Default for DeadlineTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerService for DeadlineTimers {
    fn arm(&mut self, timer: AdpTimer, duration: core::time::Duration) {
        self.arm_at(timer, Instant::now(), core_duration_to_embassy(duration));
    }

    fn cancel(&mut self, timer: AdpTimer) {
        self.deadlines[timer.as_index()] = None;
    }
}
