//! Single-port mutual-exclusion domain around the ADP engine.
//!
//! Every engine entry point (interrupt servicing, SRP, connection reports and
//! timer expiries) runs inside one blocking-mutex section, so register
//! read-modify-write sequences and context updates never interleave.

use core::cell::RefCell;

use adp_core::{AdpConfig, AdpEngine, ConfigError, OtgHardware, RoleInitializer};
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Instant;

use crate::signal::AdpSignal;
use crate::timers::DeadlineTimers;

/// Engine type driven by the runtime.
pub type RuntimeEngine<H, R> = AdpEngine<H, DeadlineTimers, R>;

/// ADP engine guarded by a blocking mutex.
pub struct SharedAdp<M: RawMutex, H, R> {
    inner: Mutex<M, RefCell<RuntimeEngine<H, R>>>,
}

impl<M, H, R> SharedAdp<M, H, R>
where
    M: RawMutex,
    H: OtgHardware,
    R: RoleInitializer,
{
    /// Builds the engine with a fresh [`DeadlineTimers`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `config` fails validation.
    pub fn new(config: AdpConfig, hardware: H, roles: R) -> Result<Self, ConfigError> {
        let engine = AdpEngine::new(config, hardware, DeadlineTimers::new(), roles)?;
        Ok(Self::from_engine(engine))
    }

    #[must_use]
    pub fn from_engine(engine: RuntimeEngine<H, R>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(engine)),
        }
    }

    /// Runs `f` on the engine inside the lock.
    ///
    /// `f` must not call back into this `SharedAdp`.
    pub fn with<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut RuntimeEngine<H, R>) -> T,
    {
        self.inner.lock(|cell| f(&mut *cell.borrow_mut()))
    }

    /// Starts attach detection.
    pub fn start(&self, id_is_host: bool, session_valid: bool) {
        self.with(|engine| engine.start(id_is_host, session_valid));
    }

    /// Hands a posted signal to the engine.
    pub fn dispatch(&self, signal: AdpSignal) {
        adp_core::trace!("adp: dispatching {:?}", signal);
        self.with(|engine| match signal {
            AdpSignal::Interrupt => engine.service_interrupt(),
            AdpSignal::SessionRequest => engine.handle_srp_interrupt(),
            AdpSignal::Connected => engine.connection_detected(),
        });
    }

    /// Runs the callbacks of every timer that expired by `now`. Returns how many fired.
    #[must_use]
    pub fn fire_expired(&self, now: Instant) -> usize {
        self.with(|engine| {
            let mut fired = 0;
            while let Some(timer) = engine.timers_mut().take_expired(now) {
                adp_core::debug!("adp: {} expired", timer.name());
                engine.handle_timer(timer);
                fired += 1;
            }
            fired
        })
    }

    /// Earliest armed timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner.lock(|cell| cell.borrow().timers().next_deadline())
    }

    #[must_use]
    pub fn into_inner(self) -> RuntimeEngine<H, R> {
        self.inner.into_inner().into_inner()
    }
}
