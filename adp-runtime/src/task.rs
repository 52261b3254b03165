//! Async driver loop for one ADP port.

use adp_core::{OtgHardware, RoleInitializer};
use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Instant, Timer};

use crate::shared::SharedAdp;
use crate::signal::{AdpSignal, SignalQueue};

/// Waits for the next posted signal or the earliest timer deadline.
///
/// Returns `None` when woken by a deadline.
pub async fn next_wake<M, Q, H, R>(
    shared: &SharedAdp<M, H, R>,
    signals: &SignalQueue<Q>,
) -> Option<AdpSignal>
where
    M: RawMutex,
    Q: RawMutex,
    H: OtgHardware,
    R: RoleInitializer,
{
    match shared.next_deadline() {
        Some(deadline) => match select(signals.receive(), Timer::at(deadline)).await {
            Either::First(signal) => Some(signal),
            Either::Second(()) => None,
        },
        None => Some(signals.receive().await),
    }
}

/// Drives the engine forever: dispatches posted signals and fires expired timers.
///
/// Timer deadlines are re-read on every iteration, so a signal that arms or
/// cancels a timer takes effect on the next wait. Expiry is judged against the
/// clock read after dispatch.
pub async fn run<M, Q, H, R>(shared: &SharedAdp<M, H, R>, signals: &SignalQueue<Q>) -> !
where
    M: RawMutex,
    Q: RawMutex,
    H: OtgHardware,
    R: RoleInitializer,
{
    adp_core::info!("adp: runtime started");

    loop {
        if let Some(signal) = next_wake(shared, signals).await {
            shared.dispatch(signal);
        }

        let fired = shared.fire_expired(Instant::now());
        if fired > 0 {
            adp_core::trace!("adp: {} timer(s) fired", fired);
        }
    }
}
