//! Interrupt-to-task signalling.
//!
//! Interrupt handlers must not run the engine themselves (register waits
//! block for up to a second), so they post an [`AdpSignal`] and let the
//! driver loop dispatch it under the port lock.

use core::fmt;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use portable_atomic::{AtomicU32, Ordering};

/// Depth of the signal queue.
pub const SIGNAL_QUEUE_DEPTH: usize = 8;

/// Work posted by interrupt handlers for the ADP engine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdpSignal {
    /// The ADP block raised a probe, sense or timeout interrupt.
    Interrupt,
    /// The power-down logic detected a Session Request.
    SessionRequest,
    /// The host stack saw a downstream connection.
    Connected,
}

/// Errors returned when posting signals.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalError {
    QueueFull,
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalError::QueueFull => f.write_str("adp signal queue is full"),
        }
    }
}

/// Bounded signal queue with a dropped-signal counter.
pub struct SignalQueue<M: RawMutex> {
    channel: Channel<M, AdpSignal, SIGNAL_QUEUE_DEPTH>,
    dropped: AtomicU32,
}

impl<M: RawMutex> SignalQueue<M> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Posts a signal without waiting. Safe to call from interrupt context.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::QueueFull`] when the queue has no room; the
    /// signal is dropped and counted.
    pub fn post(&self, signal: AdpSignal) -> Result<(), SignalError> {
        self.channel.try_send(signal).map_err(|_| {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            adp_core::warn!("adp: signal queue full, dropping {:?}", signal);
            SignalError::QueueFull
        })
    }

    /// Waits for the next signal.
    pub async fn receive(&self) -> AdpSignal {
        self.channel.receive().await
    }

    /// Takes a queued signal without waiting.
    #[must_use]
    pub fn try_receive(&self) -> Option<AdpSignal> {
        self.channel.try_receive().ok()
    }

    /// Number of signals dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl<M: RawMutex> Default for SignalQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    #[test]
    fn signals_come_out_in_order() {
        let queue = SignalQueue::<CriticalSectionRawMutex>::new();

        queue.post(AdpSignal::Interrupt).expect("queue has room");
        queue.post(AdpSignal::Connected).expect("queue has room");

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.try_receive(), Some(AdpSignal::Interrupt));
        assert_eq!(queue.try_receive(), Some(AdpSignal::Connected));
        assert_eq!(queue.try_receive(), None);
    }

    #[test]
    fn full_queue_drops_and_counts() {
        let queue = SignalQueue::<CriticalSectionRawMutex>::new();
        for _ in 0..SIGNAL_QUEUE_DEPTH {
            queue.post(AdpSignal::Interrupt).expect("queue has room");
        }

        assert_eq!(
            queue.post(AdpSignal::SessionRequest),
            Err(SignalError::QueueFull)
        );
        assert_eq!(queue.post(AdpSignal::Interrupt), Err(SignalError::QueueFull));
        assert_eq!(queue.dropped(), 2);
        assert_eq!(queue.len(), SIGNAL_QUEUE_DEPTH);
    }
}
