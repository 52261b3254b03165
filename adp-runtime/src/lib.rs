#![no_std]

// Embassy runtime glue for the ADP engine.
//
// Interrupt handlers post signals, the driver loop in `task` sleeps on the
// signal queue and the earliest timer deadline, and every engine call happens
// inside the `SharedAdp` lock.

pub mod shared;
pub mod signal;
pub mod task;
pub mod timers;

pub use shared::{RuntimeEngine, SharedAdp};
pub use signal::{AdpSignal, SIGNAL_QUEUE_DEPTH, SignalError, SignalQueue};
pub use task::{next_wake, run};
pub use timers::DeadlineTimers;
