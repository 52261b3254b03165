#![no_std]

// Attach Detect Protocol engine for USB OTG ports.
//
// This crate stays portable across MCU firmware and host tooling by avoiding the
// Rust standard library. Hardware, timers and the controller role stacks are
// reached through the traits in `register`, `controller`, `power`, `timer` and
// `role`; `engine` owns the state machine that ties them together.

pub mod fmt;

pub mod config;
pub mod controller;
pub mod engine;
pub mod power;
pub mod register;
pub mod role;
pub mod telemetry;
pub mod timer;

pub use config::{AdpConfig, ConfigError, PowerDownDepth, ProbeCalibration};
pub use controller::{OtgController, OtgHardware};
pub use engine::{AdpContext, AdpEngine, AdpMode, AttachState};
pub use power::{PowerDomain, PowerSequencer};
pub use register::{ControlRegister, RegisterModel};
pub use role::{OtgRole, RoleInitializer};
pub use telemetry::{AdpEventKind, AdpRecord, EventLog};
pub use timer::{AdpTimer, TimerService};
