//! Diagnostics event catalog for the ADP engine.
//!
//! Every state transition the engine performs is appended to a bounded
//! [`EventLog`]. Event kinds encode to compact numeric codes so the history can
//! be mirrored over diagnostics transports without pulling in a serializer.

use core::fmt;

use heapless::HistoryBuf;

use crate::role::OtgRole;

/// Number of records the engine keeps.
pub const EVENT_LOG_CAPACITY: usize = 32;

/// Discriminated ADP diagnostics events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdpEventKind {
    ProbeStarted,
    ProbeStopped,
    SenseStarted,
    SenseStopped,
    RampSample(u16),
    InitialProbeResolved,
    AttachDetected,
    RoleDecided(OtgRole),
    VbusOn,
    VbusTimeout,
    SenseTimeout,
    SrpDetected,
    ConnectionDetected,
    ResetTimeout,
    Custom(u16),
}

impl fmt::Display for AdpEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdpEventKind::ProbeStarted => f.write_str("probe-started"),
            AdpEventKind::ProbeStopped => f.write_str("probe-stopped"),
            AdpEventKind::SenseStarted => f.write_str("sense-started"),
            AdpEventKind::SenseStopped => f.write_str("sense-stopped"),
            AdpEventKind::RampSample(value) => write!(f, "ramp-sample {value}"),
            AdpEventKind::InitialProbeResolved => f.write_str("initial-probe-resolved"),
            AdpEventKind::AttachDetected => f.write_str("attach-detected"),
            AdpEventKind::RoleDecided(role) => write!(f, "role-decided {role}"),
            AdpEventKind::VbusOn => f.write_str("vbus-on"),
            AdpEventKind::VbusTimeout => f.write_str("vbus-timeout"),
            AdpEventKind::SenseTimeout => f.write_str("sense-timeout"),
            AdpEventKind::SrpDetected => f.write_str("srp-detected"),
            AdpEventKind::ConnectionDetected => f.write_str("connection-detected"),
            AdpEventKind::ResetTimeout => f.write_str("reset-timeout"),
            AdpEventKind::Custom(code) => write!(f, "custom({code})"),
        }
    }
}

impl AdpEventKind {
    const PROBE_STARTED_CODE: u16 = 0x0001;
    const PROBE_STOPPED_CODE: u16 = 0x0002;
    const SENSE_STARTED_CODE: u16 = 0x0003;
    const SENSE_STOPPED_CODE: u16 = 0x0004;
    const INITIAL_PROBE_CODE: u16 = 0x0005;
    const ATTACH_DETECTED_CODE: u16 = 0x0006;
    const VBUS_ON_CODE: u16 = 0x0007;
    const VBUS_TIMEOUT_CODE: u16 = 0x0008;
    const SENSE_TIMEOUT_CODE: u16 = 0x0009;
    const SRP_DETECTED_CODE: u16 = 0x000A;
    const CONNECTION_DETECTED_CODE: u16 = 0x000B;
    const RESET_TIMEOUT_CODE: u16 = 0x000C;
    const ROLE_DECIDED_BASE: u16 = 0x0010;
    const RAMP_SAMPLE_BASE: u16 = 0x0800;
    const RAMP_SAMPLE_MASK: u16 = 0x07FF;

    /// Encodes the event into a compact transport-friendly discriminant.
    ///
    /// Ramp samples occupy `0x0800..=0x0FFF`, carrying the 11-bit reading.
    #[must_use]
    pub const fn to_raw(self) -> u16 {
        match self {
            AdpEventKind::ProbeStarted => Self::PROBE_STARTED_CODE,
            AdpEventKind::ProbeStopped => Self::PROBE_STOPPED_CODE,
            AdpEventKind::SenseStarted => Self::SENSE_STARTED_CODE,
            AdpEventKind::SenseStopped => Self::SENSE_STOPPED_CODE,
            AdpEventKind::RampSample(value) => {
                Self::RAMP_SAMPLE_BASE | (value & Self::RAMP_SAMPLE_MASK)
            }
            AdpEventKind::InitialProbeResolved => Self::INITIAL_PROBE_CODE,
            AdpEventKind::AttachDetected => Self::ATTACH_DETECTED_CODE,
            AdpEventKind::RoleDecided(role) => Self::ROLE_DECIDED_BASE + role_index(role),
            AdpEventKind::VbusOn => Self::VBUS_ON_CODE,
            AdpEventKind::VbusTimeout => Self::VBUS_TIMEOUT_CODE,
            AdpEventKind::SenseTimeout => Self::SENSE_TIMEOUT_CODE,
            AdpEventKind::SrpDetected => Self::SRP_DETECTED_CODE,
            AdpEventKind::ConnectionDetected => Self::CONNECTION_DETECTED_CODE,
            AdpEventKind::ResetTimeout => Self::RESET_TIMEOUT_CODE,
            AdpEventKind::Custom(code) => code,
        }
    }

    /// Decodes a raw discriminant, falling back to [`AdpEventKind::Custom`].
    #[must_use]
    pub fn from_raw(code: u16) -> Self {
        match code {
            Self::PROBE_STARTED_CODE => AdpEventKind::ProbeStarted,
            Self::PROBE_STOPPED_CODE => AdpEventKind::ProbeStopped,
            Self::SENSE_STARTED_CODE => AdpEventKind::SenseStarted,
            Self::SENSE_STOPPED_CODE => AdpEventKind::SenseStopped,
            Self::INITIAL_PROBE_CODE => AdpEventKind::InitialProbeResolved,
            Self::ATTACH_DETECTED_CODE => AdpEventKind::AttachDetected,
            Self::VBUS_ON_CODE => AdpEventKind::VbusOn,
            Self::VBUS_TIMEOUT_CODE => AdpEventKind::VbusTimeout,
            Self::SENSE_TIMEOUT_CODE => AdpEventKind::SenseTimeout,
            Self::SRP_DETECTED_CODE => AdpEventKind::SrpDetected,
            Self::CONNECTION_DETECTED_CODE => AdpEventKind::ConnectionDetected,
            Self::RESET_TIMEOUT_CODE => AdpEventKind::ResetTimeout,
            value if (Self::ROLE_DECIDED_BASE..Self::ROLE_DECIDED_BASE + 2).contains(&value) => {
                role_from_index(value - Self::ROLE_DECIDED_BASE)
                    .map_or(AdpEventKind::Custom(value), AdpEventKind::RoleDecided)
            }
            value if (value & !Self::RAMP_SAMPLE_MASK) == Self::RAMP_SAMPLE_BASE => {
                AdpEventKind::RampSample(value & Self::RAMP_SAMPLE_MASK)
            }
            other => AdpEventKind::Custom(other),
        }
    }
}

const fn role_index(role: OtgRole) -> u16 {
    match role {
        OtgRole::Host => 0,
        OtgRole::Peripheral => 1,
    }
}

fn role_from_index(index: u16) -> Option<OtgRole> {
    match index {
        0 => Some(OtgRole::Host),
        1 => Some(OtgRole::Peripheral),
        _ => None,
    }
}

/// Entry stored in the [`EventLog`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdpRecord {
    pub sequence: u32,
    pub event: AdpEventKind,
}

/// Bounded history of ADP events; the oldest records are overwritten.
pub struct EventLog<const CAPACITY: usize = EVENT_LOG_CAPACITY> {
    ring: HistoryBuf<AdpRecord, CAPACITY>,
    next_sequence: u32,
}

impl<const CAPACITY: usize> EventLog<CAPACITY> {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_sequence: 0,
        }
    }

    /// Appends an event and returns its sequence number.
    pub fn record(&mut self, event: AdpEventKind) -> u32 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.ring.write(AdpRecord { sequence, event });
        sequence
    }

    /// Returns the records in chronological order.
    #[must_use]
    pub fn oldest_first(&self) -> impl Iterator<Item = &AdpRecord> + '_ {
        self.ring.oldest_ordered()
    }

    /// Returns the most recent record, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&AdpRecord> {
        self.ring.recent()
    }

    /// Returns `true` when `event` is still held in the history.
    #[must_use]
    pub fn contains(&self, event: AdpEventKind) -> bool {
        self.oldest_first().any(|record| record.event == event)
    }

    /// Counts how many retained records match `event`.
    #[must_use]
    pub fn count(&self, event: AdpEventKind) -> usize {
        self.oldest_first()
            .filter(|record| record.event == event)
            .count()
    }

    /// Returns the number of records currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Drops every stored record; sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.ring.clear();
    }
}

impl<const CAPACITY: usize> Default for EventLog<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}
