//! Static configuration for an ADP port.

use core::{fmt, time::Duration};

/// Default time to wait for a sense interrupt before returning to probing.
pub const DEFAULT_SENSE_TIMEOUT: Duration = Duration::from_millis(3_000);

/// Default time to wait for a downstream connect after VBUS was turned on.
pub const DEFAULT_VBUSON_TIMEOUT: Duration = Duration::from_millis(1_100);

/// Largest value accepted by the 2-bit probe calibration fields.
pub const MAX_CALIBRATION: u8 = 0b11;

/// How deep the controller powers down while waiting for an attach.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerDownDepth {
    /// Power-down logic is never armed by the platform.
    None,
    /// Power-down logic keeps attach detection alive; the core domain stays powered.
    #[default]
    Passive,
    /// The core domain is isolated and switched off (hibernation).
    Cold,
}

impl PowerDownDepth {
    /// Returns `true` when the core domain power switch must be driven.
    #[must_use]
    pub const fn is_cold(self) -> bool {
        matches!(self, PowerDownDepth::Cold)
    }
}

/// Probe calibration written alongside the probe enable bits.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProbeCalibration {
    pub discharge: u8,
    pub delta: u8,
    pub period: u8,
}

impl ProbeCalibration {
    /// Creates a calibration set.
    #[must_use]
    pub const fn new(discharge: u8, delta: u8, period: u8) -> Self {
        Self {
            discharge,
            delta,
            period,
        }
    }

    /// Returns `true` when every field fits its 2-bit register slot.
    #[must_use]
    pub const fn fits(&self) -> bool {
        self.discharge <= MAX_CALIBRATION
            && self.delta <= MAX_CALIBRATION
            && self.period <= MAX_CALIBRATION
    }
}

impl Default for ProbeCalibration {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

/// Errors reported by [`AdpConfig::validate`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The sense timeout was zero.
    ZeroSenseTimeout,
    /// The VBUS-on timeout was zero.
    ZeroVbusonTimeout,
    /// A probe calibration field does not fit in two bits.
    CalibrationOutOfRange,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroSenseTimeout => f.write_str("sense timeout must be non-zero"),
            ConfigError::ZeroVbusonTimeout => f.write_str("vbus-on timeout must be non-zero"),
            ConfigError::CalibrationOutOfRange => {
                write!(f, "probe calibration fields must be 0-{MAX_CALIBRATION}")
            }
        }
    }
}

/// Per-port ADP configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AdpConfig {
    enabled: bool,
    power_down: PowerDownDepth,
    sense_timeout: Duration,
    vbuson_timeout: Duration,
    probe_calibration: ProbeCalibration,
}

impl AdpConfig {
    /// Creates an enabled configuration with the default timeouts.
    #[must_use]
    pub const fn new(power_down: PowerDownDepth) -> Self {
        Self {
            enabled: true,
            power_down,
            sense_timeout: DEFAULT_SENSE_TIMEOUT,
            vbuson_timeout: DEFAULT_VBUSON_TIMEOUT,
            probe_calibration: ProbeCalibration::new(1, 1, 1),
        }
    }

    /// Creates a configuration with ADP turned off.
    #[must_use]
    pub const fn disabled() -> Self {
        let mut config = Self::new(PowerDownDepth::None);
        config.enabled = false;
        config
    }

    /// Overrides the sense timeout.
    #[must_use]
    pub const fn with_sense_timeout(mut self, timeout: Duration) -> Self {
        self.sense_timeout = timeout;
        self
    }

    /// Overrides the VBUS-on timeout.
    #[must_use]
    pub const fn with_vbuson_timeout(mut self, timeout: Duration) -> Self {
        self.vbuson_timeout = timeout;
        self
    }

    /// Overrides the probe calibration.
    #[must_use]
    pub const fn with_probe_calibration(mut self, calibration: ProbeCalibration) -> Self {
        self.probe_calibration = calibration;
        self
    }

    /// Returns `true` when ADP is enabled for this port.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the configured power-down depth.
    #[must_use]
    pub const fn power_down(&self) -> PowerDownDepth {
        self.power_down
    }

    /// Returns the sense timeout.
    #[must_use]
    pub const fn sense_timeout(&self) -> Duration {
        self.sense_timeout
    }

    /// Returns the VBUS-on timeout.
    #[must_use]
    pub const fn vbuson_timeout(&self) -> Duration {
        self.vbuson_timeout
    }

    /// Returns the probe calibration.
    #[must_use]
    pub const fn probe_calibration(&self) -> ProbeCalibration {
        self.probe_calibration
    }

    /// Checks that the configuration can be programmed into hardware.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sense_timeout.is_zero() {
            return Err(ConfigError::ZeroSenseTimeout);
        }
        if self.vbuson_timeout.is_zero() {
            return Err(ConfigError::ZeroVbusonTimeout);
        }
        if !self.probe_calibration.fits() {
            return Err(ConfigError::CalibrationOutOfRange);
        }
        Ok(())
    }
}

impl Default for AdpConfig {
    fn default() -> Self {
        Self::new(PowerDownDepth::default())
    }
}
