//! Power setpoint and output limits
//!
//! The setpoint is written by the control loop and read from the zero-cross
//! interrupt. It is stored as the bit pattern of an `f32` in a single
//! word-sized atomic, so neither side ever takes a lock.

use portable_atomic::{AtomicU32, Ordering};

use crate::config::DimmerConfig;

/// Clamp a power command into [0, 1]
///
/// NaN maps to 0 so a corrupted command can only ever switch the load off.
pub fn clamp_power(power: f32) -> f32 {
    if power.is_nan() {
        0.0
    } else {
        power.clamp(0.0, 1.0)
    }
}

/// Lock-free power setpoint shared between control loop and interrupt context
#[derive(Debug)]
pub struct PowerSetpoint {
    bits: AtomicU32,
}

impl Default for PowerSetpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerSetpoint {
    /// Create a setpoint at 0.0
    pub const fn new() -> Self {
        Self {
            // 0.0f32 has an all-zero bit pattern
            bits: AtomicU32::new(0),
        }
    }

    /// Store a new power command, clamped into [0, 1]
    pub fn set(&self, power: f32) {
        self.bits
            .store(clamp_power(power).to_bits(), Ordering::Relaxed);
    }

    /// Load the current power command
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

/// Mapping from a commanded power to the power actually applied
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerLimits {
    /// Floor applied while the output is on
    pub min_power: f32,
    /// Ceiling applied to every command
    pub max_power: f32,
    /// Commands below `min_power` switch the output fully off
    pub zero_means_zero: bool,
    /// Output level is `1 - power` after the limits are applied
    pub inverted: bool,
}

impl Default for PowerLimits {
    fn default() -> Self {
        Self {
            min_power: 0.1,
            max_power: 1.0,
            zero_means_zero: false,
            inverted: false,
        }
    }
}

impl PowerLimits {
    /// Limits taken from a dimmer configuration
    pub fn from_config(config: &DimmerConfig) -> Self {
        Self {
            min_power: config.min_power,
            max_power: config.max_power,
            zero_means_zero: config.zero_means_zero,
            inverted: config.inverted,
        }
    }

    /// Power applied for a commanded value
    ///
    /// Returns 0.0 only when the output must stay fully off for the
    /// half-cycle. Without `zero_means_zero` the limited value never drops
    /// below `min_power`. Inversion is applied last.
    pub fn effective(&self, commanded: f32) -> f32 {
        let power = self.limited(clamp_power(commanded));
        if self.inverted {
            1.0 - power
        } else {
            power
        }
    }

    fn limited(&self, power: f32) -> f32 {
        if power < self.min_power {
            if self.zero_means_zero {
                return 0.0;
            }
            return clamp_power(self.min_power);
        }

        power.min(clamp_power(self.max_power))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_power() {
        assert_eq!(clamp_power(-0.5), 0.0);
        assert_eq!(clamp_power(1.5), 1.0);
        assert_eq!(clamp_power(0.3), 0.3);
        assert_eq!(clamp_power(f32::NAN), 0.0);
        assert_eq!(clamp_power(f32::INFINITY), 1.0);
    }

    #[test]
    fn test_setpoint_roundtrip_and_clamp() {
        let setpoint = PowerSetpoint::new();
        assert_eq!(setpoint.get(), 0.0);

        setpoint.set(0.42);
        assert_eq!(setpoint.get(), 0.42);

        setpoint.set(7.0);
        assert_eq!(setpoint.get(), 1.0);

        setpoint.set(-1.0);
        assert_eq!(setpoint.get(), 0.0);
    }

    #[test]
    fn test_zero_means_zero() {
        let limits = PowerLimits {
            zero_means_zero: true,
            ..Default::default()
        };
        assert_eq!(limits.effective(0.0), 0.0);
        assert_eq!(limits.effective(0.05), 0.0);
        assert_eq!(limits.effective(0.1), 0.1);
        assert_eq!(limits.effective(0.5), 0.5);
    }

    #[test]
    fn test_min_power_floor() {
        let limits = PowerLimits::default();
        assert_eq!(limits.effective(0.0), 0.1);
        assert_eq!(limits.effective(0.05), 0.1);
        assert_eq!(limits.effective(0.7), 0.7);
    }

    #[test]
    fn test_max_power_ceiling() {
        let limits = PowerLimits {
            max_power: 0.8,
            ..Default::default()
        };
        assert_eq!(limits.effective(1.0), 0.8);
        assert_eq!(limits.effective(0.5), 0.5);
    }

    #[test]
    fn test_inverted_output() {
        let limits = PowerLimits {
            inverted: true,
            zero_means_zero: true,
            min_power: 0.25,
            max_power: 0.75,
        };
        assert_eq!(limits.effective(0.0), 1.0);
        assert_eq!(limits.effective(0.5), 0.5);
        assert_eq!(limits.effective(1.0), 0.25);
        assert_eq!(limits.effective(f32::NAN), 1.0);
    }

    #[test]
    fn test_from_config() {
        let config = DimmerConfig {
            zero_means_zero: true,
            min_power: 0.2,
            inverted: true,
            ..Default::default()
        };
        let limits = PowerLimits::from_config(&config);
        assert!(limits.zero_means_zero);
        assert!(limits.inverted);
        assert_eq!(limits.min_power, 0.2);
        assert_eq!(limits.max_power, 1.0);
    }
}
