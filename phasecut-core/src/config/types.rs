//! Configuration type definitions
//!
//! These types represent the dimmer configuration. The configuration is
//! fixed once the controller is constructed.

use heapless::String;

use super::hardware::PinConfig;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Accepted nominal mains frequency range (Hz)
pub const MIN_MAINS_FREQUENCY_HZ: u8 = 45;
pub const MAX_MAINS_FREQUENCY_HZ: u8 = 65;

/// How the gate is driven relative to the zero-cross
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DimMethod {
    /// Short gate pulse at the trigger point; the triac latches until the
    /// next zero-cross
    #[default]
    LeadingPulse,
    /// Gate held from the trigger point to the end of the half-cycle
    Leading,
    /// Gate on at the zero-cross, off at the trigger point
    Trailing,
}

impl DimMethod {
    /// Leading-edge methods conduct for the late part of the half-cycle
    pub const fn is_leading(self) -> bool {
        matches!(self, DimMethod::LeadingPulse | DimMethod::Leading)
    }
}

/// Which zero-cross transitions arm the timing logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptEdge {
    /// Falling edge only (one interrupt per mains cycle)
    Falling,
    /// Rising edge only (one interrupt per mains cycle)
    Rising,
    /// Both edges (one interrupt per half-cycle)
    #[default]
    Any,
    /// Both edges; same timing as `Any`
    Change,
}

impl InterruptEdge {
    /// Whether both transitions of the zero-cross line are reported
    pub const fn is_dual_edge(self) -> bool {
        matches!(self, InterruptEdge::Any | InterruptEdge::Change)
    }

    /// Number of half-cycles between two reported edges
    pub const fn half_cycles_per_edge(self) -> u32 {
        if self.is_dual_edge() {
            1
        } else {
            2
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pin number outside the target's GPIO range
    InvalidPin(u8),
    /// The same GPIO is bound to two dimmer lines
    PinConflict(u8),
    /// min/max power outside [0, 1] or min above max
    InvalidPowerRange,
    /// Nominal mains frequency outside the accepted range
    InvalidFrequency,
}

/// AC dimmer configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DimmerConfig {
    /// Label used in log output
    pub name: String<MAX_LABEL_LEN>,
    /// Triac gate drive output
    pub gate_pin: PinConfig,
    /// Diac timing-network drain output
    pub diac_drain_pin: PinConfig,
    /// Zero-cross detector input
    pub zero_cross_pin: PinConfig,
    /// Wait one synchronisation edge before the first trigger
    pub init_with_half_cycle: bool,
    /// Conduction strategy
    pub method: DimMethod,
    /// Zero-cross edges that arm the timing logic
    pub interrupt_edge: InterruptEdge,
    /// A power below `min_power` switches the load fully off
    pub zero_means_zero: bool,
    /// Apply `1 - power` after the limits, for loads wired to conduct when
    /// the command says off
    pub inverted: bool,
    /// Lowest power applied while the output is on (0.0-1.0)
    pub min_power: f32,
    /// Highest power applied (0.0-1.0)
    pub max_power: f32,
    /// Nominal mains frequency seeding the half-cycle estimate
    pub mains_frequency_hz: u8,
    /// Power setpoint applied at boot
    pub initial_power: f32,
}

impl Default for DimmerConfig {
    fn default() -> Self {
        let mut name = String::new();
        let _ = name.push_str("dimmer");
        Self {
            name,
            gate_pin: PinConfig::new(0),
            diac_drain_pin: PinConfig::new(1),
            zero_cross_pin: PinConfig::new(2),
            init_with_half_cycle: true,
            method: DimMethod::LeadingPulse,
            interrupt_edge: InterruptEdge::Any,
            zero_means_zero: false,
            inverted: false,
            min_power: 0.1,
            max_power: 1.0,
            mains_frequency_hz: 50,
            initial_power: 0.0,
        }
    }
}

impl DimmerConfig {
    /// Check pin bindings, power limits and mains frequency
    ///
    /// A configuration that fails here must not reach the run loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = [self.gate_pin, self.diac_drain_pin, self.zero_cross_pin];

        for pin in &pins {
            if !pin.is_valid() {
                return Err(ConfigError::InvalidPin(pin.pin));
            }
        }

        for (i, a) in pins.iter().enumerate() {
            if pins[i + 1..].iter().any(|b| b.pin == a.pin) {
                return Err(ConfigError::PinConflict(a.pin));
            }
        }

        // NaN fails every comparison, so it lands here too
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        if !in_unit(self.min_power) || !in_unit(self.max_power) || self.min_power > self.max_power
        {
            return Err(ConfigError::InvalidPowerRange);
        }

        if !(MIN_MAINS_FREQUENCY_HZ..=MAX_MAINS_FREQUENCY_HZ).contains(&self.mains_frequency_hz) {
            return Err(ConfigError::InvalidFrequency);
        }

        Ok(())
    }

    /// Nominal half-cycle length derived from the mains frequency
    pub fn nominal_half_cycle_us(&self) -> u32 {
        500_000 / u32::from(self.mains_frequency_hz.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DimmerConfig::default();
        assert!(config.init_with_half_cycle);
        assert_eq!(config.method, DimMethod::LeadingPulse);
        assert_eq!(config.interrupt_edge, InterruptEdge::Any);
        assert!(!config.zero_means_zero);
        assert!(!config.inverted);
        assert_eq!(config.min_power, 0.1);
        assert_eq!(config.max_power, 1.0);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_nominal_half_cycle() {
        let mut config = DimmerConfig::default();
        assert_eq!(config.nominal_half_cycle_us(), 10_000);
        config.mains_frequency_hz = 60;
        assert_eq!(config.nominal_half_cycle_us(), 8_333);
    }

    #[test]
    fn test_invalid_pin() {
        let config = DimmerConfig {
            gate_pin: PinConfig::new(30),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidPin(30)));
    }

    #[test]
    fn test_pin_conflict() {
        let config = DimmerConfig {
            gate_pin: PinConfig::new(7),
            zero_cross_pin: PinConfig::with_pullup(7),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::PinConflict(7)));
    }

    #[test]
    fn test_power_range() {
        let inverted = DimmerConfig {
            min_power: 0.6,
            max_power: 0.4,
            ..Default::default()
        };
        assert_eq!(inverted.validate(), Err(ConfigError::InvalidPowerRange));

        let nan = DimmerConfig {
            min_power: f32::NAN,
            ..Default::default()
        };
        assert_eq!(nan.validate(), Err(ConfigError::InvalidPowerRange));
    }

    #[test]
    fn test_frequency_range() {
        let config = DimmerConfig {
            mains_frequency_hz: 80,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidFrequency));
    }

    #[test]
    fn test_edge_modes() {
        assert!(InterruptEdge::Any.is_dual_edge());
        assert!(InterruptEdge::Change.is_dual_edge());
        assert_eq!(InterruptEdge::Rising.half_cycles_per_edge(), 2);
        assert_eq!(InterruptEdge::Falling.half_cycles_per_edge(), 2);
        assert_eq!(InterruptEdge::Any.half_cycles_per_edge(), 1);
    }
}
