//! Trigger-delay computation
//!
//! Maps an effective power level and dimming method to the offset from the
//! zero-cross at which the gate changes state. Everything here is a pure
//! function of its inputs.

use crate::config::DimMethod;
use crate::power::clamp_power;

/// Guard band kept free before the next zero-cross (epsilon)
pub const GATE_MARGIN_US: u32 = 200;

/// Gate pulse width for `LeadingPulse`
pub const PULSE_WIDTH_US: u32 = 100;

/// `Leading` releases the gate this long before the half-cycle ends
pub const RELEASE_GUARD_US: u32 = 100;

/// Latest permitted trigger offset for a half-cycle
pub fn latest_trigger_us(half_cycle_us: u32) -> u32 {
    half_cycle_us.saturating_sub(GATE_MARGIN_US)
}

/// Compute the trigger delay from the zero-cross
///
/// - Leading methods: the gate fires at `(1 - power) * half`; higher power
///   means an earlier trigger and a wider conduction angle.
/// - `Trailing`: the gate turns off at `power * half`.
///
/// The result is clamped to `[0, half - GATE_MARGIN_US]`, so nothing is ever
/// scheduled past the next zero-cross.
pub fn trigger_delay_us(power: f32, method: DimMethod, half_cycle_us: u32) -> u32 {
    let power = clamp_power(power);
    let fraction = if method.is_leading() {
        1.0 - power
    } else {
        power
    };

    // `as` saturates on overflow and maps NaN to 0
    let delay = (fraction * half_cycle_us as f32) as u32;
    delay.min(latest_trigger_us(half_cycle_us))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HALF_60HZ_US: u32 = 8_333;
    const HALF_50HZ_US: u32 = 10_000;

    #[test]
    fn test_leading_full_power_fires_at_cross() {
        assert_eq!(trigger_delay_us(1.0, DimMethod::LeadingPulse, HALF_50HZ_US), 0);
        assert_eq!(trigger_delay_us(1.0, DimMethod::Leading, HALF_50HZ_US), 0);
    }

    #[test]
    fn test_leading_low_power_clamped_before_next_cross() {
        assert_eq!(
            trigger_delay_us(0.0, DimMethod::LeadingPulse, HALF_50HZ_US),
            HALF_50HZ_US - GATE_MARGIN_US
        );
    }

    #[test]
    fn test_leading_half_power() {
        assert_eq!(trigger_delay_us(0.5, DimMethod::Leading, HALF_50HZ_US), 5_000);
    }

    #[test]
    fn test_trailing_half_power_60hz() {
        assert_eq!(trigger_delay_us(0.5, DimMethod::Trailing, HALF_60HZ_US), 4_166);
    }

    #[test]
    fn test_trailing_full_power_clamped() {
        assert_eq!(
            trigger_delay_us(1.0, DimMethod::Trailing, HALF_60HZ_US),
            HALF_60HZ_US - GATE_MARGIN_US
        );
    }

    #[test]
    fn test_tiny_half_cycle() {
        assert_eq!(trigger_delay_us(0.3, DimMethod::Leading, 150), 0);
    }

    fn any_method() -> impl Strategy<Value = DimMethod> {
        prop_oneof![
            Just(DimMethod::LeadingPulse),
            Just(DimMethod::Leading),
            Just(DimMethod::Trailing),
        ]
    }

    proptest! {
        #[test]
        fn prop_delay_within_half_cycle(
            power in -0.5f32..1.5,
            method in any_method(),
            half in 1_000u32..20_000,
        ) {
            let delay = trigger_delay_us(power, method, half);
            prop_assert!(delay <= half);
            prop_assert!(delay <= latest_trigger_us(half));
        }

        #[test]
        fn prop_leading_delay_non_increasing(
            a in 0.0f32..=1.0,
            b in 0.0f32..=1.0,
            half in 1_000u32..20_000,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            for method in [DimMethod::LeadingPulse, DimMethod::Leading] {
                prop_assert!(trigger_delay_us(hi, method, half) <= trigger_delay_us(lo, method, half));
            }
        }

        #[test]
        fn prop_trailing_delay_non_decreasing(
            a in 0.0f32..=1.0,
            b in 0.0f32..=1.0,
            half in 1_000u32..20_000,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                trigger_delay_us(hi, DimMethod::Trailing, half)
                    >= trigger_delay_us(lo, DimMethod::Trailing, half)
            );
        }
    }
}
