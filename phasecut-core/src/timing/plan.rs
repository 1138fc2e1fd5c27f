//! Half-cycle gate plan
//!
//! A plan holds the two gate edges of one half-cycle as offsets from the
//! zero-cross. The sequencer turns it into timer callbacks.

use crate::config::DimMethod;

use super::delay::{
    latest_trigger_us, trigger_delay_us, PULSE_WIDTH_US, RELEASE_GUARD_US,
};

/// Gate edges for one half-cycle, relative to the zero-cross
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GatePlan {
    /// Offset at which the gate is asserted
    pub fire_at_us: u32,
    /// Offset at which the gate is released
    pub release_at_us: u32,
}

/// Build the gate plan for one half-cycle
///
/// `power` is the effective power (limits already applied). Returns `None`
/// when the gate must stay off for the whole half-cycle.
pub fn plan_half_cycle(power: f32, method: DimMethod, half_cycle_us: u32) -> Option<GatePlan> {
    if !(power > 0.0) || latest_trigger_us(half_cycle_us) == 0 {
        return None;
    }

    let delay_us = trigger_delay_us(power, method, half_cycle_us);

    let plan = match method {
        DimMethod::LeadingPulse => GatePlan {
            fire_at_us: delay_us,
            release_at_us: delay_us + PULSE_WIDTH_US,
        },
        DimMethod::Leading => GatePlan {
            fire_at_us: delay_us,
            release_at_us: half_cycle_us - RELEASE_GUARD_US,
        },
        DimMethod::Trailing => {
            if delay_us == 0 {
                return None;
            }
            GatePlan {
                fire_at_us: 0,
                release_at_us: delay_us,
            }
        }
    };

    Some(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::delay::GATE_MARGIN_US;

    const HALF_US: u32 = 10_000;

    #[test]
    fn test_off_when_power_zero() {
        for method in [DimMethod::LeadingPulse, DimMethod::Leading, DimMethod::Trailing] {
            assert_eq!(plan_half_cycle(0.0, method, HALF_US), None);
        }
        assert_eq!(plan_half_cycle(f32::NAN, DimMethod::Leading, HALF_US), None);
    }

    #[test]
    fn test_leading_pulse_plan() {
        let plan = plan_half_cycle(0.25, DimMethod::LeadingPulse, HALF_US).unwrap();
        assert_eq!(plan.fire_at_us, 7_500);
        assert_eq!(plan.release_at_us, 7_500 + PULSE_WIDTH_US);
    }

    #[test]
    fn test_leading_pulse_full_power() {
        let plan = plan_half_cycle(1.0, DimMethod::LeadingPulse, HALF_US).unwrap();
        assert_eq!(plan.fire_at_us, 0);
    }

    #[test]
    fn test_leading_hold_plan() {
        let plan = plan_half_cycle(0.5, DimMethod::Leading, HALF_US).unwrap();
        assert_eq!(plan.fire_at_us, 5_000);
        assert_eq!(plan.release_at_us, HALF_US - RELEASE_GUARD_US);
    }

    #[test]
    fn test_trailing_plan() {
        let plan = plan_half_cycle(0.5, DimMethod::Trailing, 8_333).unwrap();
        assert_eq!(plan.fire_at_us, 0);
        assert_eq!(plan.release_at_us, 4_166);
    }

    #[test]
    fn test_release_stays_inside_half_cycle() {
        for method in [DimMethod::LeadingPulse, DimMethod::Leading, DimMethod::Trailing] {
            for step in 1..=20 {
                let power = step as f32 / 20.0;
                let plan = plan_half_cycle(power, method, HALF_US).unwrap();
                assert!(plan.fire_at_us < plan.release_at_us);
                assert!(plan.release_at_us <= HALF_US - PULSE_WIDTH_US.min(GATE_MARGIN_US));
            }
        }
    }

    #[test]
    fn test_degenerate_half_cycle() {
        assert_eq!(plan_half_cycle(0.5, DimMethod::Leading, GATE_MARGIN_US), None);
    }
}
