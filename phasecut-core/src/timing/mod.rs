//! Phase-angle timing
//!
//! Trigger-delay computation and the per-half-cycle gate plan built from it.

pub mod delay;
pub mod plan;

pub use delay::{
    latest_trigger_us, trigger_delay_us, GATE_MARGIN_US, PULSE_WIDTH_US, RELEASE_GUARD_US,
};
pub use plan::{plan_half_cycle, GatePlan};
