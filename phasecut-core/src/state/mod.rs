//! Cycle state machine
//!
//! Defines the per-half-cycle behavior of the gate sequencer.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::CycleEvent;
pub use machine::CyclePhase;
