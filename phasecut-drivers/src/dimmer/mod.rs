//! Phase-control dimmer driver
//!
//! Supported methods:
//! - `LeadingPulse`: short gate pulse at the trigger angle (triac)
//! - `Leading`: gate held from the trigger angle to the end of the half-cycle
//! - `Trailing`: gate on from the zero-cross until the cut-off angle (MOSFET/IGBT)

pub mod ac;
pub mod edge;
pub mod gate;

pub use ac::{AcDimmer, TimerAction};
pub use edge::wait_for_cross;
pub use gate::GateOutput;
