//! Hardware abstraction traits
//!
//! These traits define the interface between the dimming logic
//! and hardware-specific implementations. Gate and drain pins use
//! `embedded_hal::digital::OutputPin` directly.

pub mod dimmer;
pub mod scheduler;

pub use dimmer::{Dimmer, DimmerError};
pub use scheduler::{GateScheduler, ScheduleError};
