//! Inter-task communication channels
//!
//! Defines the static signals shared between the Embassy tasks and the
//! dimmer callbacks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;

use phasecut_core::power::PowerSetpoint;

/// Request from the dimmer to the gate timer task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerRequest {
    /// Expire at the given instant, replacing any pending expiry
    Arm(Instant),
    /// Drop the pending expiry
    Cancel,
}

/// Gate timer request (latest request wins)
pub static TIMER_REQUEST: Signal<CriticalSectionRawMutex, TimerRequest> = Signal::new();

/// Power setpoint, read at each half-cycle boundary
///
/// Seeded from `initial_power` at boot. This is the write side for any
/// task that commands the dimmer; nothing else in the firmware changes it.
pub static SETPOINT: PowerSetpoint = PowerSetpoint::new();
