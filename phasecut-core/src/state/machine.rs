//! Cycle state machine
//!
//! Gate output state is a function of the current phase and an event.
//! The sequencer consults the machine on every zero-cross and timer
//! callback, so transitions must stay trivially cheap.

use super::events::CycleEvent;

/// Phase of the current half-cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CyclePhase {
    /// No usable zero-cross reference; gate off, drain on
    #[default]
    AwaitingCross,
    /// Timer armed for the gate to fire
    PulseScheduled,
    /// Gate asserted; timer armed for the release
    PulseActive,
    /// Nothing more to do until the next zero-cross
    Idle,
}

impl CyclePhase {
    /// Check if the gate may be asserted in this phase
    pub fn gate_allowed(&self) -> bool {
        matches!(self, CyclePhase::PulseActive)
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: CycleEvent) -> Self {
        use CycleEvent::*;
        use CyclePhase::*;

        match (self, event) {
            // Supervisor events win from any phase
            (_, MainsLost) | (_, Halted) => AwaitingCross,

            // A zero-cross ends whatever the previous half-cycle was doing
            (_, Synced) | (_, CrossSkipped) => Idle,
            (_, PulseArmed) => PulseScheduled,

            (PulseScheduled, GateFired) => PulseActive,
            (PulseActive, GateReleased) => Idle,

            (PulseScheduled, ScheduleFailed) | (PulseActive, ScheduleFailed) => Idle,
            (AwaitingCross, PinFault) => AwaitingCross,
            (_, PinFault) => Idle,

            // Stale timer events are ignored
            _ => self,
        }
    }
}
