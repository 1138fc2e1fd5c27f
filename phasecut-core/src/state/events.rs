//! Events that drive the cycle state machine

/// Events raised by the zero-cross handler, timer callback and supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleEvent {
    // Zero-cross events
    /// Reference edge accepted, nothing armed this half-cycle
    Synced,
    /// Half-cycle started but the gate stays off
    CrossSkipped,
    /// Timer armed for the next gate edge
    PulseArmed,

    // Timer events
    /// Gate asserted
    GateFired,
    /// Gate released; nothing more this half-cycle
    GateReleased,
    /// Scheduler refused the request; cycle skipped
    ScheduleFailed,
    /// Gate or drain write failed; outputs forced safe
    PinFault,

    // Supervisor events
    /// Zero-cross edges stopped arriving
    MainsLost,
    /// Controller torn down
    Halted,
}
