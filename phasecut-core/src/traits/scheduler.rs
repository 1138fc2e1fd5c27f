//! One-shot gate timer trait

/// Errors reported by a gate scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleError {
    /// No timer slot available
    Exhausted,
    /// Delay cannot be represented by the timer
    OutOfRange,
}

/// Trait for the one-shot timer that paces the gate sequencer
///
/// At most one callback is outstanding at a time. Arming replaces any
/// pending callback. When the timer expires the platform must call
/// `AcDimmer::on_timer` from a context serialized with the zero-cross
/// handler.
pub trait GateScheduler {
    /// Arm the timer to expire `delay_us` microseconds from now
    ///
    /// A delay of zero expires as soon as possible.
    fn schedule(&mut self, delay_us: u32) -> Result<(), ScheduleError>;

    /// Cancel the pending callback, if any
    fn cancel(&mut self);
}
