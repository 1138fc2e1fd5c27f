//! Embassy-backed gate scheduler
//!
//! Arming and cancelling only post a request to the gate timer task, so
//! both are safe to call from inside the dimmer lock.

use embassy_time::{Duration, Instant};

use phasecut_core::traits::{GateScheduler, ScheduleError};

use crate::channels::{TimerRequest, TIMER_REQUEST};

/// Gate scheduler that forwards requests to `gate_timer_task`
pub struct SignalScheduler;

impl GateScheduler for SignalScheduler {
    fn schedule(&mut self, delay_us: u32) -> Result<(), ScheduleError> {
        let deadline = Instant::now()
            .checked_add(Duration::from_micros(delay_us as u64))
            .ok_or(ScheduleError::OutOfRange)?;
        TIMER_REQUEST.signal(TimerRequest::Arm(deadline));
        Ok(())
    }

    fn cancel(&mut self) {
        TIMER_REQUEST.signal(TimerRequest::Cancel);
    }
}
