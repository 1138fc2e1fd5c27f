//! Gate timer task
//!
//! Runs the one-shot timer behind `SignalScheduler`. A new request always
//! replaces the pending one.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Instant, Timer};

use crate::channels::{TimerRequest, TIMER_REQUEST};
use crate::dimmer::{now_us, with_dimmer};

/// Gate timer task
#[embassy_executor::task]
pub async fn gate_timer_task() {
    info!("Gate timer task started");

    let mut armed: Option<Instant> = None;

    loop {
        let request = match armed {
            Some(deadline) => match select(Timer::at(deadline), TIMER_REQUEST.wait()).await {
                Either::First(()) => {
                    armed = None;
                    expire();
                    continue;
                }
                Either::Second(request) => request,
            },
            None => TIMER_REQUEST.wait().await,
        };

        armed = match request {
            TimerRequest::Arm(deadline) => Some(deadline),
            TimerRequest::Cancel => None,
        };
    }
}

/// Deliver an expiry unless a newer request superseded it
fn expire() {
    with_dimmer(|dimmer| {
        if TIMER_REQUEST.signaled() {
            trace!("Gate timer expiry superseded");
            return;
        }
        dimmer.on_timer(now_us());
    });
}
