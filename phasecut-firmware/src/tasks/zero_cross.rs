//! Zero-cross edge task
//!
//! Waits for the configured detector edge, timestamps it and hands it to
//! the dimmer.

use defmt::*;
use embassy_rp::gpio::Input;

use phasecut_core::config::InterruptEdge;
use phasecut_drivers::dimmer::wait_for_cross;

use crate::dimmer::{now_us, with_dimmer};

/// Zero-cross task
#[embassy_executor::task]
pub async fn zero_cross_task(mut input: Input<'static>, edge: InterruptEdge) {
    info!("Zero-cross task started (edge={})", edge);

    loop {
        match wait_for_cross(&mut input, edge).await {
            Ok(()) => {
                let now = now_us();
                with_dimmer(|dimmer| dimmer.on_zero_cross(now));
            }
            Err(e) => match e {},
        }
    }
}
