//! Shared dimmer instance
//!
//! The zero-cross, gate timer and supervisor tasks all reach the dimmer
//! through one critical-section mutex, which serializes the callbacks.

use core::cell::RefCell;

use embassy_rp::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Instant;

use phasecut_drivers::dimmer::AcDimmer;

use crate::scheduler::SignalScheduler;

/// Dimmer wired to RP2040 outputs and the embassy scheduler
pub type FirmwareDimmer = AcDimmer<'static, Output<'static>, Output<'static>, SignalScheduler>;

static DIMMER: Mutex<CriticalSectionRawMutex, RefCell<Option<FirmwareDimmer>>> =
    Mutex::new(RefCell::new(None));

/// Hand the configured dimmer over to the tasks
pub fn install(dimmer: FirmwareDimmer) {
    DIMMER.lock(|cell| {
        cell.replace(Some(dimmer));
    });
}

/// Run `f` on the dimmer inside the critical section
///
/// Returns None before `install`.
pub fn with_dimmer<R>(f: impl FnOnce(&mut FirmwareDimmer) -> R) -> Option<R> {
    DIMMER.lock(|cell| cell.borrow_mut().as_mut().map(f))
}

/// Free-running microsecond timestamp
///
/// Truncation to `u32` wraps every ~71 minutes; the dimmer only compares
/// timestamps with wrapping arithmetic.
pub fn now_us() -> u32 {
    Instant::now().as_micros() as u32
}
