//! Mains supervisor task
//!
//! Polls the dimmer for mains dropout and logs:
//! - Mains loss and recovery
//! - Health faults as they appear and clear
//! - Periodic counter deltas and the measured mains frequency

use defmt::*;
use embassy_time::{Duration, Ticker};

use phasecut_core::config::MAX_LABEL_LEN;
use phasecut_core::safety::{HealthSnapshot, HealthStatus};

use crate::dimmer::{now_us, with_dimmer};

/// Dropout poll interval in milliseconds
pub const POLL_INTERVAL_MS: u32 = 5;

/// Health report interval in milliseconds
pub const REPORT_INTERVAL_MS: u32 = 10_000;

/// One supervisor pass
struct Observation {
    dropout: bool,
    status: HealthStatus,
    health: HealthSnapshot,
    frequency_hz_x10: Option<u16>,
}

/// Supervisor task
#[embassy_executor::task]
pub async fn supervisor_task(name: heapless::String<MAX_LABEL_LEN>) {
    info!("[{}] Supervisor task started", name.as_str());

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS as u64));
    let report_ticks = REPORT_INTERVAL_MS / POLL_INTERVAL_MS;
    let mut ticks: u32 = 0;
    let mut last_status = HealthStatus::Ok;
    let mut last_report = HealthSnapshot::default();
    let mut was_present = false;

    loop {
        ticker.next().await;

        let Some(obs) = with_dimmer(|dimmer| Observation {
            dropout: dimmer.poll(now_us()),
            status: dimmer.check(),
            health: dimmer.health(),
            frequency_hz_x10: dimmer.mains_frequency_hz_x10(),
        }) else {
            continue;
        };

        if obs.dropout {
            warn!("[{}] Mains lost, gate forced off", name.as_str());
        } else if obs.health.mains_present && !was_present {
            info!("[{}] Mains detected", name.as_str());
        }
        was_present = obs.health.mains_present;

        if obs.status != last_status {
            match obs.status {
                HealthStatus::Ok => info!("[{}] Health restored", name.as_str()),
                HealthStatus::Fault(kind) => warn!("[{}] Health fault: {}", name.as_str(), kind),
            }
            last_status = obs.status;
        }

        ticks += 1;
        if ticks >= report_ticks {
            ticks = 0;
            report(name.as_str(), &last_report, &obs);
            last_report = obs.health;
        }
    }
}

/// Log counter deltas since the previous report
fn report(name: &str, previous: &HealthSnapshot, obs: &Observation) {
    let now = &obs.health;

    match obs.frequency_hz_x10 {
        Some(f) => debug!(
            "[{}] Mains {}.{} Hz, {} edges",
            name,
            f / 10,
            f % 10,
            now.edges.wrapping_sub(previous.edges)
        ),
        None => debug!("[{}] Mains frequency not measured yet", name),
    }

    let noise = now.noise_edges.wrapping_sub(previous.noise_edges);
    let skipped = now.skipped_cycles.wrapping_sub(previous.skipped_cycles);
    let dropouts = now.mains_dropouts.wrapping_sub(previous.mains_dropouts);
    let pin_faults = now.pin_faults.wrapping_sub(previous.pin_faults);

    if noise > 0 || skipped > 0 || dropouts > 0 || pin_faults > 0 {
        warn!(
            "[{}] noise={} skipped={} dropouts={} pin_faults={}",
            name, noise, skipped, dropouts, pin_faults
        );
    }
}
