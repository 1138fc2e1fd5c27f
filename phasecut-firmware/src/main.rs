//! Phasecut - AC Phase-Control Dimmer Firmware
//!
//! Main firmware binary for RP2040-based dimmer boards.
//! Drives a triac gate from a zero-cross detector with leading-edge pulse,
//! leading-edge hold or trailing-edge timing, configured from dimmer.toml.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Output, Pull};
use {defmt_rtt as _, panic_probe as _};

use phasecut_core::config::{parse_config, DimmerConfig};
use phasecut_core::traits::Dimmer;
use phasecut_drivers::dimmer::AcDimmer;

use crate::channels::SETPOINT;
use crate::pins::{off_level, on_level, PinBank};
use crate::scheduler::SignalScheduler;

mod channels;
mod dimmer;
mod pins;
mod scheduler;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit dimmer.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../dimmer.toml");

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Phasecut firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    info!(
        "Dimmer '{}': method={}, edge={}, power {}..{}, zero_means_zero={}",
        config.name.as_str(),
        config.method,
        config.interrupt_edge,
        config.min_power,
        config.max_power,
        config.zero_means_zero
    );

    // Claim pins from config; outputs start in the safe state
    let mut bank = PinBank::new(p);
    let gate_pin = match bank.take(config.gate_pin.pin) {
        Ok(pin) => pin,
        Err(e) => halt("gate pin unavailable", e),
    };
    let drain_pin = match bank.take(config.diac_drain_pin.pin) {
        Ok(pin) => pin,
        Err(e) => halt("diac drain pin unavailable", e),
    };
    let zero_cross_pin = match bank.take(config.zero_cross_pin.pin) {
        Ok(pin) => pin,
        Err(e) => halt("zero-cross pin unavailable", e),
    };

    let gate = Output::new(gate_pin, off_level(&config.gate_pin));
    let drain = Output::new(drain_pin, on_level(&config.diac_drain_pin));
    let pull = if config.zero_cross_pin.pull_up {
        Pull::Up
    } else {
        Pull::None
    };
    let zero_cross = Input::new(zero_cross_pin, pull);

    info!(
        "Pins: gate=GPIO{}, drain=GPIO{}, zero-cross=GPIO{}",
        config.gate_pin.pin, config.diac_drain_pin.pin, config.zero_cross_pin.pin
    );

    let mut ac_dimmer = AcDimmer::new(&config, &SETPOINT, gate, drain, SignalScheduler);
    ac_dimmer.set_power(config.initial_power);
    if let Err(e) = ac_dimmer.setup() {
        halt("dimmer setup failed", e);
    }
    dimmer::install(ac_dimmer);
    info!("Dimmer ready, waiting for mains");

    // Spawn tasks
    spawner.spawn(tasks::gate_timer_task()).unwrap();
    spawner
        .spawn(tasks::zero_cross_task(zero_cross, config.interrupt_edge))
        .unwrap();
    spawner
        .spawn(tasks::supervisor_task(config.name.clone()))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse and validate the embedded configuration
///
/// build.rs already rejects malformed files, so a failure here means the
/// build-time and run-time checks disagree. Either way it is fatal.
fn load_config() -> DimmerConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => halt("failed to parse dimmer.toml", e),
    };

    if let Err(e) = config.validate() {
        halt("invalid dimmer configuration", e);
    }

    config
}

/// Report a fatal setup error and stop before the run loop
fn halt<E: Format>(what: &str, err: E) -> ! {
    error!("Fatal: {}: {}", what, err);
    loop {
        cortex_m::asm::wfe();
    }
}
