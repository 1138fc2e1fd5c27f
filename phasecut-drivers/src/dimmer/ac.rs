//! AC phase-control dimmer
//!
//! This driver provides:
//! - Zero-cross handling with debounce, period tracking and resync
//! - Leading-edge pulse, leading-edge hold and trailing-edge gate sequencing
//! - Diac-drain management around every gate pulse
//! - Mains dropout supervision with a forced safe state
//!
//! # Usage
//!
//! The platform calls three entry points, all serialized with each other:
//!
//! ```ignore
//! let mut dimmer = AcDimmer::new(&config, &SETPOINT, gate, drain, scheduler);
//! dimmer.setup()?;
//!
//! // Zero-cross edge interrupt:
//! dimmer.on_zero_cross(now_us);
//! // Gate scheduler expiry:
//! dimmer.on_timer(now_us);
//! // Periodically from the supervisor:
//! dimmer.poll(now_us);
//! ```
//!
//! `set_power` only touches the shared setpoint and may be called from
//! anywhere at any time.
//!
//! # Sequencing
//!
//! Each half-cycle starts at a zero-cross (or, with single-edge interrupts,
//! at a synthesised boundary one half-cycle after the real edge). The power
//! setpoint is latched there and turned into a [`GatePlan`]. Gate edges are
//! then driven from one-shot timer callbacks. The release timer is always
//! armed before the gate is asserted, so a refused timer can never leave the
//! gate on.

use embedded_hal::digital::OutputPin;
use phasecut_core::config::{DimMethod, DimmerConfig};
use phasecut_core::mains::{Crossing, MainsTracker};
use phasecut_core::power::{PowerLimits, PowerSetpoint};
use phasecut_core::safety::{DimmerHealth, HealthSnapshot, HealthStatus};
use phasecut_core::state::{CycleEvent, CyclePhase};
use phasecut_core::timing::{plan_half_cycle, GatePlan};
use phasecut_core::traits::{Dimmer, DimmerError, GateScheduler};

use super::gate::GateOutput;

/// What the pending timer callback does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerAction {
    /// Assert the gate
    Fire,
    /// Release the gate and re-assert the drain
    Release,
    /// Start the synthesised second half-cycle
    HalfCycle,
}

/// AC dimmer controller
///
/// Generic over the gate pin, drain pin and gate scheduler so the whole
/// sequencer runs on the host against mocks.
pub struct AcDimmer<'a, G, D, S> {
    method: DimMethod,
    limits: PowerLimits,
    /// Power command shared with the control loop
    setpoint: &'a PowerSetpoint,
    gate: GateOutput<G>,
    drain: GateOutput<D>,
    scheduler: S,
    tracker: MainsTracker,
    /// Template the tracker is reset to on setup
    fresh_tracker: MainsTracker,
    phase: CyclePhase,
    enabled: bool,
    /// Start of the current half-cycle
    cross_us: u32,
    /// Half-cycle length latched at `cross_us`
    half_cycle_us: u32,
    /// Gate plan latched at `cross_us`
    plan: Option<GatePlan>,
    /// Callback the scheduler is armed for
    pending: Option<TimerAction>,
    /// Single-edge mode: the second half-cycle still has to be synthesised
    virtual_cross_due: bool,
    health: DimmerHealth,
}

impl<'a, G, D, S> AcDimmer<'a, G, D, S>
where
    G: OutputPin,
    D: OutputPin,
    S: GateScheduler,
{
    /// Create a dimmer; outputs are not touched until `setup`
    pub fn new(
        config: &DimmerConfig,
        setpoint: &'a PowerSetpoint,
        gate: G,
        drain: D,
        scheduler: S,
    ) -> Self {
        let tracker = MainsTracker::from_config(config);
        Self {
            method: config.method,
            limits: PowerLimits::from_config(config),
            setpoint,
            gate: GateOutput::new(gate, config.gate_pin.inverted),
            drain: GateOutput::new(drain, config.diac_drain_pin.inverted),
            scheduler,
            fresh_tracker: tracker.clone(),
            tracker,
            phase: CyclePhase::AwaitingCross,
            enabled: false,
            cross_us: 0,
            half_cycle_us: 0,
            plan: None,
            pending: None,
            virtual_cross_due: false,
            health: DimmerHealth::new(),
        }
    }

    /// Current cycle phase
    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Health counters
    pub fn health(&self) -> HealthSnapshot {
        self.health.snapshot()
    }

    /// Most severe active health condition
    pub fn check(&self) -> HealthStatus {
        self.health.check()
    }

    /// Measured mains frequency in 0.1 Hz units, once measured
    pub fn mains_frequency_hz_x10(&self) -> Option<u16> {
        if self.tracker.is_measured() {
            Some(self.tracker.frequency_hz_x10())
        } else {
            None
        }
    }

    /// Half-cycle estimate (us)
    pub fn half_cycle_us(&self) -> u32 {
        self.tracker.half_cycle_us()
    }

    /// Check if the gate is currently asserted
    pub fn gate_on(&self) -> bool {
        self.gate.is_on()
    }

    /// Tear down and hand back the hardware
    pub fn release(mut self) -> (G, D, S) {
        self.teardown();
        (
            self.gate.into_inner(),
            self.drain.into_inner(),
            self.scheduler,
        )
    }

    /// Zero-cross edge handler
    ///
    /// Runs in interrupt context: bounded time, no allocation, never blocks.
    pub fn on_zero_cross(&mut self, now_us: u32) {
        if !self.enabled {
            return;
        }

        match self.tracker.on_edge(now_us) {
            Crossing::Noise => {
                self.health.record_noise();
            }
            Crossing::Sync => {
                self.health.record_edge();
                self.end_half_cycle();
                self.cross_us = now_us;
                self.plan = None;
                self.phase = self.phase.transition(CycleEvent::Synced);
            }
            Crossing::HalfCycle { half_cycle_us } => {
                self.health.record_edge();
                let synthesise = !self.tracker.is_dual_edge();
                self.begin_half_cycle(now_us, now_us, half_cycle_us, synthesise);
            }
        }
    }

    /// Gate scheduler expiry handler
    pub fn on_timer(&mut self, now_us: u32) {
        if !self.enabled {
            return;
        }

        let Some(action) = self.pending.take() else {
            // Expiry raced with a cancel
            return;
        };
        let elapsed_us = now_us.wrapping_sub(self.cross_us);

        match action {
            TimerAction::Fire => {
                let Some(plan) = self.plan else {
                    return;
                };
                let release_in_us = plan.release_at_us.saturating_sub(elapsed_us);
                self.fire(release_in_us);
            }
            TimerAction::Release => {
                self.release_gate();
                self.phase = self.phase.transition(CycleEvent::GateReleased);
                self.arm_virtual_cross(elapsed_us);
            }
            TimerAction::HalfCycle => {
                self.virtual_cross_due = false;
                let cross_us = self.cross_us.wrapping_add(self.half_cycle_us);
                self.begin_half_cycle(cross_us, now_us, self.half_cycle_us, false);
            }
        }
    }

    /// Mains dropout supervision
    ///
    /// With no accepted edge for longer than the dropout window, the pending
    /// timer is cancelled, the outputs are forced safe and the controller
    /// waits for a fresh reference edge. Returns true when a dropout was
    /// detected by this call.
    pub fn poll(&mut self, now_us: u32) -> bool {
        if !self.enabled || !self.tracker.is_lost(now_us) {
            return false;
        }

        self.tracker.mark_lost();
        self.cancel_pending();
        self.force_safe();
        self.plan = None;
        self.phase = self.phase.transition(CycleEvent::MainsLost);
        self.health.record_dropout();
        true
    }

    /// Start a half-cycle at `cross_us` and arm its first callback
    ///
    /// `now_us` may trail `cross_us` when the boundary is a late timer
    /// callback; every offset is shortened by that latency.
    fn begin_half_cycle(
        &mut self,
        cross_us: u32,
        now_us: u32,
        half_cycle_us: u32,
        synthesise: bool,
    ) {
        self.end_half_cycle();

        self.cross_us = cross_us;
        self.half_cycle_us = half_cycle_us;
        self.virtual_cross_due = synthesise;
        let elapsed_us = now_us.wrapping_sub(cross_us);

        let power = self.limits.effective(self.setpoint.get());
        self.plan = plan_half_cycle(power, self.method, half_cycle_us);

        match self.plan {
            None => {
                self.phase = self.phase.transition(CycleEvent::CrossSkipped);
                self.arm_virtual_cross(elapsed_us);
            }
            Some(plan) if plan.fire_at_us <= elapsed_us => {
                self.phase = self.phase.transition(CycleEvent::PulseArmed);
                self.fire(plan.release_at_us.saturating_sub(elapsed_us));
            }
            Some(plan) => match self.scheduler.schedule(plan.fire_at_us - elapsed_us) {
                Ok(()) => {
                    self.health.record_scheduled();
                    self.pending = Some(TimerAction::Fire);
                    self.phase = self.phase.transition(CycleEvent::PulseArmed);
                }
                Err(_) => self.skip_cycle(),
            },
        }
    }

    /// Arm the release, then assert the gate
    fn fire(&mut self, release_in_us: u32) {
        self.phase = self.phase.transition(CycleEvent::GateFired);
        if !self.phase.gate_allowed() {
            return;
        }

        if self.scheduler.schedule(release_in_us).is_err() {
            self.skip_cycle();
            return;
        }
        self.health.record_scheduled();
        self.pending = Some(TimerAction::Release);

        // Drain comes off immediately before the trigger
        let asserted = self.drain.set_on(false).is_ok() && self.gate.set_on(true).is_ok();
        if !asserted {
            self.pin_fault();
        }
    }

    /// Release the gate and re-assert the drain
    fn release_gate(&mut self) {
        let released = self.gate.set_on(false).is_ok() && self.drain.set_on(true).is_ok();
        if !released {
            self.pin_fault();
        }
    }

    /// Arm the synthesised half-cycle boundary if one is still due
    fn arm_virtual_cross(&mut self, elapsed_us: u32) {
        if !self.virtual_cross_due {
            return;
        }
        let delay_us = self.half_cycle_us.saturating_sub(elapsed_us);
        match self.scheduler.schedule(delay_us) {
            Ok(()) => self.pending = Some(TimerAction::HalfCycle),
            Err(_) => {
                // Next real edge restarts the sequence
                self.virtual_cross_due = false;
                self.health.record_skip();
            }
        }
    }

    /// Abandon the current half-cycle
    fn skip_cycle(&mut self) {
        self.pending = None;
        self.virtual_cross_due = false;
        self.health.record_skip();
        self.force_safe();
        self.phase = self.phase.transition(CycleEvent::ScheduleFailed);
    }

    /// End whatever the previous half-cycle left running
    fn end_half_cycle(&mut self) {
        self.cancel_pending();
        self.virtual_cross_due = false;
        if self.gate.is_on() || !self.drain.is_on() {
            self.force_safe();
        }
    }

    fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            self.scheduler.cancel();
        }
    }

    fn pin_fault(&mut self) {
        self.cancel_pending();
        self.virtual_cross_due = false;
        self.health.record_pin_fault();
        self.force_safe();
        self.phase = self.phase.transition(CycleEvent::PinFault);
    }

    /// Gate off, drain on; failures are counted, never propagated
    fn force_safe(&mut self) {
        let gate_ok = self.gate.set_on(false).is_ok();
        let drain_ok = self.drain.set_on(true).is_ok();
        if !(gate_ok && drain_ok) {
            self.health.record_pin_fault();
        }
    }
}

impl<G, D, S> Dimmer for AcDimmer<'_, G, D, S>
where
    G: OutputPin,
    D: OutputPin,
    S: GateScheduler,
{
    fn setup(&mut self) -> Result<(), DimmerError> {
        self.scheduler.cancel();
        self.pending = None;
        self.gate.set_on(false).map_err(|_| DimmerError::GatePin)?;
        self.drain.set_on(true).map_err(|_| DimmerError::DrainPin)?;

        self.tracker = self.fresh_tracker.clone();
        self.plan = None;
        self.virtual_cross_due = false;
        self.phase = CyclePhase::AwaitingCross;
        self.health.clear_latched();
        self.enabled = true;
        Ok(())
    }

    fn teardown(&mut self) {
        self.enabled = false;
        self.pending = None;
        self.scheduler.cancel();
        self.force_safe();
        self.plan = None;
        self.virtual_cross_due = false;
        self.phase = self.phase.transition(CycleEvent::Halted);
    }

    fn set_power(&self, power: f32) {
        self.setpoint.set(power);
    }

    fn power(&self) -> f32 {
        self.setpoint.get()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
