//! Dimmer health monitor
//!
//! Counts the runtime faults that are absorbed in interrupt context
//! (noise edges, skipped cycles, dropouts, pin errors) and reports the
//! most severe active condition.

/// Consecutive skipped cycles before the scheduler is considered exhausted
pub const MAX_CONSECUTIVE_SKIPS: u16 = 10;

/// Consecutive noise edges before the zero-cross input is considered noisy
pub const MAX_NOISE_STREAK: u16 = 8;

/// Fault conditions reported by the health monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Zero-cross edges stopped arriving
    MainsLost,
    /// Writing the gate or drain pin failed
    PinFault,
    /// Scheduler refused every recent request
    SchedulerExhausted,
    /// Zero-cross input is producing bursts of spurious edges
    NoisyZeroCross,
}

/// Health condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HealthStatus {
    /// All conditions normal
    Ok,
    /// Fault condition active
    Fault(FaultKind),
}

/// Point-in-time copy of the health counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HealthSnapshot {
    /// Accepted zero-cross edges
    pub edges: u32,
    /// Edges dropped by the debounce check
    pub noise_edges: u32,
    /// Half-cycles skipped because the scheduler refused a request
    pub skipped_cycles: u32,
    /// Mains dropouts detected
    pub mains_dropouts: u32,
    /// Gate or drain pin write failures
    pub pin_faults: u32,
    /// An edge has been accepted since boot or the last dropout
    pub mains_present: bool,
}

/// Runtime health tracking for one dimmer
#[derive(Debug, Clone, Default)]
pub struct DimmerHealth {
    counters: HealthSnapshot,
    /// Dropout recorded and no edge accepted since
    mains_lost: bool,
    /// Pin write failed since the last successful setup
    pin_fault: bool,
    /// Skips since the last successful schedule
    skip_streak: u16,
    /// Noise edges since the last accepted edge
    noise_streak: u16,
}

impl DimmerHealth {
    /// Create a new health monitor
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted zero-cross edge
    pub fn record_edge(&mut self) {
        self.counters.edges = self.counters.edges.wrapping_add(1);
        self.counters.mains_present = true;
        self.mains_lost = false;
        self.noise_streak = 0;
    }

    /// Record an edge dropped by the debounce check
    pub fn record_noise(&mut self) {
        self.counters.noise_edges = self.counters.noise_edges.wrapping_add(1);
        self.noise_streak = self.noise_streak.saturating_add(1);
    }

    /// Record a half-cycle skipped on scheduler failure
    pub fn record_skip(&mut self) {
        self.counters.skipped_cycles = self.counters.skipped_cycles.wrapping_add(1);
        self.skip_streak = self.skip_streak.saturating_add(1);
    }

    /// Record a successfully armed timer
    pub fn record_scheduled(&mut self) {
        self.skip_streak = 0;
    }

    /// Record a mains dropout
    pub fn record_dropout(&mut self) {
        self.counters.mains_dropouts = self.counters.mains_dropouts.wrapping_add(1);
        self.counters.mains_present = false;
        self.mains_lost = true;
    }

    /// Record a gate or drain pin write failure
    pub fn record_pin_fault(&mut self) {
        self.counters.pin_faults = self.counters.pin_faults.wrapping_add(1);
        self.pin_fault = true;
    }

    /// Clear latched conditions after a successful setup
    pub fn clear_latched(&mut self) {
        self.pin_fault = false;
        self.skip_streak = 0;
        self.noise_streak = 0;
    }

    /// Check all health conditions
    ///
    /// Returns the most severe fault, or Ok if all conditions are normal.
    pub fn check(&self) -> HealthStatus {
        if self.pin_fault {
            return HealthStatus::Fault(FaultKind::PinFault);
        }

        if self.mains_lost {
            return HealthStatus::Fault(FaultKind::MainsLost);
        }

        if self.skip_streak >= MAX_CONSECUTIVE_SKIPS {
            return HealthStatus::Fault(FaultKind::SchedulerExhausted);
        }

        if self.noise_streak >= MAX_NOISE_STREAK {
            return HealthStatus::Fault(FaultKind::NoisyZeroCross);
        }

        HealthStatus::Ok
    }

    /// Copy of the counters
    pub fn snapshot(&self) -> HealthSnapshot {
        self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_operation() {
        let mut health = DimmerHealth::new();
        health.record_edge();
        health.record_noise();
        assert_eq!(health.check(), HealthStatus::Ok);

        let snap = health.snapshot();
        assert_eq!(snap.edges, 1);
        assert_eq!(snap.noise_edges, 1);
        assert!(snap.mains_present);
    }

    #[test]
    fn test_no_fault_before_first_edge() {
        let health = DimmerHealth::new();
        assert_eq!(health.check(), HealthStatus::Ok);
        assert!(!health.snapshot().mains_present);
    }

    #[test]
    fn test_dropout_and_recovery() {
        let mut health = DimmerHealth::new();
        health.record_edge();
        health.record_dropout();
        assert_eq!(health.check(), HealthStatus::Fault(FaultKind::MainsLost));
        assert!(!health.snapshot().mains_present);

        health.record_edge();
        assert_eq!(health.check(), HealthStatus::Ok);
        assert_eq!(health.snapshot().mains_dropouts, 1);
    }

    #[test]
    fn test_pin_fault_latched_until_cleared() {
        let mut health = DimmerHealth::new();
        health.record_pin_fault();
        health.record_edge();
        assert_eq!(health.check(), HealthStatus::Fault(FaultKind::PinFault));

        health.clear_latched();
        assert_eq!(health.check(), HealthStatus::Ok);
        assert_eq!(health.snapshot().pin_faults, 1);
    }

    #[test]
    fn test_scheduler_exhausted() {
        let mut health = DimmerHealth::new();
        for _ in 0..MAX_CONSECUTIVE_SKIPS {
            health.record_skip();
        }
        assert_eq!(
            health.check(),
            HealthStatus::Fault(FaultKind::SchedulerExhausted)
        );

        health.record_scheduled();
        assert_eq!(health.check(), HealthStatus::Ok);
        assert_eq!(health.snapshot().skipped_cycles, MAX_CONSECUTIVE_SKIPS as u32);
    }

    #[test]
    fn test_noise_streak_resets_on_edge() {
        let mut health = DimmerHealth::new();
        for _ in 0..MAX_NOISE_STREAK {
            health.record_noise();
        }
        assert_eq!(health.check(), HealthStatus::Fault(FaultKind::NoisyZeroCross));

        health.record_edge();
        assert_eq!(health.check(), HealthStatus::Ok);
    }

    #[test]
    fn test_pin_fault_outranks_mains_lost() {
        let mut health = DimmerHealth::new();
        health.record_dropout();
        health.record_pin_fault();
        assert_eq!(health.check(), HealthStatus::Fault(FaultKind::PinFault));
    }
}
