//! Dimmer lifecycle trait

/// Errors that can occur during dimmer setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DimmerError {
    /// Gate pin could not be driven
    GatePin,
    /// Diac-drain pin could not be driven
    DrainPin,
}

/// Trait for phase-control dimmer outputs
pub trait Dimmer {
    /// Drive the outputs to the safe state and start accepting zero-crosses
    ///
    /// Pin failures here are fatal and must be reported before the run loop.
    fn setup(&mut self) -> Result<(), DimmerError>;

    /// Cancel any pending timer, force the gate off and assert the drain
    fn teardown(&mut self);

    /// Set the commanded power level
    ///
    /// Out-of-range values are clamped, never rejected. Takes effect at
    /// the next half-cycle boundary.
    fn set_power(&self, power: f32);

    /// Last commanded power level, clamped to [0, 1]
    fn power(&self) -> f32;

    /// Check if the dimmer is running
    fn is_enabled(&self) -> bool;
}
