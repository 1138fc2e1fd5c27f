//! Polarity-aware output pin
//!
//! Drives the triac gate or the diac drain through a GPIO pin, directly or
//! via an opto-coupler. The pin can be active-high (default) or active-low.

use embedded_hal::digital::OutputPin;

/// Logical on/off output on top of a GPIO pin
pub struct GateOutput<P> {
    pin: P,
    /// If true, output ON = pin LOW
    inverted: bool,
    /// Current logical state (true = on)
    on: bool,
}

impl<P: OutputPin> GateOutput<P> {
    /// Wrap a pin without touching it
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin to control
    /// - `inverted`: If true, the output is ON when the pin is LOW
    ///
    /// The pin level is undefined until the first `set_on`.
    pub fn new(pin: P, inverted: bool) -> Self {
        Self {
            pin,
            inverted,
            on: false,
        }
    }

    /// Create an active-high output
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Create an active-low output
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Switch the output on or off
    ///
    /// The pin is written every time, so a call also re-asserts a level
    /// that was disturbed externally.
    pub fn set_on(&mut self, on: bool) -> Result<(), P::Error> {
        if on != self.inverted {
            // Normal: on=true, inverted=false → high
            // Inverted: on=true, inverted=true → low
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.on = on;
        Ok(())
    }

    /// Check if the output was last switched on
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Release the underlying pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}
