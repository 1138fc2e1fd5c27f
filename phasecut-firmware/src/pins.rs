//! Dynamic pin allocation for config-driven hardware setup
//!
//! Provides a way to get GPIO pins by number at runtime, so pin
//! assignments come from dimmer.toml rather than being hardcoded.

use embassy_rp::gpio::{AnyPin, Level};
use embassy_rp::{Peri, Peripherals};

use phasecut_core::config::PinConfig;

/// Number of user GPIOs on the RP2040
const GPIO_COUNT: usize = 30;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin already taken
    AlreadyTaken(u8),
}

/// Pin bank that holds all GPIO pins and allows taking them by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Move every GPIO out of the peripherals
    pub fn new(p: Peripherals) -> Self {
        Self {
            pins: [
                Some(Peri::<AnyPin>::from(p.PIN_0)),
                Some(Peri::<AnyPin>::from(p.PIN_1)),
                Some(Peri::<AnyPin>::from(p.PIN_2)),
                Some(Peri::<AnyPin>::from(p.PIN_3)),
                Some(Peri::<AnyPin>::from(p.PIN_4)),
                Some(Peri::<AnyPin>::from(p.PIN_5)),
                Some(Peri::<AnyPin>::from(p.PIN_6)),
                Some(Peri::<AnyPin>::from(p.PIN_7)),
                Some(Peri::<AnyPin>::from(p.PIN_8)),
                Some(Peri::<AnyPin>::from(p.PIN_9)),
                Some(Peri::<AnyPin>::from(p.PIN_10)),
                Some(Peri::<AnyPin>::from(p.PIN_11)),
                Some(Peri::<AnyPin>::from(p.PIN_12)),
                Some(Peri::<AnyPin>::from(p.PIN_13)),
                Some(Peri::<AnyPin>::from(p.PIN_14)),
                Some(Peri::<AnyPin>::from(p.PIN_15)),
                Some(Peri::<AnyPin>::from(p.PIN_16)),
                Some(Peri::<AnyPin>::from(p.PIN_17)),
                Some(Peri::<AnyPin>::from(p.PIN_18)),
                Some(Peri::<AnyPin>::from(p.PIN_19)),
                Some(Peri::<AnyPin>::from(p.PIN_20)),
                Some(Peri::<AnyPin>::from(p.PIN_21)),
                Some(Peri::<AnyPin>::from(p.PIN_22)),
                Some(Peri::<AnyPin>::from(p.PIN_23)),
                Some(Peri::<AnyPin>::from(p.PIN_24)),
                Some(Peri::<AnyPin>::from(p.PIN_25)),
                Some(Peri::<AnyPin>::from(p.PIN_26)),
                Some(Peri::<AnyPin>::from(p.PIN_27)),
                Some(Peri::<AnyPin>::from(p.PIN_28)),
                Some(Peri::<AnyPin>::from(p.PIN_29)),
            ],
        }
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        self.pins
            .get_mut(pin_num as usize)
            .ok_or(PinError::InvalidPin(pin_num))?
            .take()
            .ok_or(PinError::AlreadyTaken(pin_num))
    }
}

/// Pin level that switches an output off
pub fn off_level(pin: &PinConfig) -> Level {
    if pin.inverted {
        Level::High
    } else {
        Level::Low
    }
}

/// Pin level that switches an output on
pub fn on_level(pin: &PinConfig) -> Level {
    if pin.inverted {
        Level::Low
    } else {
        Level::High
    }
}
