//! Pin allocation by number for config-driven hardware setup
//!
//! Pin numbers come from `systole.toml`; the build script turns them into
//! calls on a [`PinBank`], which hands each GPIO out at most once.

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::peripherals;
use embassy_rp::{Peri, Peripherals};
use systole_hal::Eh;

/// Number of user GPIOs on the RP2040
pub const GPIO_COUNT: usize = 30;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin already taken
    AlreadyTaken(u8),
}

/// Every GPIO, taken by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Bank an explicit set of pins, indexed by GPIO number
    ///
    /// `None` slots are pins already claimed elsewhere, such as a servo
    /// output that needs its typed peripheral.
    pub fn from_pins(pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT]) -> Self {
        Self { pins }
    }

    /// Split the peripherals into the GPIO bank and everything else
    pub fn from_peripherals(p: Peripherals) -> (Self, RemainingPeripherals) {
        let bank = Self::from_pins([
            Some(p.PIN_0.into()),
            Some(p.PIN_1.into()),
            Some(p.PIN_2.into()),
            Some(p.PIN_3.into()),
            Some(p.PIN_4.into()),
            Some(p.PIN_5.into()),
            Some(p.PIN_6.into()),
            Some(p.PIN_7.into()),
            Some(p.PIN_8.into()),
            Some(p.PIN_9.into()),
            Some(p.PIN_10.into()),
            Some(p.PIN_11.into()),
            Some(p.PIN_12.into()),
            Some(p.PIN_13.into()),
            Some(p.PIN_14.into()),
            Some(p.PIN_15.into()),
            Some(p.PIN_16.into()),
            Some(p.PIN_17.into()),
            Some(p.PIN_18.into()),
            Some(p.PIN_19.into()),
            Some(p.PIN_20.into()),
            Some(p.PIN_21.into()),
            Some(p.PIN_22.into()),
            Some(p.PIN_23.into()),
            Some(p.PIN_24.into()),
            Some(p.PIN_25.into()),
            Some(p.PIN_26.into()),
            Some(p.PIN_27.into()),
            Some(p.PIN_28.into()),
            Some(p.PIN_29.into()),
        ]);
        let remaining = RemainingPeripherals {
            pwm_slice7: p.PWM_SLICE7,
        };
        (bank, remaining)
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        self.pins
            .get_mut(pin_num as usize)
            .ok_or(PinError::InvalidPin(pin_num))?
            .take()
            .ok_or(PinError::AlreadyTaken(pin_num))
    }

    /// Take a pin as a push-pull output, initially low
    pub fn take_output(&mut self, pin_num: u8) -> Result<Eh<Output<'static>>, PinError> {
        let pin = self.take(pin_num)?;
        Ok(Eh(Output::new(pin, Level::Low)))
    }

    /// Take a pin as an input with its pull-up enabled
    pub fn take_input_pull_up(&mut self, pin_num: u8) -> Result<Eh<Input<'static>>, PinError> {
        let pin = self.take(pin_num)?;
        Ok(Eh(Input::new(pin, Pull::Up)))
    }
}

/// Non-GPIO peripherals that remain after creating the [`PinBank`]
pub struct RemainingPeripherals {
    /// Slice used as the engine's free-running counter; its pins (GPIO 14
    /// and 15) stay free for ordinary output
    pub pwm_slice7: Peri<'static, peripherals::PWM_SLICE7>,
}
