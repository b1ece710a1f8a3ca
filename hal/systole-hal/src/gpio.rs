//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins that can be implemented
//! by chip-specific HALs.

use core::convert::Infallible;

use embedded_hal::digital;

/// Digital output pin
///
/// The engine only ever writes; it never reads an output back.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);
}

/// Digital input pin
///
/// Reads take `&mut self` to match `embedded-hal` 1.0.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&mut self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }
}

impl<P: OutputPin + ?Sized> OutputPin for &mut P {
    fn set_high(&mut self) {
        (**self).set_high();
    }

    fn set_low(&mut self) {
        (**self).set_low();
    }
}

/// Adapter for `embedded-hal` pins whose operations cannot fail
///
/// Chip HALs hand out `embedded_hal::digital` pins with `Infallible`
/// errors; wrapping one in `Eh` makes it usable by the engine.
#[derive(Debug)]
pub struct Eh<T>(pub T);

impl<T> OutputPin for Eh<T>
where
    T: digital::OutputPin + digital::ErrorType<Error = Infallible>,
{
    fn set_high(&mut self) {
        match self.0.set_high() {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    fn set_low(&mut self) {
        match self.0.set_low() {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }
}

impl<T> InputPin for Eh<T>
where
    T: digital::InputPin + digital::ErrorType<Error = Infallible>,
{
    fn is_high(&mut self) -> bool {
        match self.0.is_high() {
            Ok(high) => high,
            Err(never) => match never {},
        }
    }
}
