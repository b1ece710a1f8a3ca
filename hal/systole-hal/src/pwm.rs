//! Hardware PWM abstractions

/// Hardware PWM compare register
///
/// The duty value is in counter ticks: the output is active while the PWM
/// counter is below it. Used by programs that let a hardware comparator
/// generate the pulse instead of toggling pins in software.
pub trait DutyRegister {
    /// Load a new compare value
    fn set_duty(&mut self, duty: u16);
}

impl<D: DutyRegister + ?Sized> DutyRegister for &mut D {
    fn set_duty(&mut self, duty: u16) {
        (**self).set_duty(duty);
    }
}
