//! Hardware PWM servo output
//!
//! The slice's own counter sets the servo frame; channel A goes high at
//! the start of each frame and low when the counter reaches the compare
//! value.

use embassy_rp::pwm::{ChannelAPin, Config, Pwm, Slice};
use embassy_rp::Peri;
use systole_hal::{DutyRegister, Tick};

use crate::pwm_config;

/// Servo on channel A of a PWM slice
pub struct ServoPwm {
    pwm: Pwm<'static>,
    config: Config,
}

impl ServoPwm {
    /// Configure `slice` with `period` and start it at `duty`
    pub fn new<T: Slice>(
        slice: Peri<'static, T>,
        pin: Peri<'static, impl ChannelAPin<T>>,
        period: Tick,
        divider: u8,
        duty: u16,
    ) -> Self {
        let mut config = pwm_config(period, divider);
        config.compare_a = duty;
        let pwm = Pwm::new_output_a(slice, pin, config.clone());
        Self { pwm, config }
    }
}

impl DutyRegister for ServoPwm {
    fn set_duty(&mut self, duty: u16) {
        self.config.compare_a = duty;
        self.pwm.set_config(&self.config);
    }
}
