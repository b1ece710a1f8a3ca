//! PWM slice as a free-running counter
//!
//! A slice in free-running mode counts `0..=top` and wraps, with no pins
//! attached. Reading its counter register is side-effect free, which is
//! all the software-PWM engine needs.

use embassy_rp::pwm::{Pwm, Slice};
use embassy_rp::Peri;
use systole_hal::{FreeRunningCounter, Tick};

use crate::pwm_config;

/// Wrapping counter backed by an otherwise unused PWM slice
pub struct PwmCounter {
    pwm: Pwm<'static>,
    period: Tick,
}

impl PwmCounter {
    /// Start `slice` counting `0..period` at `SYS_CLOCK_HZ / divider`
    pub fn new<T: Slice>(slice: Peri<'static, T>, period: Tick, divider: u8) -> Self {
        let pwm = Pwm::new_free(slice, pwm_config(period, divider));
        Self { pwm, period }
    }
}

impl FreeRunningCounter for PwmCounter {
    fn now(&self) -> Tick {
        self.pwm.counter()
    }

    fn period(&self) -> Tick {
        self.period
    }
}
