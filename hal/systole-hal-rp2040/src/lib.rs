//! RP2040-specific HAL for the actuator firmware
//!
//! This crate provides RP2040 implementations of the `systole-hal`
//! capability traits:
//!
//! - GPIO allocation by pin number for config-driven setup
//! - A PWM slice running free as the engine's wrapping counter
//! - A PWM slice driving a servo through its compare register

#![no_std]

pub mod counter;
pub mod pins;
pub mod servo;

pub use counter::PwmCounter;
pub use pins::{PinBank, PinError, RemainingPeripherals};
pub use servo::ServoPwm;

// Re-export shared traits from systole-hal for convenience
pub use systole_hal::{DutyRegister, Eh, FreeRunningCounter, Tick};

/// System clock feeding the PWM slices
pub const SYS_CLOCK_HZ: u32 = 125_000_000;

/// Build a PWM configuration that counts `0..period` at
/// `SYS_CLOCK_HZ / divider`
pub(crate) fn pwm_config(period: Tick, divider: u8) -> embassy_rp::pwm::Config {
    let mut config = embassy_rp::pwm::Config::default();
    config.top = period.saturating_sub(1);
    config.divider = fixed::FixedU16::<fixed::types::extra::U4>::from_num(divider.max(1));
    config
}
