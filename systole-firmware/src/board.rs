//! Board bring-up shared by the software-PWM binaries

use defmt::*;
use embassy_rp::gpio::Output;
use systole_hal_rp2040::{Eh, PinBank, PinError, PwmCounter, Tick};

use crate::programs::FAULT_LED;

/// Output pin type handed to the engine
pub type LedPin = Eh<Output<'static>>;

/// Peripherals a software-PWM program runs on
pub struct Board {
    pub bank: PinBank,
    pub counter: PwmCounter,
    pub fault_led: Option<LedPin>,
}

impl Board {
    /// Initialize the chip and start the free-running counter
    ///
    /// The counter counts `0..period` at `SYS_CLOCK_HZ / divider`.
    pub fn init(period: Tick, divider: u8) -> Result<Self, PinError> {
        let p = embassy_rp::init(Default::default());
        let (mut bank, rest) = PinBank::from_peripherals(p);
        info!("Peripherals initialized");

        let counter = PwmCounter::new(rest.pwm_slice7, period, divider);
        info!("Counter running: period {} ticks, divider {}", period, divider);

        let fault_led = match FAULT_LED {
            Some(pin) => Some(bank.take_output(pin)?),
            None => None,
        };

        Ok(Self {
            bank,
            counter,
            fault_led,
        })
    }
}

/// Stop on a startup pin error
pub fn pin_fault(err: PinError) -> ! {
    defmt::panic!("pin setup failed: {}", err)
}
