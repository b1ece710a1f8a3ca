//! Heartbeat LEDs
//!
//! Software PWM with every LED switched on at the start of the cycle and
//! off in order of pulse width. The sharpened sine gives a short bright
//! beat followed by a long rest.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use systole_core::schedule::Engine;
use systole_firmware::board::{pin_fault, Board};
use systole_firmware::programs::heartbeat_leds::{output_pins, PROGRAM, PWM_DIVIDER};
use systole_firmware::report::FaultReporter;
use {defmt_rtt as _, panic_probe as _};

#[entry]
fn main() -> ! {
    info!("Systole heartbeat-leds starting...");

    let mut board = Board::init(PROGRAM.timing.period, PWM_DIVIDER).unwrap_or_else(|e| pin_fault(e));
    let leds = output_pins(&mut board.bank).unwrap_or_else(|e| pin_fault(e));
    info!(
        "{} LEDs, {} cycles per beat",
        leds.len(),
        PROGRAM.timing.period_in_cycles
    );

    let mut reporter = FaultReporter::new(board.fault_led, PROGRAM.timing.period);
    let engine = Engine::new(board.counter, leds, &PROGRAM);
    engine.run(|fault, monitor| reporter.report(fault, monitor))
}
