//! Servo heartbeat
//!
//! Hobby servos on plain GPIOs. Each servo gets its own slot in the 20 ms
//! frame and its pulse is centered in that slot, so no two pulses overlap.
//! Pulse widths stay within 5-10% of the frame (1-2 ms).

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use systole_core::schedule::Engine;
use systole_firmware::board::{pin_fault, Board};
use systole_firmware::programs::servo_heartbeat::{output_pins, PROGRAM, PWM_DIVIDER};
use systole_firmware::report::FaultReporter;
use {defmt_rtt as _, panic_probe as _};

#[entry]
fn main() -> ! {
    info!("Systole servo-heartbeat starting...");

    let mut board = Board::init(PROGRAM.timing.period, PWM_DIVIDER).unwrap_or_else(|e| pin_fault(e));
    let servos = output_pins(&mut board.bank).unwrap_or_else(|e| pin_fault(e));
    info!(
        "{} servos, pulse {}-{} ticks, {} cycles per beat",
        servos.len(),
        PROGRAM.timing.min_ticks,
        PROGRAM.timing.max_ticks,
        PROGRAM.timing.period_in_cycles
    );

    let mut reporter = FaultReporter::new(board.fault_led, PROGRAM.timing.period);
    let engine = Engine::new(board.counter, servos, &PROGRAM);
    engine.run(|fault, monitor| reporter.report(fault, monitor))
}
