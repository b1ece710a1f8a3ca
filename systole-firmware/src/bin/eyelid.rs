//! Bistable eyelid
//!
//! One servo on hardware PWM and an active-low button, both placed by the
//! `[eyelid]` table. Each press eases the lid to the other rest position.
//!
//! The main loop busy-waits in thread mode. Motion progress is measured on
//! a slow counter incremented by a ticker task on a high-priority interrupt
//! executor, the only asynchronous writer in the program.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::InterruptExecutor;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_time::{Duration, Ticker};
use systole_core::clock::OverflowCounter;
use systole_core::eyelid::EyelidDriver;
use systole_firmware::board::pin_fault;
use systole_firmware::programs::eyelid::{split, BUTTON, CONFIG, SERVO, TIMING};
use {defmt_rtt as _, panic_probe as _};

/// Slow counter the motion is timed against
static ELAPSED: OverflowCounter = OverflowCounter::new();

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Overflow task - advances the slow counter at `overflow_hz`
#[embassy_executor::task]
async fn overflow_task() {
    let mut ticker = Ticker::every(Duration::from_hz(CONFIG.overflow_hz as u64));

    loop {
        ticker.next().await;
        ELAPSED.increment();
    }
}

#[entry]
fn main() -> ! {
    info!("Systole eyelid starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    spawner.spawn(overflow_task()).unwrap();
    info!("Overflow counter running at {} Hz", CONFIG.overflow_hz);

    let (servo, mut bank) = split(p);
    let button = bank
        .take_input_pull_up(BUTTON)
        .unwrap_or_else(|e| pin_fault(e));
    info!(
        "Servo on GPIO{}: period {} ticks, duty {}-{}, {} ticks per motion",
        SERVO, TIMING.period, TIMING.min_ticks, TIMING.max_ticks, TIMING.time_to_open
    );
    info!("Button on GPIO{}", BUTTON);

    let driver = EyelidDriver::new(button, servo, &ELAPSED, &TIMING);
    driver.run(|state| info!("Lid {}", state))
}
