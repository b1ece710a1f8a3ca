//! Timing fault reporting
//!
//! Runs inside the engine's computation margin, so it never blocks: the
//! first overrun is logged in full and latches the fault LED, later ones
//! are only summarized now and then along with the recent history.

use defmt::*;
use systole_core::clock::Overrun;
use systole_core::fault::{FaultMonitor, FaultStatus, TimingFault};
use systole_hal::{OutputPin, Tick};

/// Faults between summary warnings
pub const WARN_EVERY: u32 = 64;

/// Logs overruns and drives the fault LED
pub struct FaultReporter<L> {
    led: Option<L>,
    /// Counter period, for measuring lateness across a wrap
    period: Tick,
}

impl<L: OutputPin> FaultReporter<L> {
    pub fn new(led: Option<L>, period: Tick) -> Self {
        Self { led, period }
    }

    /// Report one faulted cycle
    pub fn report(&mut self, fault: &TimingFault, monitor: &FaultMonitor) {
        let count = monitor.fault_count();
        if count == 1 {
            let lateness = fault.overrun.lateness(self.period);
            match fault.overrun {
                Overrun::Late { deadline, .. } => error!(
                    "Overrun: channel {} {} due at {} issued {} ticks late",
                    fault.channel, fault.edge, deadline, lateness
                ),
                Overrun::Wrapped { deadline, .. } => error!(
                    "Overrun: channel {} {} due at {} slipped {} ticks into the next cycle",
                    fault.channel, fault.edge, deadline, lateness
                ),
            }
            if let Some(led) = self.led.as_mut() {
                led.set_high();
            }
        } else if count % WARN_EVERY == 0 {
            if let FaultStatus::Overrun(first) = monitor.check() {
                warn!(
                    "{} overruns in {} cycles ({} late, {} wrapped), first on channel {} {}",
                    count,
                    monitor.cycles(),
                    monitor.late_count(),
                    monitor.wrapped_count(),
                    first.channel,
                    first.edge
                );
            }
            for recent in monitor.history() {
                debug!(
                    "  channel {} {}: {} ticks late",
                    recent.channel,
                    recent.edge,
                    recent.overrun.lateness(self.period)
                );
            }
        }
    }
}
