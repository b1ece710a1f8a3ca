//! Interrupt-extended slow counter
//!
//! Motions that outlast the hardware counter's range are timed by a counter
//! that an interrupt bumps once per overflow. The interrupt is the only
//! writer; the main loop only reads and measures elapsed time against a
//! baseline it keeps itself, so it never has to reset the shared cell.

use core::sync::atomic::{AtomicU32, Ordering};

use systole_hal::ExtendedCounter;

/// Single-writer, single-reader overflow counter
///
/// `increment` is a plain load followed by a store. With one writer no
/// update can be lost, and the target needs no read-modify-write atomics.
/// A concurrent `read` may observe the value from before the latest
/// increment; callers accept that one-tick staleness.
#[derive(Debug, Default)]
pub struct OverflowCounter {
    ticks: AtomicU32,
}

impl OverflowCounter {
    /// Create a counter starting at zero
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
        }
    }

    /// Advance by one tick
    ///
    /// Must only be called from the single writer (the overflow interrupt).
    pub fn increment(&self) {
        let next = self.ticks.load(Ordering::Relaxed).wrapping_add(1);
        self.ticks.store(next, Ordering::Release);
    }

    /// Current tick count
    pub fn read(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Ticks elapsed since `baseline`, tolerant of the counter wrapping
    pub fn since(&self, baseline: u32) -> u32 {
        self.read().wrapping_sub(baseline)
    }
}

impl ExtendedCounter for OverflowCounter {
    fn count(&self) -> u32 {
        self.read()
    }
}
