//! Counter abstractions
//!
//! The engine keeps time by polling a free-running hardware counter that
//! wraps modulo a configured period. Programs whose motion outlasts the
//! counter's native range additionally read a slow counter extended by an
//! overflow interrupt.

/// One increment of the hardware free-running counter
pub type Tick = u16;

/// Free-running hardware counter wrapping modulo [`period`](Self::period)
///
/// Reads have no side effects. Successive reads cycle through
/// `0..period()`; a read lower than its predecessor means the counter
/// wrapped into a new cycle.
pub trait FreeRunningCounter {
    /// Current counter value, always below `period()`
    fn now(&self) -> Tick;

    /// Number of ticks in one counter cycle
    fn period(&self) -> Tick;
}

impl<C: FreeRunningCounter + ?Sized> FreeRunningCounter for &C {
    fn now(&self) -> Tick {
        (**self).now()
    }

    fn period(&self) -> Tick {
        (**self).period()
    }
}

/// Slow counter extended beyond the hardware range by an interrupt
///
/// A read is not atomic with respect to the writer and may lag by one
/// increment. Callers tolerate that jitter instead of correcting it.
pub trait ExtendedCounter {
    /// Number of overflow ticks since the counter started
    fn count(&self) -> u32;
}

impl<C: ExtendedCounter + ?Sized> ExtendedCounter for &C {
    fn count(&self) -> u32 {
        (**self).count()
    }
}
