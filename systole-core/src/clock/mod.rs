//! Clock source
//!
//! The hardware counter itself lives behind
//! [`FreeRunningCounter`](systole_hal::FreeRunningCounter). This module adds
//! the interrupt-extended slow counter, wrap-aware tick arithmetic and the
//! named busy-wait loops every program is built from.

pub mod overflow;
pub mod spin;

pub use overflow::OverflowCounter;
pub use spin::{wait_for_change, wait_for_wrap, wait_until, Overrun};

use crate::Tick;

/// Forward distance from `from` to `to` on a counter wrapping at `period`
///
/// Both ticks must lie in `0..period`.
pub const fn ticks_between(from: Tick, to: Tick, period: Tick) -> Tick {
    if to >= from {
        to - from
    } else {
        period - from + to
    }
}

/// Whether `deadline` has passed at `now`, when both are known to lie in the
/// same counter cycle
///
/// Deadlines within one cycle are visited in non-decreasing order, so a
/// forward-only comparison is sufficient inside a cycle. Crossing a wrap is
/// detected separately by watching for a sample lower than its predecessor.
pub const fn has_passed(deadline: Tick, now: Tick) -> bool {
    now >= deadline
}
