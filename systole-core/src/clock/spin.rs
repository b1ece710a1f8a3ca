//! Named busy-wait loops
//!
//! Every suspension point in the firmware is one of these spins. Each takes
//! an explicit deadline and the clock it polls, so the scheduler's ordering
//! logic runs unchanged against a simulated counter.

use systole_hal::{ExtendedCounter, FreeRunningCounter};

use super::{has_passed, ticks_between};
use crate::Tick;

/// Why a deadline could not be met on time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Overrun {
    /// The deadline had already passed by more than the tolerance when the
    /// wait started
    Late {
        /// Requested deadline
        deadline: Tick,
        /// First counter sample
        observed: Tick,
    },
    /// The counter wrapped into the next cycle before reaching the deadline
    Wrapped {
        /// Requested deadline
        deadline: Tick,
        /// First counter sample of the next cycle
        observed: Tick,
    },
}

impl Overrun {
    /// The deadline that was missed
    pub fn deadline(&self) -> Tick {
        match *self {
            Overrun::Late { deadline, .. } | Overrun::Wrapped { deadline, .. } => deadline,
        }
    }

    /// The sample that revealed the overrun
    pub fn observed(&self) -> Tick {
        match *self {
            Overrun::Late { observed, .. } | Overrun::Wrapped { observed, .. } => observed,
        }
    }

    /// Ticks between the deadline and the revealing sample, across the wrap
    /// if there was one
    pub fn lateness(&self, period: Tick) -> Tick {
        ticks_between(self.deadline(), self.observed(), period)
    }
}

/// Spin until the counter reaches `deadline`
///
/// `last` is the caller's most recent sample in the current cycle. A first
/// sample below it means the counter already wrapped between calls, which is
/// reported at once rather than after spinning through the next cycle.
///
/// Returns the sample that satisfied the wait. A deadline that is already
/// behind the first sample by at most `tolerance` ticks counts as met: equal
/// pulse widths produce equal deadlines, and the second of them is always
/// reached a few ticks late.
///
/// The caller performs its transition whatever the outcome; an `Err` only
/// reports that the transition was issued late.
pub fn wait_until<C>(
    clock: &C,
    last: Tick,
    deadline: Tick,
    tolerance: Tick,
) -> Result<Tick, Overrun>
where
    C: FreeRunningCounter + ?Sized,
{
    let first = clock.now();
    if first < last {
        return Err(Overrun::Wrapped {
            deadline,
            observed: first,
        });
    }
    if has_passed(deadline, first) {
        if first - deadline > tolerance {
            return Err(Overrun::Late {
                deadline,
                observed: first,
            });
        }
        return Ok(first);
    }

    let mut previous = first;
    loop {
        let now = clock.now();
        if now < previous {
            return Err(Overrun::Wrapped {
                deadline,
                observed: now,
            });
        }
        if has_passed(deadline, now) {
            return Ok(now);
        }
        previous = now;
    }
}

/// Spin until the counter wraps into a new cycle
///
/// `last` is the most recent sample the caller took in the current cycle.
/// The wait ends at the first sample lower than its predecessor, which is
/// the only reliable sign of a wrap on a counter that is polled rather than
/// latched. Returns that first sample of the new cycle.
///
/// If the counter already wrapped before this call, the first sample is
/// already below `last` and the wait returns at once; any lateness that
/// causes shows up in the next `wait_until`.
pub fn wait_for_wrap<C>(clock: &C, last: Tick) -> Tick
where
    C: FreeRunningCounter + ?Sized,
{
    let mut previous = last;
    loop {
        let now = clock.now();
        if now < previous {
            return now;
        }
        previous = now;
    }
}

/// Spin until the extended counter moves away from `last`
///
/// Returns the new count. Successive calls therefore run once per
/// distinguishable overflow tick.
pub fn wait_for_change<C>(counter: &C, last: u32) -> u32
where
    C: ExtendedCounter + ?Sized,
{
    loop {
        let now = counter.count();
        if now != last {
            return now;
        }
    }
}
