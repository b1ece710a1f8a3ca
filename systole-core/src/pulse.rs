//! Pulse-width mapping
//!
//! Converts normalized actuation levels into counter-tick durations, and
//! derives the tick bounds of a duty range from percentages.

use crate::Tick;

/// Convert a duty percentage of `period` into ticks
///
/// Rounds half up: `(period * percent + 50) / 100`. This is the only place
/// the rounding bias lives; every min/max bound in the firmware goes through
/// it, so a 5% bound of a 20 ms period lands on the same tick as the classic
/// `(period + 10) / 20` millisecond derivation.
pub const fn percent_to_ticks(percent: u8, period: Tick) -> Tick {
    ((period as u32 * percent as u32 + 50) / 100) as Tick
}

/// Affine map from a level in `[0, 1]` to a tick duration in
/// `[min, min + range]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseMapper {
    min: Tick,
    range: Tick,
}

impl PulseMapper {
    /// Create a mapper covering `min..=max`
    ///
    /// `max` below `min` collapses to an empty range.
    pub const fn new(min: Tick, max: Tick) -> Self {
        Self {
            min,
            range: max.saturating_sub(min),
        }
    }

    /// Shortest pulse
    pub const fn min(&self) -> Tick {
        self.min
    }

    /// Span between shortest and longest pulse
    pub const fn range(&self) -> Tick {
        self.range
    }

    /// Longest pulse
    pub const fn max(&self) -> Tick {
        self.min + self.range
    }

    /// Tick duration for `level`
    ///
    /// `min + trunc(level * range)`. Truncation is applied uniformly, so the
    /// map is non-decreasing in `level` and a level of exactly 1.0 reaches
    /// `max`.
    pub fn duration(&self, level: f32) -> Tick {
        self.min + (level * f32::from(self.range)) as Tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_percent_rounding_matches_millisecond_derivation() {
        // 20 ms servo period counted in ticks: 1 ms == 5%
        for period in [26_667u16, 28_311, 62_500, 1000, 999] {
            let millisecond = ((u32::from(period) + 10) / 20) as Tick;
            assert_eq!(percent_to_ticks(5, period), millisecond, "period {period}");
        }
    }

    #[test]
    fn test_percent_bounds() {
        assert_eq!(percent_to_ticks(0, 62_500), 0);
        assert_eq!(percent_to_ticks(100, 62_500), 62_500);
        assert_eq!(percent_to_ticks(10, 62_500), 6_250);
    }

    #[test]
    fn test_percent_rounds_half_up() {
        // 33% of 150 = 49.5
        assert_eq!(percent_to_ticks(33, 150), 50);
        // 33% of 140 = 46.2
        assert_eq!(percent_to_ticks(33, 140), 46);
    }

    #[test]
    fn test_duration_endpoints() {
        let mapper = PulseMapper::new(1333, 2667);
        assert_eq!(mapper.range(), 1334);
        assert_eq!(mapper.duration(0.0), 1333);
        assert_eq!(mapper.duration(1.0), 2667);
        assert_eq!(mapper.duration(0.5), 1333 + 667);
    }

    #[test]
    fn test_duration_truncates() {
        let mapper = PulseMapper::new(0, 10);
        assert_eq!(mapper.duration(0.19), 1);
        assert_eq!(mapper.duration(0.99), 9);
    }

    #[test]
    fn test_inverted_range_collapses() {
        let mapper = PulseMapper::new(500, 100);
        assert_eq!(mapper.range(), 0);
        assert_eq!(mapper.duration(1.0), 500);
    }

    proptest! {
        #[test]
        fn prop_duration_monotonic(
            min in 0u16..30_000,
            range in 0u16..30_000,
            a in 0.0f32..=1.0,
            b in 0.0f32..=1.0,
        ) {
            let mapper = PulseMapper::new(min, min + range);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(mapper.duration(lo) <= mapper.duration(hi));
        }

        #[test]
        fn prop_duration_within_bounds(
            min in 0u16..30_000,
            range in 0u16..30_000,
            level in 0.0f32..=1.0,
        ) {
            let mapper = PulseMapper::new(min, min + range);
            let ticks = mapper.duration(level);
            prop_assert!(ticks >= mapper.min());
            prop_assert!(ticks <= mapper.max());
        }
    }
}
