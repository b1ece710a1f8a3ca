//! Frame counter

/// Counts cycles modulo the number of cycles in one period of the motion
///
/// The count is always in `0..period_in_cycles`; wrapping back to zero is
/// what makes the motion periodic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameCounter {
    count: u16,
    period_in_cycles: u16,
}

impl FrameCounter {
    /// Start at frame zero
    ///
    /// A zero-length period is treated as one frame.
    pub const fn new(period_in_cycles: u16) -> Self {
        Self {
            count: 0,
            period_in_cycles: if period_in_cycles == 0 { 1 } else { period_in_cycles },
        }
    }

    /// Current frame
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Frames per period
    pub fn period_in_cycles(&self) -> u16 {
        self.period_in_cycles
    }

    /// Fraction of the period elapsed, in `[0, 1)`
    pub fn phase(&self) -> f32 {
        f32::from(self.count) / f32::from(self.period_in_cycles)
    }

    /// Move to the next frame, wrapping at the end of the period
    pub fn advance(&mut self) {
        self.count += 1;
        if self.count >= self.period_in_cycles {
            self.count = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_to_zero() {
        let mut frame = FrameCounter::new(3);
        frame.advance();
        frame.advance();
        assert_eq!(frame.count(), 2);
        frame.advance();
        assert_eq!(frame.count(), 0);
    }

    #[test]
    fn test_phase_stays_below_one() {
        let mut frame = FrameCounter::new(133);
        for _ in 0..1000 {
            let phase = frame.phase();
            assert!((0.0..1.0).contains(&phase));
            frame.advance();
        }
    }

    #[test]
    fn test_zero_period() {
        let mut frame = FrameCounter::new(0);
        assert_eq!(frame.period_in_cycles(), 1);
        frame.advance();
        assert_eq!(frame.count(), 0);
        assert_eq!(frame.phase(), 0.0);
    }
}
