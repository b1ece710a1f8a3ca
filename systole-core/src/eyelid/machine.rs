//! Eyelid state machine

use crate::config::EaseTiming;
use crate::pulse::PulseMapper;
use crate::waveform::Waveform;

/// Rest position the lid is in or moving towards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LidState {
    /// Rests at the minimum duty
    Closed,
    /// Rests at the maximum duty
    Open,
}

impl LidState {
    /// The other rest position
    pub fn toggled(self) -> Self {
        match self {
            LidState::Closed => LidState::Open,
            LidState::Open => LidState::Closed,
        }
    }
}

/// Eyelid state with its motion baseline
///
/// Times are readings of the overflow-extended counter. Only differences
/// from the baseline are used, so the counter may wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Eyelid {
    state: LidState,
    mapper: PulseMapper,
    time_to_open: u32,
    /// Counter reading at the last flip; `None` until the first one
    motion_start: Option<u32>,
}

impl Eyelid {
    /// Start closed and at rest
    pub const fn new(timing: &EaseTiming) -> Self {
        Self {
            state: LidState::Closed,
            mapper: PulseMapper::new(timing.min_ticks, timing.max_ticks),
            time_to_open: timing.time_to_open,
            motion_start: None,
        }
    }

    pub fn state(&self) -> LidState {
        self.state
    }

    /// Counter ticks since the last flip, capped at the motion length
    fn elapsed(&self, now: u32) -> u32 {
        match self.motion_start {
            Some(start) => now.wrapping_sub(start).min(self.time_to_open),
            None => self.time_to_open,
        }
    }

    /// Whether the current motion has finished
    pub fn is_complete(&self, now: u32) -> bool {
        self.elapsed(now) >= self.time_to_open
    }

    /// Feed one button sample
    ///
    /// A press flips the state only once the previous motion is complete;
    /// sampling again mid-motion changes nothing. Returns whether it flipped.
    pub fn sample(&mut self, pressed: bool, now: u32) -> bool {
        if !pressed || !self.is_complete(now) {
            return false;
        }
        self.state = self.state.toggled();
        self.motion_start = Some(now);
        true
    }

    /// Duty for the lid at `now`
    ///
    /// The eased offset `trunc((1 + cos(π·t/T)) / 2 · range)` starts at the
    /// full range and reaches zero at the end of the motion. Closing adds it
    /// to the minimum; opening subtracts it from the maximum.
    pub fn duty(&self, now: u32) -> u16 {
        let phase = self.elapsed(now) as f32 / self.time_to_open as f32;
        let level = Waveform::CosineEase.level(phase, 0);
        let eased = self.mapper.duration(level) - self.mapper.min();
        match self.state {
            LidState::Closed => self.mapper.min() + eased,
            LidState::Open => self.mapper.max() - eased,
        }
    }
}
