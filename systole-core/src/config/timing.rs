//! Build-time timing derivation
//!
//! Turns a configuration into tick constants. Both derivations are
//! `const fn`: binaries evaluate them in `const` items, so any violated
//! constraint panics during compilation.

use super::types::{EaseConfig, PolicyConfig, ProgramConfig, MICROS_PER_SECOND, SECONDS_PER_MINUTE};
use crate::pulse::percent_to_ticks;
use crate::schedule::Policy;
use crate::waveform::Waveform;
use crate::Tick;

/// Configuration constraint violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Frame rate of zero
    ZeroFrameRate,
    /// Beats per minute of zero
    ZeroBpm,
    /// A duty percentage above 100
    DutyOutOfRange,
    /// Minimum duty above maximum duty
    InvertedDutyRange,
    /// Program without channels
    NoChannels,
    /// Cycle period empty or beyond the counter's range
    PeriodOutOfRange,
    /// Fewer than one frame per beat
    CycleTooShort,
    /// More frames per beat than the frame counter holds
    CycleTooLong,
    /// Longest pulse plus computation margin does not fit in the cycle
    PulseExceedsPeriod,
    /// Sequential slot narrower than the longest pulse
    SlotTooNarrow,
    /// Sequential slots plus computation margin do not fit in the cycle
    SlotsExceedPeriod,
    /// Eased motion with no duration
    ZeroEaseTime,
}

impl ConfigError {
    /// Abort compilation with a message naming the violation
    const fn fail(self) -> ! {
        match self {
            ConfigError::ZeroFrameRate => panic!("frame_rate_hz must be non-zero"),
            ConfigError::ZeroBpm => panic!("bpm must be non-zero"),
            ConfigError::DutyOutOfRange => panic!("duty percentages must lie within 0..=100"),
            ConfigError::InvertedDutyRange => panic!("min_percent must not exceed max_percent"),
            ConfigError::NoChannels => panic!("a program needs at least one channel"),
            ConfigError::PeriodOutOfRange => {
                panic!("counter_hz / frame_rate_hz must lie within 1..=65535 ticks")
            }
            ConfigError::CycleTooShort => panic!("bpm too high: less than one frame per beat"),
            ConfigError::CycleTooLong => panic!("bpm too low: more than 65535 frames per beat"),
            ConfigError::PulseExceedsPeriod => {
                panic!("longest pulse plus margin_ticks does not fit in one cycle")
            }
            ConfigError::SlotTooNarrow => panic!("between_us is shorter than the longest pulse"),
            ConfigError::SlotsExceedPeriod => {
                panic!("channels * between_us plus margin_ticks does not fit in one cycle")
            }
            ConfigError::ZeroEaseTime => panic!("time_to_open_ms and overflow_hz must be non-zero"),
        }
    }
}

/// Tick constants shared by every software-PWM program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Counter ticks per cycle
    pub period: Tick,
    /// Cycles per beat
    pub period_in_cycles: u16,
    /// Shortest pulse
    pub min_ticks: Tick,
    /// Longest pulse
    pub max_ticks: Tick,
    /// Lateness accepted before reporting an overrun
    pub tolerance: Tick,
}

/// A fully derived software-PWM program
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Program {
    pub timing: Timing,
    pub waveform: Waveform,
    pub policy: Policy,
    pub channels: u8,
}

/// Ticks per cycle for a counter rate and frame rate
const fn cycle_period(counter_hz: u32, frame_rate_hz: u16) -> Result<Tick, ConfigError> {
    if frame_rate_hz == 0 {
        return Err(ConfigError::ZeroFrameRate);
    }
    let period = counter_hz / frame_rate_hz as u32;
    if period == 0 || period > Tick::MAX as u32 {
        return Err(ConfigError::PeriodOutOfRange);
    }
    Ok(period as Tick)
}

/// Percent bounds checked and converted to ticks
const fn duty_bounds(min_percent: u8, max_percent: u8, period: Tick) -> Result<(Tick, Tick), ConfigError> {
    if min_percent > 100 || max_percent > 100 {
        return Err(ConfigError::DutyOutOfRange);
    }
    if min_percent > max_percent {
        return Err(ConfigError::InvertedDutyRange);
    }
    Ok((
        percent_to_ticks(min_percent, period),
        percent_to_ticks(max_percent, period),
    ))
}

impl Program {
    /// Derive tick constants, reporting the first violated constraint
    pub const fn try_derive(cfg: &ProgramConfig) -> Result<Self, ConfigError> {
        if cfg.channels == 0 {
            return Err(ConfigError::NoChannels);
        }
        if cfg.bpm == 0 {
            return Err(ConfigError::ZeroBpm);
        }

        let period = match cycle_period(cfg.counter_hz, cfg.frame_rate_hz) {
            Ok(period) => period,
            Err(e) => return Err(e),
        };

        let period_in_cycles = SECONDS_PER_MINUTE * cfg.frame_rate_hz as u32 / cfg.bpm as u32;
        if period_in_cycles == 0 {
            return Err(ConfigError::CycleTooShort);
        }
        if period_in_cycles > u16::MAX as u32 {
            return Err(ConfigError::CycleTooLong);
        }

        let (min_ticks, max_ticks) = match duty_bounds(cfg.min_percent, cfg.max_percent, period) {
            Ok(bounds) => bounds,
            Err(e) => return Err(e),
        };

        let policy = match cfg.policy {
            PolicyConfig::DualSlope => Policy::DualSlope,
            PolicyConfig::SingleSlope => Policy::SingleSlope,
            PolicyConfig::Sequential { between_us } => {
                let between =
                    (cfg.counter_hz as u64 * between_us as u64 / MICROS_PER_SECOND) as u32;
                if between == 0 || (max_ticks as u32) > between {
                    return Err(ConfigError::SlotTooNarrow);
                }
                let slots = cfg.channels as u32 * between + cfg.margin_ticks as u32;
                if slots >= period as u32 {
                    return Err(ConfigError::SlotsExceedPeriod);
                }
                Policy::Sequential {
                    between: between as Tick,
                }
            }
        };

        // Sequential slots are bounded above; the other two policies end at
        // their longest pulse's OFF edge.
        if !matches!(policy, Policy::Sequential { .. }) {
            let last = policy.last_deadline_bound(period, max_ticks, cfg.channels) as u32;
            if last + cfg.margin_ticks as u32 >= period as u32 {
                return Err(ConfigError::PulseExceedsPeriod);
            }
        }

        Ok(Self {
            timing: Timing {
                period,
                period_in_cycles: period_in_cycles as u16,
                min_ticks,
                max_ticks,
                tolerance: cfg.tolerance_ticks,
            },
            waveform: cfg.waveform,
            policy,
            channels: cfg.channels,
        })
    }

    /// Derive tick constants, panicking on any violated constraint
    ///
    /// Intended for `const` items, where the panic is a compile error.
    pub const fn derive(cfg: &ProgramConfig) -> Self {
        match Self::try_derive(cfg) {
            Ok(program) => program,
            Err(e) => e.fail(),
        }
    }
}

/// Tick constants for the eased hardware-PWM motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EaseTiming {
    /// PWM counter ticks per period
    pub period: Tick,
    /// Duty in the closed rest position
    pub min_ticks: Tick,
    /// Duty in the open rest position
    pub max_ticks: Tick,
    /// Slow-counter ticks per motion
    pub time_to_open: u32,
}

impl EaseTiming {
    /// Derive tick constants, reporting the first violated constraint
    pub const fn try_derive(cfg: &EaseConfig) -> Result<Self, ConfigError> {
        let period = match cycle_period(cfg.counter_hz, cfg.frame_rate_hz) {
            Ok(period) => period,
            Err(e) => return Err(e),
        };
        let (min_ticks, max_ticks) = match duty_bounds(cfg.min_percent, cfg.max_percent, period) {
            Ok(bounds) => bounds,
            Err(e) => return Err(e),
        };

        let time_to_open = cfg.overflow_hz as u64 * cfg.time_to_open_ms as u64 / 1000;
        if time_to_open == 0 || time_to_open > u32::MAX as u64 {
            return Err(ConfigError::ZeroEaseTime);
        }

        Ok(Self {
            period,
            min_ticks,
            max_ticks,
            time_to_open: time_to_open as u32,
        })
    }

    /// Derive tick constants, panicking on any violated constraint
    pub const fn derive(cfg: &EaseConfig) -> Self {
        match Self::try_derive(cfg) {
            Ok(timing) => timing,
            Err(e) => e.fail(),
        }
    }

    /// Span between the two rest positions
    pub const fn range(&self) -> Tick {
        self.max_ticks - self.min_ticks
    }
}
