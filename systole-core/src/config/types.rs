//! Configuration type definitions

use crate::waveform::Waveform;
use crate::Tick;

/// Microseconds per second, for slot width conversion
pub const MICROS_PER_SECOND: u64 = 1_000_000;

/// Seconds per minute, for beats-per-minute conversion
pub const SECONDS_PER_MINUTE: u32 = 60;

/// How a program's channels share one counter cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PolicyConfig {
    /// Pulses centered on the middle of the cycle
    DualSlope,
    /// Pulses all start at the beginning of the cycle
    SingleSlope,
    /// Pulses one after another in fixed slots
    Sequential {
        /// Width of each channel's slot in microseconds
        between_us: u32,
    },
}

/// Software-PWM program configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgramConfig {
    /// Rate of the free-running counter after prescaling (Hz)
    pub counter_hz: u32,
    /// Counter cycles per second; one waveform frame per cycle
    pub frame_rate_hz: u16,
    /// Beats (or breaths) per minute
    pub bpm: u16,
    /// Shortest pulse as a percentage of the cycle
    pub min_percent: u8,
    /// Longest pulse as a percentage of the cycle
    pub max_percent: u8,
    /// Shape of one beat
    pub waveform: Waveform,
    /// Transition scheduling policy
    pub policy: PolicyConfig,
    /// Number of output channels
    pub channels: u8,
    /// Ticks kept free at the end of each cycle for computing the next frame
    pub margin_ticks: Tick,
    /// Lateness accepted before a transition counts as an overrun
    pub tolerance_ticks: Tick,
}

/// Hardware-PWM eased motion configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EaseConfig {
    /// Rate of the PWM counter after prescaling (Hz)
    pub counter_hz: u32,
    /// PWM frequency (Hz)
    pub frame_rate_hz: u16,
    /// Duty at rest in the closed position, as a percentage of the period
    pub min_percent: u8,
    /// Duty at rest in the open position, as a percentage of the period
    pub max_percent: u8,
    /// Rate of the overflow-extended slow counter (Hz)
    pub overflow_hz: u32,
    /// Duration of one open or close motion (ms)
    pub time_to_open_ms: u32,
}
