//! Periodic shape functions
//!
//! All shapes are stateless and deterministic. Their outputs stay inside
//! `[0, 1]` by construction rather than by clamping: `(1 + c) / 2` with
//! `|c| <= 1`, and powers of `|sin|` on `[0, π)`. The `micromath`
//! approximations keep `|sin|` and `|cos|` within 1, so the bounds hold for
//! them too.
//!
//! Trig goes through [`F32Ext`] by path so host builds, which also see
//! std's inherent float methods, run the same approximations as the target.

use core::f32::consts::{PI, TAU};

use micromath::F32Ext;

/// Shape of one period of motion
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Waveform {
    /// `(1 + cos(π·phase)) / 2`: eases from 1 down to 0 over one motion
    CosineEase,
    /// `(1 + sin(2π·phase + channel·offset)) / 2`
    SineBreathing {
        /// Phase lead per channel, in radians
        offset: f32,
    },
    /// `sin(π·phase')^(2^exponent)` with `phase' = fract(phase + channel·stagger)`
    ///
    /// Only the non-negative half of the sine is used; the repeated squaring
    /// narrows the peak into a heartbeat-like pulse.
    SharpenedSine {
        /// Phase lag per channel, as a fraction of the half period
        stagger: f32,
        /// Number of squarings applied to the sine
        exponent: u8,
    },
}

impl Waveform {
    /// Actuation level for `channel` at `phase`
    ///
    /// `phase` is expected in `[0, 1)`; [`CosineEase`](Self::CosineEase)
    /// also accepts exactly 1.0, the end of its motion.
    pub fn level(&self, phase: f32, channel: u8) -> f32 {
        match *self {
            Waveform::CosineEase => (1.0 + F32Ext::cos(phase * PI)) / 2.0,
            Waveform::SineBreathing { offset } => {
                let angle = TAU * phase + f32::from(channel) * offset;
                (1.0 + F32Ext::sin(angle)) / 2.0
            }
            Waveform::SharpenedSine { stagger, exponent } => {
                let shifted = F32Ext::fract(phase + f32::from(channel) * stagger);
                let mut pos = F32Ext::abs(F32Ext::sin(shifted * PI));
                for _ in 0..exponent {
                    pos *= pos;
                }
                pos
            }
        }
    }
}
