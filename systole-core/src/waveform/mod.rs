//! Waveform generation
//!
//! Periodic shape functions map a phase in `[0, 1)` and a channel id to an
//! actuation level in `[0, 1]`. The phase comes from a [`FrameCounter`] that
//! counts cycles modulo the length of one beat or breath.

pub mod frame;
pub mod shape;

pub use frame::FrameCounter;
pub use shape::Waveform;
