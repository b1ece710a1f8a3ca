//! Board-agnostic core logic for the actuator firmware
//!
//! This crate contains everything that does not touch registers:
//!
//! - Clock helpers: overflow-extended counter and named busy-waits
//! - Waveform shapes and the frame counter that drives their phase
//! - Pulse-width mapping from levels to counter ticks
//! - The channel scheduler and its three transition policies
//! - The bistable eyelid state machine
//! - Configuration types and build-time timing derivation
//! - Overrun fault monitoring
//!
//! Hardware is reached only through the `systole-hal` capability traits.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod eyelid;
pub mod fault;
pub mod pulse;
pub mod schedule;
pub mod waveform;

#[cfg(test)]
pub(crate) mod sim;

pub use systole_hal::Tick;
