//! Systole Hardware Abstraction Layer
//!
//! This crate defines the capabilities the waveform engine consumes. Chip
//! HALs implement them; the core only ever sees these traits, which is what
//! lets the scheduler run against simulated pins and clocks on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Firmware binaries (systole-firmware)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  systole-core (engine, state machine)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  systole-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ systole-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`counter::FreeRunningCounter`] - The wrapping hardware counter
//! - [`counter::ExtendedCounter`] - Overflow-extended slow counter
//! - [`pwm::DutyRegister`] - Hardware PWM compare register

#![no_std]
#![deny(unsafe_code)]

pub mod counter;
pub mod gpio;
pub mod pwm;

// Re-export key traits at crate root for convenience
pub use counter::{ExtendedCounter, FreeRunningCounter, Tick};
pub use gpio::{Eh, InputPin, OutputPin};
pub use pwm::DutyRegister;
