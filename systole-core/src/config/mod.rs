//! Configuration types
//!
//! Programs are described by plain `const` configuration values generated at
//! build time. Everything the engine needs at run time (periods, tick
//! bounds, slot widths) is derived from them by `const fn`s, so a bad value
//! stops the build instead of reaching the hardware.

pub mod timing;
pub mod types;

pub use timing::{ConfigError, EaseTiming, Program, Timing};
pub use types::*;
