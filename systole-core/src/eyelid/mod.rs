//! Bistable eyelid
//!
//! A single servo on a hardware PWM channel toggles between two rest
//! positions on each button press, easing with a half cosine.

pub mod driver;
pub mod machine;

pub use driver::EyelidDriver;
pub use machine::{Eyelid, LidState};
