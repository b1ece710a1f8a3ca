//! Channel scheduling
//!
//! Each cycle every channel gets exactly one ON and one OFF transition. A
//! [`Policy`] decides where in the cycle those transitions fall, the
//! [`TransitionPlan`] walks them in deadline order, and the [`Engine`]
//! busy-waits each deadline and writes the pin.

pub mod engine;
pub mod policy;
pub mod sort;

pub use engine::Engine;
pub use policy::{Edge, Policy, Transition, TransitionPlan};
pub use sort::{bubble_pass, settle};
