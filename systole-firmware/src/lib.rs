//! Shared firmware support for the Systole binaries
//!
//! Each binary in `src/bin` runs one program from `systole.toml`. This
//! library holds what they have in common: the generated program constants,
//! board bring-up and fault reporting.

#![no_std]

pub mod board;
pub mod report;

/// Program constants generated by `build.rs` from `systole.toml`
pub mod programs {
    include!(concat!(env!("OUT_DIR"), "/programs.rs"));
}
