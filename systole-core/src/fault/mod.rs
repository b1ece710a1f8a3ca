//! Timing fault monitoring
//!
//! Overruns are not recovered from: a late transition is still written and
//! the next cycle starts on the next counter wrap. The monitor only keeps
//! count so the firmware can report them.

pub mod monitor;

pub use monitor::{FaultMonitor, FaultStatus, TimingFault, FAULT_HISTORY};
