//! Fault monitor implementation

use heapless::HistoryBuffer;

use crate::clock::Overrun;
use crate::schedule::Edge;

/// Number of recent faults kept for inspection
pub const FAULT_HISTORY: usize = 8;

/// A transition that missed its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingFault {
    pub channel: u8,
    pub edge: Edge,
    pub overrun: Overrun,
}

/// Fault condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultStatus {
    /// Every cycle so far met its deadlines
    Ok,
    /// At least one cycle overran; carries the first fault
    Overrun(TimingFault),
}

/// Overrun bookkeeping across cycles
///
/// Faults latch: once a cycle has overrun, [`check`](Self::check) keeps
/// reporting it.
pub struct FaultMonitor {
    /// Cycles recorded
    cycles: u32,
    /// Cycles whose first fault was a late start
    late: u32,
    /// Cycles whose first fault was a counter wrap
    wrapped: u32,
    first: Option<TimingFault>,
    recent: HistoryBuffer<TimingFault, FAULT_HISTORY>,
}

impl Default for FaultMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultMonitor {
    /// Create a monitor with no recorded cycles
    pub const fn new() -> Self {
        Self {
            cycles: 0,
            late: 0,
            wrapped: 0,
            first: None,
            recent: HistoryBuffer::new(),
        }
    }

    /// Record the outcome of one cycle
    pub fn record_cycle(&mut self, outcome: Result<(), TimingFault>) {
        self.cycles = self.cycles.wrapping_add(1);
        if let Err(fault) = outcome {
            self.record(fault);
        }
    }

    /// Record a single fault
    pub fn record(&mut self, fault: TimingFault) {
        match fault.overrun {
            Overrun::Late { .. } => self.late = self.late.saturating_add(1),
            Overrun::Wrapped { .. } => self.wrapped = self.wrapped.saturating_add(1),
        }
        if self.first.is_none() {
            self.first = Some(fault);
        }
        self.recent.write(fault);
    }

    /// Check for overruns
    pub fn check(&self) -> FaultStatus {
        match self.first {
            Some(fault) => FaultStatus::Overrun(fault),
            None => FaultStatus::Ok,
        }
    }

    /// Total faults recorded
    pub fn fault_count(&self) -> u32 {
        self.late.saturating_add(self.wrapped)
    }

    /// Faults where the deadline was already behind the first sample
    pub fn late_count(&self) -> u32 {
        self.late
    }

    /// Faults where the counter wrapped before the deadline
    pub fn wrapped_count(&self) -> u32 {
        self.wrapped
    }

    /// Cycles recorded, wrapping
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Up to [`FAULT_HISTORY`] recent faults, oldest first
    pub fn history(&self) -> impl Iterator<Item = &TimingFault> + '_ {
        self.recent.oldest_ordered()
    }
}
