//! Simulated hardware for host tests
//!
//! The simulated counter advances by a fixed step on every read, so busy
//! waits terminate and the number of polls shows up as elapsed time. Pins
//! record each write, stamped with the counter value at that moment, into a
//! shared trace.

use core::cell::{Cell, RefCell};

use heapless::Vec;
use systole_hal::{DutyRegister, ExtendedCounter, FreeRunningCounter, InputPin, OutputPin};

use crate::schedule::Edge;
use crate::Tick;

/// Maximum recorded pin writes per trace
pub const TRACE_CAPACITY: usize = 256;

/// Counter that advances `step` ticks per read, wrapping at `period`
pub struct SimCounter {
    now: Cell<Tick>,
    period: Tick,
    step: Tick,
    wraps: Cell<u32>,
    jump: Cell<Option<(Tick, Tick)>>,
}

impl SimCounter {
    pub fn new(period: Tick, step: Tick) -> Self {
        Self::starting_at(period, step, 0)
    }

    pub fn starting_at(period: Tick, step: Tick, start: Tick) -> Self {
        Self {
            now: Cell::new(start),
            period,
            step,
            wraps: Cell::new(0),
            jump: Cell::new(None),
        }
    }

    /// Once the counter reaches `at`, skip straight to `to` in the next cycle
    ///
    /// Stands in for a long interrupt or bus stall that hides a wrap from the
    /// poller.
    pub fn stall_into_next_cycle(&self, at: Tick, to: Tick) {
        self.jump.set(Some((at, to)));
    }

    /// Current value without advancing
    pub fn peek(&self) -> Tick {
        self.now.get()
    }

    /// Number of times the counter has wrapped
    pub fn wraps(&self) -> u32 {
        self.wraps.get()
    }
}

impl FreeRunningCounter for SimCounter {
    fn now(&self) -> Tick {
        let current = self.now.get();
        if let Some((at, to)) = self.jump.get() {
            if current >= at {
                self.jump.set(None);
                self.wraps.set(self.wraps.get() + 1);
                self.now.set(to);
                return current;
            }
        }
        let next = u32::from(current) + u32::from(self.step);
        if next >= u32::from(self.period) {
            self.wraps.set(self.wraps.get() + 1);
        }
        self.now.set((next % u32::from(self.period)) as Tick);
        current
    }

    fn period(&self) -> Tick {
        self.period
    }
}

/// Overflow counter that advances once every `reads_per_tick` reads
pub struct SimOverflow {
    reads: Cell<u32>,
    reads_per_tick: u32,
}

impl SimOverflow {
    pub fn new(reads_per_tick: u32) -> Self {
        Self {
            reads: Cell::new(0),
            reads_per_tick,
        }
    }

    pub fn peek(&self) -> u32 {
        self.reads.get() / self.reads_per_tick
    }
}

impl ExtendedCounter for SimOverflow {
    fn count(&self) -> u32 {
        let reads = self.reads.get();
        self.reads.set(reads + 1);
        reads / self.reads_per_tick
    }
}

/// One recorded pin write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEvent {
    pub channel: u8,
    pub edge: Edge,
    pub at: Tick,
}

/// Shared record of pin writes
#[derive(Default)]
pub struct Trace {
    events: RefCell<Vec<PinEvent, TRACE_CAPACITY>>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: PinEvent) {
        self.events
            .borrow_mut()
            .push(event)
            .expect("trace capacity exceeded");
    }

    pub fn events(&self) -> Vec<PinEvent, TRACE_CAPACITY> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Writes for a single channel, in order
    pub fn for_channel(&self, channel: u8) -> Vec<PinEvent, TRACE_CAPACITY> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.channel == channel)
            .copied()
            .collect()
    }
}

/// Output pin that records into a [`Trace`]
pub struct SimPin<'a> {
    channel: u8,
    clock: &'a SimCounter,
    trace: &'a Trace,
}

impl<'a> SimPin<'a> {
    pub fn new(channel: u8, clock: &'a SimCounter, trace: &'a Trace) -> Self {
        Self {
            channel,
            clock,
            trace,
        }
    }

    /// One pin per channel, all sharing `clock` and `trace`
    pub fn bank<const N: usize>(clock: &'a SimCounter, trace: &'a Trace) -> [SimPin<'a>; N] {
        core::array::from_fn(|i| SimPin::new(i as u8, clock, trace))
    }
}

impl OutputPin for SimPin<'_> {
    fn set_high(&mut self) {
        self.trace.push(PinEvent {
            channel: self.channel,
            edge: Edge::On,
            at: self.clock.peek(),
        });
    }

    fn set_low(&mut self) {
        self.trace.push(PinEvent {
            channel: self.channel,
            edge: Edge::Off,
            at: self.clock.peek(),
        });
    }
}

/// Input that reports a scripted level
pub struct SimInput {
    pub high: bool,
    pub reads: u32,
}

impl SimInput {
    pub fn new(high: bool) -> Self {
        Self { high, reads: 0 }
    }
}

impl InputPin for SimInput {
    fn is_high(&mut self) -> bool {
        self.reads += 1;
        self.high
    }
}

/// Duty register that keeps every value written to it
#[derive(Default)]
pub struct SimDuty {
    pub writes: Vec<u16, TRACE_CAPACITY>,
}

impl DutyRegister for SimDuty {
    fn set_duty(&mut self, duty: u16) {
        let _ = self.writes.push(duty);
    }
}
