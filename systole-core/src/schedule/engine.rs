//! Software-PWM engine
//!
//! Owns the counter, the pins and everything derived per frame. One call to
//! [`Engine::run_cycle`] is one counter period:
//!
//! ```text
//!   wrap ──► emit transitions ──► advance frame ──► prepare widths ──► wrap
//!            (busy-waits)                           (inside the margin)
//! ```

use systole_hal::{FreeRunningCounter, OutputPin};

use super::policy::{Edge, Policy};
use super::sort::settle;
use crate::clock::{wait_for_wrap, wait_until, Overrun};
use crate::config::Program;
use crate::fault::{FaultMonitor, TimingFault};
use crate::pulse::PulseMapper;
use crate::waveform::{FrameCounter, Waveform};
use crate::Tick;

/// Multi-channel transition engine
pub struct Engine<C, P, const N: usize> {
    clock: C,
    pins: [P; N],
    waveform: Waveform,
    mapper: PulseMapper,
    policy: Policy,
    period: Tick,
    tolerance: Tick,
    frame: FrameCounter,
    widths: [Tick; N],
    order: [u8; N],
    /// Most recent counter sample in the current cycle
    last: Tick,
    monitor: FaultMonitor,
}

impl<C, P, const N: usize> Engine<C, P, N>
where
    C: FreeRunningCounter,
    P: OutputPin,
{
    /// Build an engine for `program`
    ///
    /// Drives every pin low and computes frame zero, so the first
    /// [`run_cycle`](Self::run_cycle) only has to wait for a wrap.
    pub fn new(clock: C, mut pins: [P; N], program: &Program) -> Self {
        debug_assert_eq!(
            usize::from(program.channels),
            N,
            "program channel count does not match the pin array"
        );
        for pin in pins.iter_mut() {
            pin.set_low();
        }

        let timing = program.timing;
        let last = clock.now();
        let mut engine = Self {
            clock,
            pins,
            waveform: program.waveform,
            mapper: PulseMapper::new(timing.min_ticks, timing.max_ticks),
            policy: program.policy,
            period: timing.period,
            tolerance: timing.tolerance,
            frame: FrameCounter::new(timing.period_in_cycles),
            widths: [0; N],
            order: core::array::from_fn(|i| i as u8),
            last,
            monitor: FaultMonitor::new(),
        };
        engine.prepare();
        engine
    }

    /// Recompute every width for the current frame and restore the order
    ///
    /// Returns the number of sort passes that moved a channel.
    pub fn prepare(&mut self) -> usize {
        let phase = self.frame.phase();
        for (channel, width) in self.widths.iter_mut().enumerate() {
            *width = self.mapper.duration(self.waveform.level(phase, channel as u8));
        }
        if self.policy.needs_sort() {
            settle(&mut self.order, &self.widths)
        } else {
            0
        }
    }

    /// Issue this cycle's transitions
    ///
    /// Every transition is written even when its deadline was missed, so
    /// each channel still gets its ON and OFF. Once the counter has wrapped
    /// the remaining deadlines belong to a cycle that is over: they are
    /// written at once, leaving every pin low, and the next
    /// [`run_cycle`](Self::run_cycle) skips the cycle the wrap landed in.
    /// Returns the first fault.
    pub fn emit(&mut self) -> Result<(), TimingFault> {
        let mut first_fault = None;
        let mut wrapped = false;

        for transition in self.policy.plan(self.period, &self.widths, &self.order) {
            if !wrapped {
                match wait_until(&self.clock, self.last, transition.deadline, self.tolerance) {
                    Ok(now) => self.last = now,
                    Err(overrun) => {
                        self.last = overrun.observed();
                        wrapped = matches!(overrun, Overrun::Wrapped { .. });
                        first_fault.get_or_insert(TimingFault {
                            channel: transition.channel,
                            edge: transition.edge,
                            overrun,
                        });
                    }
                }
            }

            let pin = &mut self.pins[transition.channel as usize];
            match transition.edge {
                Edge::On => pin.set_high(),
                Edge::Off => pin.set_low(),
            }
        }

        match first_fault {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    /// Run one full counter period
    pub fn run_cycle(&mut self) -> Result<(), TimingFault> {
        self.last = wait_for_wrap(&self.clock, self.last);
        let outcome = self.emit();
        self.frame.advance();
        self.prepare();
        self.monitor.record_cycle(outcome);
        outcome
    }

    /// Run forever, handing each fault to `on_fault`
    ///
    /// `on_fault` runs inside the computation margin of the cycle that
    /// faulted, so it must be short.
    pub fn run<F>(mut self, mut on_fault: F) -> !
    where
        F: FnMut(&TimingFault, &FaultMonitor),
    {
        loop {
            if let Err(fault) = self.run_cycle() {
                on_fault(&fault, &self.monitor);
            }
        }
    }

    /// Widths computed for the upcoming cycle
    pub fn widths(&self) -> &[Tick; N] {
        &self.widths
    }

    /// Channel order for the upcoming cycle
    pub fn order(&self) -> &[u8; N] {
        &self.order
    }

    /// Current frame
    pub fn frame(&self) -> &FrameCounter {
        &self.frame
    }

    /// Fault statistics
    pub fn faults(&self) -> &FaultMonitor {
        &self.monitor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PolicyConfig, ProgramConfig};
    use crate::sim::{PinEvent, SimCounter, SimPin, Trace};

    fn program(policy: PolicyConfig, waveform: Waveform, counter_hz: u32, frame_rate_hz: u16) -> Program {
        Program::derive(&ProgramConfig {
            counter_hz,
            frame_rate_hz,
            bpm: 45,
            min_percent: 5,
            max_percent: 10,
            waveform,
            policy,
            channels: 4,
            margin_ticks: 100,
            tolerance_ticks: 8,
        })
    }

    fn breathing() -> Program {
        let mut program = program(
            PolicyConfig::DualSlope,
            Waveform::SineBreathing { offset: 1.0 },
            100_000,
            100,
        );
        program.timing.min_ticks = 0;
        program.timing.max_ticks = 900;
        program
    }

    fn servo() -> Program {
        program(
            PolicyConfig::Sequential { between_us: 2125 },
            Waveform::SharpenedSine {
                stagger: 0.0,
                exponent: 3,
            },
            50_000,
            50,
        )
    }

    /// Pairs each channel's ON with its OFF and returns the pulse lengths
    fn pulse_lengths(trace: &Trace, channels: u8) -> Vec<Tick> {
        (0..channels)
            .map(|channel| {
                let events = trace.for_channel(channel);
                assert_eq!(events.len(), 2, "channel {channel}");
                assert_eq!(events[0].edge, Edge::On);
                assert_eq!(events[1].edge, Edge::Off);
                events[1].at - events[0].at
            })
            .collect()
    }

    #[test]
    fn test_new_drives_pins_low() {
        let clock = SimCounter::new(1000, 1);
        let trace = Trace::new();
        let pins = SimPin::bank::<4>(&clock, &trace);
        let engine = Engine::new(&clock, pins, &breathing());

        assert!(trace.events().iter().all(|e| e.edge == Edge::Off));
        assert_eq!(trace.events().len(), 4);
        assert_eq!(engine.frame().count(), 0);
    }

    #[test]
    fn test_breathing_first_frame() {
        let clock = SimCounter::new(1000, 1);
        let trace = Trace::new();
        let pins = SimPin::bank::<4>(&clock, &trace);
        let engine = Engine::new(&clock, pins, &breathing());

        // Channel 0 starts at level 0.5
        assert_eq!(engine.widths()[0], 450);
        assert_eq!(engine.frame().period_in_cycles(), 133);
        let order = engine.order();
        for pair in order.windows(2) {
            assert!(engine.widths()[pair[0] as usize] <= engine.widths()[pair[1] as usize]);
        }
    }

    #[test]
    fn test_servo_first_frame_is_all_minimum() {
        let clock = SimCounter::new(1000, 1);
        let trace = Trace::new();
        let pins = SimPin::bank::<4>(&clock, &trace);
        let engine = Engine::new(&clock, pins, &servo());

        assert_eq!(engine.frame().period_in_cycles(), 66);
        assert_eq!(engine.widths(), &[50; 4]);
    }

    #[test]
    fn test_dual_slope_cycle_on_exact_clock() {
        let clock = SimCounter::new(1000, 1);
        let trace = Trace::new();
        let pins = SimPin::bank::<4>(&clock, &trace);
        let mut engine = Engine::new(&clock, pins, &breathing());
        let expected = *engine.widths();
        trace.clear();

        assert_eq!(engine.run_cycle(), Ok(()));
        assert_eq!(clock.wraps(), 1);
        assert_eq!(engine.frame().count(), 1);

        // Pin writes happen on the sample after the deadline is seen
        let lengths = pulse_lengths(&trace, 4);
        for (channel, &length) in lengths.iter().enumerate() {
            assert!(length.abs_diff(expected[channel]) <= 1, "channel {channel}");
        }

        // Pulses are centered on the middle of the cycle
        for channel in 0..4u8 {
            let events = trace.for_channel(channel);
            let center = (events[0].at + events[1].at) / 2;
            assert!(center.abs_diff(500) <= 2, "channel {channel} centered at {center}");
        }
    }

    #[test]
    fn test_sequential_cycle_stays_in_slots() {
        let clock = SimCounter::new(1000, 1);
        let trace = Trace::new();
        let pins = SimPin::bank::<4>(&clock, &trace);
        let mut engine = Engine::new(&clock, pins, &servo());
        trace.clear();

        assert_eq!(engine.run_cycle(), Ok(()));

        // 2.125 ms at 50 kHz is 106 ticks per slot
        for channel in 0..4u8 {
            let events = trace.for_channel(channel);
            let slot = Tick::from(channel) * 106;
            assert!(events[0].at >= slot);
            assert!(events[1].at <= slot + 106 + 1);
        }
        let lengths = pulse_lengths(&trace, 4);
        assert!(lengths.iter().all(|&l| l.abs_diff(50) <= 1));
    }

    #[test]
    fn test_every_cycle_covers_every_channel() {
        let clock = SimCounter::new(1000, 3);
        let trace = Trace::new();
        let pins = SimPin::bank::<4>(&clock, &trace);
        let mut engine = Engine::new(&clock, pins, &breathing());

        for _ in 0..20 {
            trace.clear();
            assert_eq!(engine.run_cycle(), Ok(()));
            pulse_lengths(&trace, 4);
        }
        assert_eq!(engine.frame().count(), 20);
        assert_eq!(engine.faults().cycles(), 20);
    }

    #[test]
    fn test_coarse_clock_reports_overrun() {
        // Each poll costs 150 ticks: equal-width pulses cannot be honoured
        let clock = SimCounter::new(1000, 150);
        let trace = Trace::new();
        let pins = SimPin::bank::<4>(&clock, &trace);
        let mut engine = Engine::new(&clock, pins, &servo());
        trace.clear();

        let fault = engine.run_cycle().unwrap_err();
        assert!(matches!(
            fault.overrun,
            Overrun::Late { .. } | Overrun::Wrapped { .. }
        ));
        assert_eq!(engine.faults().fault_count(), 1);

        // Transitions are still written so every pin ends low
        let events: Vec<PinEvent> = trace.events().into_iter().collect();
        assert_eq!(events.len(), 8);
        for channel in 0..4u8 {
            assert_eq!(trace.for_channel(channel).last().map(|e| e.edge), Some(Edge::Off));
        }
    }

    #[test]
    fn test_wrap_mid_cycle_flushes_remaining_transitions() {
        // Slots of 106 ticks, 50-tick pulses: channel 3 is due ON at 346
        let clock = SimCounter::new(1000, 1);
        let trace = Trace::new();
        let pins = SimPin::bank::<4>(&clock, &trace);
        let mut engine = Engine::new(&clock, pins, &servo());
        trace.clear();

        clock.stall_into_next_cycle(300, 250);
        let fault = engine.run_cycle().unwrap_err();
        assert_eq!(fault.channel, 3);
        assert_eq!(fault.edge, Edge::On);
        assert_eq!(
            fault.overrun,
            Overrun::Wrapped {
                deadline: 346,
                observed: 250
            }
        );
        assert_eq!(engine.faults().wrapped_count(), 1);

        // Channels before the stall keep their width; channel 3 is not stretched
        let lengths = pulse_lengths(&trace, 4);
        assert_eq!(&lengths[..3], &[50, 50, 50]);
        assert_eq!(lengths[3], 0);

        // The cycle the stall landed in is skipped; the next one is clean
        let expected = *engine.widths();
        trace.clear();
        assert_eq!(engine.run_cycle(), Ok(()));
        assert_eq!(clock.wraps(), 3);
        let lengths = pulse_lengths(&trace, 4);
        for (channel, &length) in lengths.iter().enumerate() {
            assert!(length.abs_diff(expected[channel]) <= 1, "channel {channel}");
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "channel count")]
    fn test_pin_count_must_match_program() {
        let clock = SimCounter::new(1000, 1);
        let trace = Trace::new();
        let pins = SimPin::bank::<3>(&clock, &trace);
        let _ = Engine::new(&clock, pins, &servo());
    }

    #[test]
    fn test_run_cycle_advances_frame_and_wraps_period() {
        let clock = SimCounter::new(1000, 5);
        let trace = Trace::new();
        let pins = SimPin::bank::<4>(&clock, &trace);
        let mut engine = Engine::new(&clock, pins, &servo());

        for _ in 0..66 {
            trace.clear();
            engine.run_cycle().unwrap();
        }
        assert_eq!(engine.frame().count(), 0);
        assert_eq!(engine.widths(), &[50; 4]);
    }
}
