//! Transition placement policies

use crate::Tick;

/// Direction of a pin transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    On,
    Off,
}

/// One scheduled pin write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub channel: u8,
    pub edge: Edge,
    /// Counter value at or after which the write happens
    pub deadline: Tick,
}

/// Where each channel's pulse sits inside a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Policy {
    /// Pulses centered on the middle of the cycle
    ///
    /// ON edges run from the widest pulse to the narrowest at
    /// `P/2 - w/2`, OFF edges from the narrowest to the widest at `ON + w`.
    DualSlope,
    /// Every pulse starts at tick 0; OFF edges in ascending width order
    SingleSlope,
    /// Channel `i` owns the slot `[i·between, (i+1)·between)` and its pulse
    /// is centered in that slot
    Sequential {
        /// Slot width in ticks
        between: Tick,
    },
}

impl Policy {
    /// Whether the plan depends on channels being ordered by width
    pub const fn needs_sort(&self) -> bool {
        !matches!(self, Policy::Sequential { .. })
    }

    /// Latest deadline any plan can produce with pulses up to `max`
    pub const fn last_deadline_bound(&self, period: Tick, max: Tick, channels: u8) -> Tick {
        match *self {
            Policy::DualSlope => period / 2 - max / 2 + max,
            Policy::SingleSlope => max,
            Policy::Sequential { between } => {
                let last = channels.saturating_sub(1) as Tick;
                last * between + between / 2 - max / 2 + max
            }
        }
    }

    /// Plan one cycle
    ///
    /// `order` must list every channel once, ascending by width, whenever
    /// [`needs_sort`](Self::needs_sort) is true.
    pub fn plan<'a, const N: usize>(
        &self,
        period: Tick,
        widths: &'a [Tick; N],
        order: &'a [u8; N],
    ) -> TransitionPlan<'a, N> {
        TransitionPlan {
            policy: *self,
            period,
            widths,
            order,
            step: 0,
        }
    }
}

/// Iterator over one cycle's transitions in deadline order
///
/// Yields `2 * N` transitions: one ON and one OFF per channel, each OFF
/// after its channel's ON, with non-decreasing deadlines.
#[derive(Debug, Clone)]
pub struct TransitionPlan<'a, const N: usize> {
    policy: Policy,
    period: Tick,
    widths: &'a [Tick; N],
    order: &'a [u8; N],
    step: usize,
}

impl<const N: usize> TransitionPlan<'_, N> {
    fn width(&self, channel: u8) -> Tick {
        self.widths[channel as usize]
    }

    fn centered_on(&self, center: Tick, channel: u8) -> Tick {
        center - self.width(channel) / 2
    }

    fn transition(&self, step: usize) -> Transition {
        let (channel, edge, deadline) = match self.policy {
            Policy::DualSlope => {
                let center = self.period / 2;
                if step < N {
                    let channel = self.order[N - 1 - step];
                    (channel, Edge::On, self.centered_on(center, channel))
                } else {
                    let channel = self.order[step - N];
                    let on = self.centered_on(center, channel);
                    (channel, Edge::Off, on + self.width(channel))
                }
            }
            Policy::SingleSlope => {
                if step < N {
                    (step as u8, Edge::On, 0)
                } else {
                    let channel = self.order[step - N];
                    (channel, Edge::Off, self.width(channel))
                }
            }
            Policy::Sequential { between } => {
                let channel = (step / 2) as u8;
                let center = Tick::from(channel) * between + between / 2;
                let on = self.centered_on(center, channel);
                if step % 2 == 0 {
                    (channel, Edge::On, on)
                } else {
                    (channel, Edge::Off, on + self.width(channel))
                }
            }
        };
        Transition {
            channel,
            edge,
            deadline,
        }
    }
}

impl<const N: usize> Iterator for TransitionPlan<'_, N> {
    type Item = Transition;

    fn next(&mut self) -> Option<Transition> {
        if self.step >= 2 * N {
            return None;
        }
        let transition = self.transition(self.step);
        self.step += 1;
        Some(transition)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (2 * N).saturating_sub(self.step);
        (remaining, Some(remaining))
    }
}

impl<const N: usize> ExactSizeIterator for TransitionPlan<'_, N> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::settle;
    use proptest::prelude::*;

    const PERIOD: Tick = 1000;

    fn sorted<const N: usize>(widths: &[Tick; N]) -> [u8; N] {
        let mut order = core::array::from_fn(|i| i as u8);
        settle(&mut order, widths);
        order
    }

    fn collect<const N: usize>(policy: Policy, widths: &[Tick; N]) -> Vec<Transition> {
        let order = sorted(widths);
        policy.plan(PERIOD, widths, &order).collect()
    }

    /// Exactly one ON then one OFF per channel, OFF - ON equal to the width
    fn assert_coverage<const N: usize>(plan: &[Transition], widths: &[Tick; N]) {
        assert_eq!(plan.len(), 2 * N);
        for channel in 0..N as u8 {
            let edges: Vec<_> = plan.iter().filter(|t| t.channel == channel).collect();
            assert_eq!(edges.len(), 2, "channel {channel}");
            assert_eq!(edges[0].edge, Edge::On);
            assert_eq!(edges[1].edge, Edge::Off);
            assert_eq!(
                edges[1].deadline - edges[0].deadline,
                widths[channel as usize]
            );
        }
    }

    fn non_decreasing(plan: &[Transition]) -> bool {
        plan.windows(2).all(|w| w[0].deadline <= w[1].deadline)
    }

    #[test]
    fn test_dual_slope_centers_pulses() {
        let widths = [100, 400, 0, 250];
        let plan = collect(Policy::DualSlope, &widths);
        assert_coverage(&plan, &widths);
        assert!(non_decreasing(&plan));

        // Widest first on the way up, narrowest first on the way down
        assert_eq!(plan[0], Transition { channel: 1, edge: Edge::On, deadline: 300 });
        assert_eq!(plan[3], Transition { channel: 2, edge: Edge::On, deadline: 500 });
        assert_eq!(plan[4], Transition { channel: 2, edge: Edge::Off, deadline: 500 });
        assert_eq!(plan[7], Transition { channel: 1, edge: Edge::Off, deadline: 700 });
    }

    #[test]
    fn test_dual_slope_odd_width() {
        let widths = [101];
        let plan = collect(Policy::DualSlope, &widths);
        assert_eq!(plan[0].deadline, 450);
        assert_eq!(plan[1].deadline, 551);
    }

    #[test]
    fn test_single_slope_starts_together() {
        let widths = [300, 100, 200];
        let plan = collect(Policy::SingleSlope, &widths);
        assert_coverage(&plan, &widths);
        assert!(non_decreasing(&plan));
        assert!(plan[..3].iter().all(|t| t.edge == Edge::On && t.deadline == 0));

        let offs: Vec<_> = plan[3..].iter().map(|t| t.channel).collect();
        assert_eq!(offs, [1, 2, 0]);
    }

    #[test]
    fn test_sequential_slots() {
        let widths = [50, 100, 76];
        let policy = Policy::Sequential { between: 106 };
        // Order is ignored
        let order = [2, 0, 1];
        let plan: Vec<_> = policy.plan(PERIOD, &widths, &order).collect();
        assert_coverage(&plan, &widths);
        assert!(non_decreasing(&plan));

        assert_eq!(plan[0], Transition { channel: 0, edge: Edge::On, deadline: 28 });
        assert_eq!(plan[1], Transition { channel: 0, edge: Edge::Off, deadline: 78 });
        assert_eq!(plan[2], Transition { channel: 1, edge: Edge::On, deadline: 109 });
        assert_eq!(plan[3], Transition { channel: 1, edge: Edge::Off, deadline: 209 });
        assert_eq!(plan[4], Transition { channel: 2, edge: Edge::On, deadline: 227 });
    }

    #[test]
    fn test_plan_is_exact_size() {
        let widths = [1, 2, 3, 4];
        let order = sorted(&widths);
        let mut plan = Policy::DualSlope.plan(PERIOD, &widths, &order);
        assert_eq!(plan.len(), 8);
        plan.next();
        assert_eq!(plan.len(), 7);
    }

    #[test]
    fn test_last_deadline_bound() {
        assert_eq!(Policy::DualSlope.last_deadline_bound(PERIOD, 401, 4), 701);
        assert_eq!(Policy::SingleSlope.last_deadline_bound(PERIOD, 400, 4), 400);
        let sequential = Policy::Sequential { between: 106 };
        assert_eq!(sequential.last_deadline_bound(PERIOD, 100, 8), 7 * 106 + 53 - 50 + 100);
        assert!(!sequential.needs_sort());
        assert!(Policy::DualSlope.needs_sort());
    }

    fn any_policy() -> impl Strategy<Value = Policy> {
        prop_oneof![
            Just(Policy::DualSlope),
            Just(Policy::SingleSlope),
            Just(Policy::Sequential { between: 120 }),
        ]
    }

    proptest! {
        #[test]
        fn prop_deadlines_never_decrease(
            policy in any_policy(),
            widths in prop::array::uniform8(0u16..=120),
        ) {
            let plan = collect(policy, &widths);
            prop_assert!(non_decreasing(&plan), "{policy:?} {widths:?}");
            prop_assert!(plan.iter().all(|t| t.deadline < PERIOD));
        }

        #[test]
        fn prop_every_channel_covered(
            policy in any_policy(),
            widths in prop::array::uniform8(0u16..=120),
        ) {
            let plan = collect(policy, &widths);
            assert_coverage(&plan, &widths);
        }
    }
}
