//! Eyelid main loop
//!
//! Waits for the button, flips the lid, then writes a new duty for every
//! distinguishable tick of the slow counter until the motion completes.
//! The button is only read between motions.

use systole_hal::{DutyRegister, ExtendedCounter, InputPin};

use super::machine::{Eyelid, LidState};
use crate::clock::wait_for_change;
use crate::config::EaseTiming;

/// Button, servo duty register and slow counter around an [`Eyelid`]
pub struct EyelidDriver<I, D, C> {
    /// Active-low push button with pull-up
    button: I,
    duty: D,
    counter: C,
    lid: Eyelid,
}

impl<I, D, C> EyelidDriver<I, D, C>
where
    I: InputPin,
    D: DutyRegister,
    C: ExtendedCounter,
{
    /// Take the hardware and park the lid in its closed rest position
    pub fn new(button: I, mut duty: D, counter: C, timing: &EaseTiming) -> Self {
        let lid = Eyelid::new(timing);
        duty.set_duty(lid.duty(counter.count()));
        Self {
            button,
            duty,
            counter,
            lid,
        }
    }

    pub fn lid(&self) -> &Eyelid {
        &self.lid
    }

    /// Spin until the button reads pressed
    pub fn wait_for_press(&mut self) {
        while !self.button.is_low() {}
    }

    /// Write the eased duty once per counter tick until the motion is done
    pub fn run_motion(&mut self, start: u32) {
        let mut now = start;
        loop {
            self.duty.set_duty(self.lid.duty(now));
            if self.lid.is_complete(now) {
                return;
            }
            now = wait_for_change(&self.counter, now);
        }
    }

    /// One press and the motion it starts
    ///
    /// Returns the state the lid moved to.
    pub fn step(&mut self) -> LidState {
        self.wait_for_press();
        let now = self.counter.count();
        self.lid.sample(true, now);
        self.run_motion(now);
        self.lid.state()
    }

    /// Run forever, calling `on_flip` after each completed motion
    pub fn run<F>(mut self, mut on_flip: F) -> !
    where
        F: FnMut(LidState),
    {
        loop {
            let state = self.step();
            on_flip(state);
        }
    }
}
