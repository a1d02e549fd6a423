// SPDX-License-Identifier: MIT

//!
//! The clock and tick scheduling used to drive animations.  The browser
//! frontend provides a timer backed implementation; [`ManualScheduler`] is a
//! fake clock for headless use and tests.
//!

use log::warn;
use std::cell::Cell;
use std::rc::Rc;

/// Give up driving a [`ManualScheduler`] after this many ticks
const MAX_DRIVEN_TICKS: usize = 1_000_000;

/// Supplies the time and arranges for the engine's `tick()` to be called
pub trait Scheduler {
    /// Milliseconds since some fixed point
    fn now(&self) -> f64;

    /// Arrange for one call of the engine's `tick()` after `delay_ms`
    fn schedule_next_tick(&self, delay_ms: f64);
}

impl<T: Scheduler + ?Sized> Scheduler for Rc<T> {
    fn now(&self) -> f64 {
        (**self).now()
    }

    fn schedule_next_tick(&self, delay_ms: f64) {
        (**self).schedule_next_tick(delay_ms)
    }
}

/// A clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Cell<f64>,

    /// When the requested tick is due (if one is pending)
    pending: Cell<Option<f64>>,

    /// How many ticks have been requested in total
    requests: Cell<usize>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set_now(&self, ms: f64) {
        self.now.set(ms);
    }

    /// Remove the pending tick, returning when it was due
    pub fn take_pending(&self) -> Option<f64> {
        self.pending.take()
    }

    pub fn is_tick_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    pub fn request_count(&self) -> usize {
        self.requests.get()
    }

    /// Run `tick` for every pending tick, moving the clock to each tick's due
    /// time, until nothing more is scheduled.  Returns the number of ticks run.
    pub fn drive<F: FnMut()>(&self, mut tick: F) -> usize {
        let mut ticks = 0;
        while let Some(due) = self.take_pending() {
            if due > self.now.get() {
                self.now.set(due);
            }
            tick();
            ticks += 1;
            if ticks >= MAX_DRIVEN_TICKS {
                warn!("stopped driving the manual scheduler after {ticks} ticks");
                break;
            }
        }
        ticks
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn schedule_next_tick(&self, delay_ms: f64) {
        self.requests.set(self.requests.get() + 1);
        self.pending.set(Some(self.now.get() + delay_ms.max(0.0)));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualScheduler::new();
        assert_eq!(clock.now(), 0.0);
        clock.advance(40.0);
        clock.advance(2.5);
        assert_eq!(clock.now(), 42.5);
        clock.set_now(1000.0);
        assert_eq!(clock.now(), 1000.0);
    }

    #[test]
    fn schedule_and_take() {
        let clock = ManualScheduler::new();
        assert!(!clock.is_tick_pending());
        clock.advance(10.0);
        clock.schedule_next_tick(40.0);
        assert!(clock.is_tick_pending());
        assert_eq!(clock.take_pending(), Some(50.0));
        assert_eq!(clock.take_pending(), None);
        assert_eq!(clock.request_count(), 1);
    }

    #[test]
    fn drive_runs_until_nothing_is_scheduled() {
        let clock = Rc::new(ManualScheduler::new());
        let seen = RefCell::new(Vec::new());

        clock.schedule_next_tick(40.0);
        let ticks = clock.drive(|| {
            seen.borrow_mut().push(clock.now());
            if seen.borrow().len() < 3 {
                clock.schedule_next_tick(40.0);
            }
        });

        assert_eq!(ticks, 3);
        assert_eq!(*seen.borrow(), vec![40.0, 80.0, 120.0]);
        assert!(!clock.is_tick_pending());
    }
}
