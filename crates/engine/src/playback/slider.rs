// SPDX-License-Identifier: MIT

//!
//! Keeps the slider and date input in step with elapsed animation time
//!

/// Turns elapsed-time fractions into slider positions.
///
/// The distance between the two day indexes is split into steps of
/// `ceil(distance / ticks)` days.  Positions only ever move towards the
/// target, by at most one step per call, and never past the target; the
/// target itself is only reached via [`SliderStepper::finish`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SliderStepper {
    from: usize,
    to: usize,
    step: usize,
    position: usize,
}

impl SliderStepper {
    /// Step from index `from` to index `to` over about `ticks` ticks
    pub fn new(from: usize, to: usize, ticks: f64) -> Self {
        let distance = from.abs_diff(to);
        let ticks = if ticks.is_finite() { ticks.max(1.0) } else { 1.0 };
        let step = ((distance as f64) / ticks).ceil().max(1.0) as usize;
        Self {
            from,
            to,
            step,
            position: from,
        }
    }

    /// The position for the elapsed fraction `t`, if it differs from the last
    /// one
    pub fn advance(&mut self, t: f64) -> Option<usize> {
        let distance = self.from.abs_diff(self.to);
        let travelled = ((distance as f64) * t.clamp(0.0, 1.0)).floor() as usize;
        // Strictly short of the target until finished
        let travelled = travelled.min(distance.saturating_sub(1));

        let next = if self.to >= self.from {
            let wanted = self.from + travelled;
            wanted.min(self.position + self.step).max(self.position)
        } else {
            let wanted = self.from - travelled;
            wanted.max(self.position.saturating_sub(self.step)).min(self.position)
        };

        if next == self.position {
            return None;
        }
        self.position = next;
        Some(next)
    }

    /// Jump to the target, returning it
    pub fn finish(&mut self) -> usize {
        self.position = self.to;
        self.to
    }

    /// The last position handed out
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn step(&self) -> usize {
        self.step
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Positions published for each tick of a 40ms cadence animation
    fn run(from: usize, to: usize, duration: f64) -> Vec<usize> {
        let ticks = duration / 40.0;
        let mut stepper = SliderStepper::new(from, to, ticks);
        let mut published = Vec::new();
        let mut tick = 1.0;
        loop {
            let t = (tick * 40.0 / duration).min(1.0);
            if t >= 1.0 {
                published.push(stepper.finish());
                break;
            }
            if let Some(position) = stepper.advance(t) {
                published.push(position);
            }
            tick += 1.0;
        }
        published
    }

    #[test]
    fn forward_by_single_days() {
        let published = run(10, 20, 1000.0);
        assert_eq!(published, (11..=20).collect::<Vec<usize>>());
    }

    #[test]
    fn backward_by_single_days() {
        let published = run(20, 10, 1000.0);
        assert_eq!(published, (10..=19).rev().collect::<Vec<usize>>());
    }

    #[test]
    fn long_distances_use_bigger_steps() {
        // 300 days over 25 ticks
        let stepper = SliderStepper::new(0, 300, 25.0);
        assert_eq!(stepper.step(), 12);

        let published = run(0, 300, 1000.0);
        let (last, ticked) = published.split_last().unwrap();
        assert!(ticked.windows(2).all(|w| w[0] < w[1] && w[1] - w[0] <= 12));
        assert!(ticked.iter().all(|position| *position < 300));
        assert_eq!(*last, 300);
    }

    #[test]
    fn never_passes_the_target_before_finishing() {
        let mut stepper = SliderStepper::new(0, 3, 2.0);
        assert_eq!(stepper.advance(0.99), Some(2));
        assert_eq!(stepper.advance(1.0), None);
        assert_eq!(stepper.position(), 2);
        assert_eq!(stepper.finish(), 3);
    }

    #[test]
    fn nothing_to_do_for_the_same_index() {
        let mut stepper = SliderStepper::new(5, 5, 25.0);
        assert_eq!(stepper.advance(0.5), None);
        assert_eq!(stepper.finish(), 5);
    }

    #[test]
    fn rate_limited_per_call() {
        // Only one step allowed per call even if time jumps ahead
        let mut stepper = SliderStepper::new(0, 10, 10.0);
        assert_eq!(stepper.advance(0.9), Some(1));
        assert_eq!(stepper.advance(0.9), Some(2));
    }
}
