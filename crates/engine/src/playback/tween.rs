// SPDX-License-Identifier: MIT

//!
//! Linear interpolation of every marker's magnitude over a fixed duration
//!

/// Where each magnitude starts and ends, and when
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tween {
    started_at: f64,
    duration: f64,
    from: Vec<f64>,
    to: Vec<f64>,
}

impl Tween {
    /// `from` and `to` should have one value per marker.  Missing `from` values
    /// start at `0`.
    pub fn new(started_at: f64, duration: f64, mut from: Vec<f64>, to: Vec<f64>) -> Self {
        from.resize(to.len(), 0.0);
        Self {
            started_at,
            duration,
            from,
            to,
        }
    }

    /// Fraction of the duration elapsed at `now`, in `[0, 1]`
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0)
    }

    /// Magnitude `index` at progress `t`.  Exactly the target value once
    /// finished.
    pub fn value(&self, index: usize, t: f64) -> f64 {
        let to = self.to.get(index).copied().unwrap_or(0.0);
        if t >= 1.0 {
            return to;
        }
        let from = self.from.get(index).copied().unwrap_or(0.0);
        from + (to - from) * t
    }

    pub fn len(&self) -> usize {
        self.to.len()
    }
}
