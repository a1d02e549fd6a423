// SPDX-License-Identifier: MIT

//!
//! The calendar index: a dense, gapless mapping from calendar dates to
//! sequential day indices, and the permissive clamping used to resolve
//! requested dates against it
//!

use crate::CalendarDate;
use thiserror::Error;

/// Errors that can arise when building a [`CalendarRange`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// The start date is after the end date
    #[error("range start {start} is after range end {end}")]
    Reversed {
        start: CalendarDate,
        end: CalendarDate,
    },
}

/// An ordered, gapless run of days from `start` to `end` (inclusive).  The
/// first day has index `0` and every following day the next index.
///
/// A range is never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarRange {
    start: CalendarDate,
    end: CalendarDate,
}

impl CalendarRange {
    /// Build the range of days from `start` to `end` (inclusive)
    pub fn build(start: CalendarDate, end: CalendarDate) -> Result<Self, CalendarError> {
        if start > end {
            return Err(CalendarError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// The first day of the range
    pub fn start(&self) -> CalendarDate {
        self.start
    }

    /// The last day of the range
    pub fn end(&self) -> CalendarDate {
        self.end
    }

    /// The number of days in the range
    pub fn len(&self) -> usize {
        self.last_index() + 1
    }

    /// Always `false`: a range holds at least one day
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The index of the last day
    pub fn last_index(&self) -> usize {
        self.end.days_since(self.start) as usize
    }

    /// The index of `date`, if it is part of the range
    pub fn index_of(&self, date: CalendarDate) -> Option<usize> {
        let offset = date.days_since(self.start);
        (0..=self.last_index() as i64)
            .contains(&offset)
            .then_some(offset as usize)
    }

    /// The date at `index`, if the index is part of the range
    pub fn date_at(&self, index: usize) -> Option<CalendarDate> {
        if index > self.last_index() {
            return None;
        }
        self.start.add_days(index as i64)
    }

    /// The date at `index`, clamped to the last day of the range
    pub fn date_at_clamped(&self, index: usize) -> CalendarDate {
        self.date_at(index).unwrap_or(self.end)
    }

    /// Whether `date` is part of the range
    pub fn contains(&self, date: CalendarDate) -> bool {
        self.index_of(date).is_some()
    }

    /// Iterate over every `(date, index)` pair in order
    pub fn iter(&self) -> impl Iterator<Item = (CalendarDate, usize)> + '_ {
        let mut next = Some(self.start);
        (0..self.len()).map_while(move |index| {
            let date = next?;
            next = date.succ();
            Some((date, index))
        })
    }

    /// Resolve a requested date to an index, never failing.
    ///
    /// `upper` optionally limits the result (e.g. an entity's last day of
    /// data).  Dates inside the range resolve to their own index unless that
    /// is at or beyond the upper bound, in which case the upper bound's index
    /// is used.  Dates after the range resolve to the upper bound's index and
    /// dates before the range resolve to `0`.
    pub fn resolve_index(&self, date: CalendarDate, upper: Option<CalendarDate>) -> usize {
        let upper_index = self.upper_index(upper);
        match self.index_of(date) {
            Some(index) if index < upper_index => index,
            Some(_) => upper_index,
            None if date < self.start => 0,
            None => upper_index,
        }
    }

    /// Like [`CalendarRange::resolve_index`] but from user supplied text.  Text
    /// that isn't a date resolves to the upper bound's index.
    pub fn resolve_text(&self, text: &str, upper: Option<CalendarDate>) -> usize {
        match CalendarDate::parse(text) {
            Ok(date) => self.resolve_index(date, upper),
            Err(_) => self.upper_index(upper),
        }
    }

    /// The index the upper bound resolves to (the last index if there isn't
    /// one)
    fn upper_index(&self, upper: Option<CalendarDate>) -> usize {
        match upper {
            None => self.last_index(),
            Some(upper) if upper < self.start => 0,
            Some(upper) => self.index_of(upper).unwrap_or(self.last_index()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(text: &str) -> CalendarDate {
        CalendarDate::parse(text).unwrap()
    }

    fn range(start: &str, end: &str) -> CalendarRange {
        CalendarRange::build(date(start), date(end)).unwrap()
    }

    #[test]
    fn build_has_one_entry_per_day() {
        for (start, end) in [
            ("2020-01-01", "2020-01-01"),
            ("2020-01-01", "2020-01-05"),
            ("2020-02-27", "2020-03-02"),
            ("2019-12-30", "2021-01-02"),
        ] {
            let range = range(start, end);
            let expected = date(end).days_since(date(start)) as usize + 1;
            assert_eq!(range.len(), expected);

            let entries: Vec<_> = range.iter().collect();
            assert_eq!(entries.len(), expected);
            assert_eq!(entries.first().unwrap().0, date(start));
            assert_eq!(entries.last().unwrap().0, date(end));
            for pair in entries.windows(2) {
                assert_eq!(pair[1].1, pair[0].1 + 1);
                assert_eq!(pair[0].0.succ(), Some(pair[1].0));
            }
        }
    }

    #[test]
    fn build_rejects_reversed_bounds() {
        assert!(CalendarRange::build(date("2020-01-02"), date("2020-01-01")).is_err());
    }

    #[test]
    fn index_and_date_agree() {
        let range = range("2020-02-27", "2020-03-02");
        assert_eq!(range.index_of(date("2020-02-29")), Some(2));
        assert_eq!(range.date_at(2), Some(date("2020-02-29")));
        assert_eq!(range.index_of(date("2020-03-03")), None);
        assert_eq!(range.index_of(date("2020-02-26")), None);
        assert_eq!(range.date_at(5), None);
        assert_eq!(range.date_at_clamped(99), date("2020-03-02"));
    }

    #[test]
    fn resolve_within_range() {
        let range = range("2020-01-01", "2020-01-10");
        assert_eq!(range.resolve_index(date("2020-01-01"), None), 0);
        assert_eq!(range.resolve_index(date("2020-01-04"), None), 3);
        assert_eq!(range.resolve_index(date("2020-01-10"), None), 9);
    }

    #[test]
    fn resolve_clamps_to_upper_bound() {
        let range = range("2020-01-01", "2020-01-10");
        let upper = Some(date("2020-01-05"));
        assert_eq!(range.resolve_index(date("2020-01-03"), upper), 2);
        assert_eq!(range.resolve_index(date("2020-01-05"), upper), 4);

        // Every date after the upper bound resolves to it, never beyond
        for text in ["2020-01-06", "2020-01-10", "2020-01-11", "2024-06-01"] {
            assert_eq!(range.resolve_index(date(text), upper), 4);
        }
    }

    #[test]
    fn resolve_clamps_outside_range() {
        let range = range("2020-01-03", "2020-01-05");
        assert_eq!(range.resolve_index(date("2020-01-01"), None), 0);
        assert_eq!(range.resolve_index(date("2020-01-09"), None), 2);
    }

    #[test]
    fn resolve_text_never_fails() {
        let range = range("2020-01-01", "2020-01-10");
        assert_eq!(range.resolve_text("2020-01-02", None), 1);
        assert_eq!(range.resolve_text("not a date", None), 9);
        assert_eq!(range.resolve_text("", Some(date("2020-01-04"))), 3);
    }
}
