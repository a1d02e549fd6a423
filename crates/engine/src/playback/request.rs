// SPDX-License-Identifier: MIT

//!
//! Date requests made by the slider, the date input and the play button
//!

use epiglobe_core::{CalendarDate, CalendarRange};
use serde::{Deserialize, Serialize};

/// A request to show a date, and where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "source", content = "value")]
pub enum SeekRequest {
    /// A slider position (day index)
    Slider(usize),

    /// Whatever was typed in the date input
    TextInput(String),

    /// The latest day with data
    Latest,
}

impl SeekRequest {
    /// The date this request resolves to.  Never fails: out of range indexes
    /// and dates are clamped, and unparseable text gives the last day.
    pub fn resolve(&self, range: &CalendarRange) -> CalendarDate {
        match self {
            Self::Slider(index) => range.date_at_clamped(*index),
            Self::TextInput(text) => range.date_at_clamped(range.resolve_text(text, None)),
            Self::Latest => range.end(),
        }
    }
}
