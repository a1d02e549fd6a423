// SPDX-License-Identifier: MIT

//!
//! *Part of the wider epiglobe project*
//!
//! This crate defines the data model behind the epiglobe globe: calendar
//! dates and the dense calendar index, the dataset document (entities, their
//! daily series and marker coordinates), and the resolution of a date and a
//! metric to the relative magnitude of every marker.
//!
//! It has no knowledge of rendering or animation; the `epiglobe-engine` crate
//! builds the playback engine on top of it.
//!

mod calendar;
mod chart;
mod dataset;
mod date;
mod entity;
mod format;
mod metric;
mod resolver;

pub use calendar::*;
pub use chart::*;
pub use dataset::{Dataset, DatasetError, MetricBounds};
pub use date::*;
pub use entity::*;
pub use format::*;
pub use metric::*;
pub use resolver::*;

use thiserror::Error;

/// Errors that can be returned by epiglobe
#[derive(Error, Debug)]
pub enum EpiGlobeError {
    #[error(transparent)]
    Date(#[from] DateError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Metric(#[from] MetricError),

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
