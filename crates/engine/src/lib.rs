// SPDX-License-Identifier: MIT

//!
//! *Part of the wider epiglobe project*
//!
//! This crate animates the epiglobe globe.  It can be compiled for native use
//! as well as to WASM for use in the browser.
//!
//! The core of the crate is a platform independent playback engine
//! responsible for:
//!
//! - Owning the marker instance buffers (one transform and colour per marker)
//! - Animating the markers between dates and metrics, writing only what changes
//! - Keeping the slider, date input, totals and chart in step
//! - Handling hover highlighting
//!
//! Components talk over an [`EventBus`] and get their time from a
//! [`Scheduler`], so everything can be driven headless with a
//! [`ManualScheduler`].
//!
//! ## Usage
//!
//! To use in the browser, compile to WASM:
//!
//! ```sh
//! wasm-pack build --target web
//! ```
//!
//! and construct an `EpiGlobe` with the dataset JSON.
//!

mod bus;
mod chart;
mod colour;
mod config;
mod field;
mod playback;
mod scheduler;

pub mod frontends;

#[cfg(test)]
mod fixtures;

pub use bus::*;
pub use chart::*;
pub use colour::*;
pub use config::*;
pub use field::*;
pub use frontends::web::EpiGlobe;
pub use playback::*;
pub use scheduler::*;

use epiglobe_core::DatasetError;
use thiserror::Error;

/// Errors that can occur setting up the engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bus(#[from] BusError),
}
