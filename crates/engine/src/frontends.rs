// SPDX-License-Identifier: MIT

//!
//! Frontends that host the playback engine
//!

pub mod web;
