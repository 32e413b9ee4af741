// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Progression - a touch-pad MIDI controller.
//!
//! Pick a key and a scale; the pads then play the scale's pitches across a
//! range of octaves and the chords of its harmonic fields.

pub mod config;
pub mod control;
pub mod error;
pub mod midi;
pub mod music;
pub mod ui;

pub use error::{Error, Result};
