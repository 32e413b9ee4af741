// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory engine.
//!
//! Keys, scale types, pitches and chords. Everything here is a pure function
//! of its inputs; nothing touches MIDI.

pub mod chord;
pub mod pitch;
pub mod scale;

pub use chord::{Alteration, Chord, ChordQuality, Extensions, HarmonicField, HarmonicFieldKind};
pub use pitch::{MidiNote, Octave, Pitch, MAX_MIDI_NOTE, MAX_OCTAVE, MIN_OCTAVE};
pub use scale::{Key, Note, Scale, ScaleType, Semitones, Spelling};
