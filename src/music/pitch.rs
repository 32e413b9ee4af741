// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Concrete pitches and their MIDI note numbers.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::scale::{Key, Note, Spelling};
use crate::error::{Error, Result};

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Octave number, MIDI convention (middle C = C4 = 60)
pub type Octave = i8;

/// Highest valid MIDI note number
pub const MAX_MIDI_NOTE: MidiNote = 127;

/// Octaves that contain at least one valid MIDI note
pub const MIN_OCTAVE: Octave = -1;
pub const MAX_OCTAVE: Octave = 9;

/// A spelled pitch class in a specific octave.
///
/// The octave is stored wide so transposing far past the MIDI range keeps the
/// true height; only [`Pitch::midi_note`] enforces the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    key: Key,
    octave: i32,
}

impl Pitch {
    pub const fn new(key: Key, octave: Octave) -> Self {
        Self {
            key,
            octave: octave as i32,
        }
    }

    /// Build a pitch from an absolute semitone count (C-1 = 0)
    pub fn from_semitones(semitones: i32, spelling: Spelling) -> Self {
        let note = Note::from_pitch_class(semitones.rem_euclid(12) as u8);
        Self {
            key: Key::new(note, spelling),
            octave: semitones.div_euclid(12) - 1,
        }
    }

    /// Pitch for a MIDI note number, named with `spelling`
    pub fn from_midi_note(note: MidiNote, spelling: Spelling) -> Self {
        Self::from_semitones(note as i32, spelling)
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn note(&self) -> Note {
        self.key.note()
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    /// Absolute height in semitones, C-1 = 0. Unbounded, unlike [`Pitch::midi_note`].
    pub fn semitones(&self) -> i32 {
        (self.octave + 1) * 12 + self.key.pitch_class() as i32
    }

    /// The MIDI note number for this pitch.
    ///
    /// Pitches outside C-1..=G9 are rejected rather than wrapped or clamped.
    pub fn midi_note(&self) -> Result<MidiNote> {
        let semitones = self.semitones();
        if (0..=MAX_MIDI_NOTE as i32).contains(&semitones) {
            Ok(semitones as MidiNote)
        } else {
            Err(Error::PitchOutOfRange {
                pitch: *self,
                note_number: semitones,
            })
        }
    }

    /// Move by `semitones`, keeping this pitch's spelling
    pub fn transpose(&self, semitones: i32) -> Self {
        Self::from_semitones(self.semitones() + semitones, self.key.spelling())
    }

    /// Signed distance in semitones from `other` up to `self`
    pub fn interval_from(&self, other: &Pitch) -> i32 {
        self.semitones() - other.semitones()
    }
}

impl PartialOrd for Pitch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pitch {
    /// Orders by height; enharmonic twins are tie-broken by spelling
    fn cmp(&self, other: &Self) -> Ordering {
        self.semitones()
            .cmp(&other.semitones())
            .then_with(|| (self.key.spelling() as u8).cmp(&(other.key.spelling() as u8)))
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.key, self.octave)
    }
}
