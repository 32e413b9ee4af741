// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keys, scale types and scales.
//!
//! A [`Scale`] is the pairing of a [`Key`] and a [`ScaleType`]. It derives the
//! ordered pitch list shown on the pitch pads and the harmonic fields shown on
//! the chord pads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::chord::{HarmonicField, HarmonicFieldKind};
use super::pitch::{Octave, Pitch};
use crate::error::{Error, Result};

/// Semitone offset type
pub type Semitones = i8;

/// The twelve pitch classes. Accidentals are named as sharps; how they are
/// shown is up to the [`Spelling`] of the key in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Note {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl Note {
    pub const ALL: [Note; 12] = [
        Note::C,
        Note::Cs,
        Note::D,
        Note::Ds,
        Note::E,
        Note::F,
        Note::Fs,
        Note::G,
        Note::Gs,
        Note::A,
        Note::As,
        Note::B,
    ];

    /// Semitones above C, 0..=11
    pub fn pitch_class(self) -> u8 {
        self as u8
    }

    /// Wraps any value into the octave
    pub fn from_pitch_class(pc: u8) -> Self {
        Self::ALL[usize::from(pc % 12)]
    }

    pub fn transpose(self, semitones: Semitones) -> Self {
        let shifted = (i16::from(self.pitch_class()) + i16::from(semitones)).rem_euclid(12);
        Self::from_pitch_class(shifted as u8)
    }

    /// Name of this note under the given spelling
    pub fn name(self, spelling: Spelling) -> &'static str {
        const SHARPS: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
        const FLATS: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];
        let names = match spelling {
            Spelling::Sharps => &SHARPS,
            Spelling::Flats => &FLATS,
        };
        names[usize::from(self.pitch_class())]
    }
}

impl FromStr for Note {
    type Err = Error;

    /// Accepts a letter with an optional `#`, `s` or `b` accidental
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let natural = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => Note::C,
            Some('D') => Note::D,
            Some('E') => Note::E,
            Some('F') => Note::F,
            Some('G') => Note::G,
            Some('A') => Note::A,
            Some('B') => Note::B,
            _ => return Err(Error::UnknownKey(s.to_string())),
        };
        let shift = match chars.as_str() {
            "" => 0,
            "#" | "s" | "S" => 1,
            "b" | "B" => -1,
            _ => return Err(Error::UnknownKey(s.to_string())),
        };
        Ok(natural.transpose(shift))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name(Spelling::Sharps))
    }
}

/// Enharmonic spelling preference for accidentals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spelling {
    #[default]
    Sharps,
    Flats,
}

impl Spelling {
    pub fn toggled(self) -> Self {
        match self {
            Spelling::Sharps => Spelling::Flats,
            Spelling::Flats => Spelling::Sharps,
        }
    }
}

impl FromStr for Spelling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sharps" | "sharp" | "#" => Ok(Spelling::Sharps),
            "flats" | "flat" | "b" => Ok(Spelling::Flats),
            _ => Err(Error::UnknownSpelling(s.to_string())),
        }
    }
}

impl fmt::Display for Spelling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spelling::Sharps => write!(f, "sharps"),
            Spelling::Flats => write!(f, "flats"),
        }
    }
}

/// A pitch class together with the spelling used to name it.
///
/// Two keys are equal only when both the pitch class and the spelling match,
/// so `Key::new(Note::As, Spelling::Flats)` (Bb) differs from its sharp twin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    note: Note,
    spelling: Spelling,
}

impl Key {
    pub const fn new(note: Note, spelling: Spelling) -> Self {
        Self { note, spelling }
    }

    /// The 12 keys in chromatic order, named with `spelling`
    pub fn all(spelling: Spelling) -> [Key; 12] {
        Note::ALL.map(|note| Key::new(note, spelling))
    }

    pub fn note(&self) -> Note {
        self.note
    }

    pub fn spelling(&self) -> Spelling {
        self.spelling
    }

    pub fn pitch_class(&self) -> u8 {
        self.note.pitch_class()
    }

    /// Same pitch class, different spelling
    pub fn with_spelling(self, spelling: Spelling) -> Self {
        Key::new(self.note, spelling)
    }

    /// Transpose by semitones, keeping the spelling
    pub fn transpose(self, semitones: Semitones) -> Self {
        Key::new(self.note.transpose(semitones), self.spelling)
    }

    pub fn name(&self) -> &'static str {
        self.note.name(self.spelling)
    }
}

impl FromStr for Key {
    type Err = Error;

    /// Parses "C", "F#", "Bb", ... A flat name yields the flat spelling.
    fn from_str(s: &str) -> Result<Self> {
        let note: Note = s.parse()?;
        let accidental = s.trim().chars().nth(1);
        let spelling = match accidental {
            Some('b') | Some('B') => Spelling::Flats,
            _ => Spelling::Sharps,
        };
        Ok(Key::new(note, spelling))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The scale shapes a pad layout can be built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    Major,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    NaturalMinor,
    Locrian,
    HarmonicMinor,
    MelodicMinor,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
    MajorBlues,
    WholeTone,
    /// Half step first
    Diminished,
    /// Whole step first
    DiminishedWH,
    Chromatic,
}

impl ScaleType {
    /// Every scale type, in picker order
    pub const ALL: [ScaleType; 17] = [
        ScaleType::Major,
        ScaleType::Dorian,
        ScaleType::Phrygian,
        ScaleType::Lydian,
        ScaleType::Mixolydian,
        ScaleType::NaturalMinor,
        ScaleType::Locrian,
        ScaleType::HarmonicMinor,
        ScaleType::MelodicMinor,
        ScaleType::MajorPentatonic,
        ScaleType::MinorPentatonic,
        ScaleType::Blues,
        ScaleType::MajorBlues,
        ScaleType::WholeTone,
        ScaleType::Diminished,
        ScaleType::DiminishedWH,
        ScaleType::Chromatic,
    ];

    /// Display name and semitone offsets from the root
    fn profile(self) -> (&'static str, &'static [u8]) {
        use ScaleType::*;
        match self {
            Major => ("Major", &[0, 2, 4, 5, 7, 9, 11]),
            Dorian => ("Dorian", &[0, 2, 3, 5, 7, 9, 10]),
            Phrygian => ("Phrygian", &[0, 1, 3, 5, 7, 8, 10]),
            Lydian => ("Lydian", &[0, 2, 4, 6, 7, 9, 11]),
            Mixolydian => ("Mixolydian", &[0, 2, 4, 5, 7, 9, 10]),
            NaturalMinor => ("Natural Minor", &[0, 2, 3, 5, 7, 8, 10]),
            Locrian => ("Locrian", &[0, 1, 3, 5, 6, 8, 10]),
            HarmonicMinor => ("Harmonic Minor", &[0, 2, 3, 5, 7, 8, 11]),
            MelodicMinor => ("Melodic Minor", &[0, 2, 3, 5, 7, 9, 11]),
            MajorPentatonic => ("Major Pentatonic", &[0, 2, 4, 7, 9]),
            MinorPentatonic => ("Minor Pentatonic", &[0, 3, 5, 7, 10]),
            Blues => ("Blues", &[0, 3, 5, 6, 7, 10]),
            MajorBlues => ("Major Blues", &[0, 2, 3, 4, 7, 9]),
            WholeTone => ("Whole Tone", &[0, 2, 4, 6, 8, 10]),
            Diminished => ("Diminished", &[0, 1, 3, 4, 6, 7, 9, 10]),
            DiminishedWH => ("Diminished (W-H)", &[0, 2, 3, 5, 6, 8, 9, 11]),
            Chromatic => ("Chromatic", &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
        }
    }

    /// Ascending semitone offsets from the root, starting at 0
    pub fn intervals(self) -> &'static [u8] {
        self.profile().1
    }

    /// Number of degrees in one octave of this scale
    pub fn degree_count(self) -> usize {
        self.intervals().len()
    }

    pub fn name(self) -> &'static str {
        self.profile().0
    }

    fn step(self, by: usize) -> Self {
        let count = Self::ALL.len();
        let index = Self::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Self::ALL[(index + by) % count]
    }

    /// Next scale type in picker order, wrapping around
    pub fn next(self) -> Self {
        self.step(1)
    }

    /// Previous scale type in picker order, wrapping around
    pub fn previous(self) -> Self {
        self.step(Self::ALL.len() - 1)
    }
}

impl FromStr for ScaleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace([' ', '-', '_', '(', ')'], "");
        match normalized.as_str() {
            "major" | "ionian" => Ok(ScaleType::Major),
            "dorian" => Ok(ScaleType::Dorian),
            "phrygian" => Ok(ScaleType::Phrygian),
            "lydian" => Ok(ScaleType::Lydian),
            "mixolydian" => Ok(ScaleType::Mixolydian),
            "minor" | "naturalminor" | "aeolian" => Ok(ScaleType::NaturalMinor),
            "locrian" => Ok(ScaleType::Locrian),
            "harmonicminor" => Ok(ScaleType::HarmonicMinor),
            "melodicminor" => Ok(ScaleType::MelodicMinor),
            "majorpentatonic" | "pentatonicmajor" => Ok(ScaleType::MajorPentatonic),
            "minorpentatonic" | "pentatonicminor" | "pentatonic" => Ok(ScaleType::MinorPentatonic),
            "blues" | "minorblues" => Ok(ScaleType::Blues),
            "majorblues" => Ok(ScaleType::MajorBlues),
            "wholetone" => Ok(ScaleType::WholeTone),
            "diminished" | "octatonic" | "halfwhole" => Ok(ScaleType::Diminished),
            "diminishedwh" | "wholehalf" => Ok(ScaleType::DiminishedWH),
            "chromatic" => Ok(ScaleType::Chromatic),
            _ => Err(Error::UnknownScaleType(s.to_string())),
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A key paired with a scale type, with its degrees spelled out
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    key: Key,
    scale_type: ScaleType,
    degrees: Vec<Key>,
}

impl Scale {
    pub fn new(key: Key, scale_type: ScaleType) -> Self {
        let degrees = scale_type
            .intervals()
            .iter()
            .map(|&offset| key.transpose(offset as Semitones))
            .collect();
        Self {
            key,
            scale_type,
            degrees,
        }
    }

    /// Build from user-facing names such as `("Bb", "dorian")`
    pub fn parse(key: &str, scale_type: &str) -> Result<Self> {
        Ok(Self::new(key.parse()?, scale_type.parse()?))
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    pub fn intervals(&self) -> &'static [u8] {
        self.scale_type.intervals()
    }

    /// One key per degree, spelled like the scale's own key
    pub fn keys(&self) -> &[Key] {
        &self.degrees
    }

    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }

    /// Whether `note` is one of the scale's degrees, regardless of spelling
    pub fn contains(&self, note: Note) -> bool {
        self.degrees.iter().any(|k| k.note() == note)
    }

    /// Pitches of every degree, for each octave in the order given.
    ///
    /// Each octave is anchored at the root: degrees that climb past B keep
    /// ascending into the next octave number, so ascending `octaves` input
    /// yields a non-decreasing pitch sequence.
    pub fn pitches(&self, octaves: &[Octave]) -> Vec<Pitch> {
        let mut pitches = Vec::with_capacity(octaves.len() * self.len());
        for &octave in octaves {
            let root = Pitch::new(self.key, octave);
            pitches.extend(self.intervals().iter().map(|&i| root.transpose(i as i32)));
        }
        pitches
    }

    /// One optional chord per degree, built by stacking scale thirds
    pub fn harmonic_field(&self, kind: HarmonicFieldKind) -> HarmonicField {
        HarmonicField::build(self, kind)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.scale_type)
    }
}
