// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chords and harmonic fields.
//!
//! A harmonic field holds one chord per scale degree, built by stacking the
//! scale's own thirds on that degree. Degrees whose stacked tones do not form a
//! recognized chord are kept as explicit `None` slots.
//!
//! Fields past the seventh read the first four tones as a [`ChordQuality`] and
//! the tones above them as [`Extensions`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::pitch::{Octave, Pitch};
use super::scale::{Key, Scale};
use crate::error::{Error, Result};

/// Recognized chord shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    // Triads
    Major,
    Minor,
    Diminished,
    Augmented,
    Sus2,
    Sus4,

    // Sevenths
    MajorSeventh,
    DominantSeventh,
    MinorSeventh,
    HalfDiminished,
    DiminishedSeventh,
    MinorMajorSeventh,
    AugmentedMajorSeventh,
    SeventhSus4,
}

impl ChordQuality {
    pub const TRIADS: [ChordQuality; 6] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Sus2,
        ChordQuality::Sus4,
    ];

    pub const SEVENTHS: [ChordQuality; 8] = [
        ChordQuality::MajorSeventh,
        ChordQuality::DominantSeventh,
        ChordQuality::MinorSeventh,
        ChordQuality::HalfDiminished,
        ChordQuality::DiminishedSeventh,
        ChordQuality::MinorMajorSeventh,
        ChordQuality::AugmentedMajorSeventh,
        ChordQuality::SeventhSus4,
    ];

    /// Semitone offsets from the root, ascending
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Sus2 => &[0, 2, 7],
            ChordQuality::Sus4 => &[0, 5, 7],
            ChordQuality::MajorSeventh => &[0, 4, 7, 11],
            ChordQuality::DominantSeventh => &[0, 4, 7, 10],
            ChordQuality::MinorSeventh => &[0, 3, 7, 10],
            ChordQuality::HalfDiminished => &[0, 3, 6, 10],
            ChordQuality::DiminishedSeventh => &[0, 3, 6, 9],
            ChordQuality::MinorMajorSeventh => &[0, 3, 7, 11],
            ChordQuality::AugmentedMajorSeventh => &[0, 4, 8, 11],
            ChordQuality::SeventhSus4 => &[0, 5, 7, 10],
        }
    }

    /// Suffix appended to the root name (e.g. "m7b5")
    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::MajorSeventh => "maj7",
            ChordQuality::DominantSeventh => "7",
            ChordQuality::MinorSeventh => "m7",
            ChordQuality::HalfDiminished => "m7b5",
            ChordQuality::DiminishedSeventh => "dim7",
            ChordQuality::MinorMajorSeventh => "mMaj7",
            ChordQuality::AugmentedMajorSeventh => "maj7#5",
            ChordQuality::SeventhSus4 => "7sus4",
        }
    }

    /// Find the quality whose offsets match exactly
    pub fn identify(offsets: &[u8]) -> Option<Self> {
        Self::TRIADS
            .iter()
            .chain(Self::SEVENTHS.iter())
            .copied()
            .find(|q| q.intervals() == offsets)
    }
}

/// How an upper extension sits against its natural size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alteration {
    Flat,
    Natural,
    Sharp,
}

impl Alteration {
    fn shift(self) -> i8 {
        match self {
            Alteration::Flat => -1,
            Alteration::Natural => 0,
            Alteration::Sharp => 1,
        }
    }

    fn accidental(self) -> &'static str {
        match self {
            Alteration::Flat => "b",
            Alteration::Natural => "",
            Alteration::Sharp => "#",
        }
    }
}

/// Chord number and natural offset from the root of each extension
const EXTENSION_DEGREES: [(u8, u8); 3] = [(9, 14), (11, 17), (13, 21)];

/// Ninth, eleventh and thirteenth stacked on a seventh chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Extensions {
    pub ninth: Option<Alteration>,
    pub eleventh: Option<Alteration>,
    pub thirteenth: Option<Alteration>,
}

impl Extensions {
    pub const NONE: Extensions = Extensions {
        ninth: None,
        eleventh: None,
        thirteenth: None,
    };

    /// Read the offsets stacked above a seventh, lowest first.
    ///
    /// A flat eleventh or sharp thirteenth would double the third or the
    /// seventh, so those stacks are not chords.
    pub fn identify(offsets: &[u8]) -> Option<Self> {
        let mut slots = [None; 3];
        if offsets.len() > slots.len() {
            return None;
        }
        for (i, &offset) in offsets.iter().enumerate() {
            slots[i] = Some(match (i, offset) {
                (0, 13) | (2, 20) => Alteration::Flat,
                (0, 14) | (1, 17) | (2, 21) => Alteration::Natural,
                (0, 15) | (1, 18) => Alteration::Sharp,
                _ => return None,
            });
        }
        let [ninth, eleventh, thirteenth] = slots;
        Some(Self {
            ninth,
            eleventh,
            thirteenth,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    fn slots(&self) -> [Option<Alteration>; 3] {
        [self.ninth, self.eleventh, self.thirteenth]
    }

    /// Semitone offsets from the root, ascending
    pub fn offsets(&self) -> impl Iterator<Item = u8> {
        self.slots()
            .into_iter()
            .zip(EXTENSION_DEGREES)
            .filter_map(|(slot, (_, natural))| {
                slot.map(|alteration| natural.saturating_add_signed(alteration.shift()))
            })
    }

    /// Chord symbol suffix on top of `base`.
    ///
    /// The highest natural extension takes the place of the 7 (`m7` to `m11`);
    /// altered ones follow in order (`m7b5` to `m7b5b9`).
    fn suffix(&self, base: &str) -> String {
        let slots = self.slots();
        let highest_natural = slots
            .iter()
            .zip(EXTENSION_DEGREES)
            .filter(|(slot, _)| **slot == Some(Alteration::Natural))
            .map(|(_, (number, _))| number)
            .last();

        let mut suffix = match highest_natural {
            Some(number) => base.replacen('7', &number.to_string(), 1),
            None => base.to_string(),
        };
        for (slot, (number, _)) in slots.iter().zip(EXTENSION_DEGREES) {
            if let Some(alteration @ (Alteration::Flat | Alteration::Sharp)) = slot {
                suffix.push_str(alteration.accidental());
                suffix.push_str(&number.to_string());
            }
        }
        suffix
    }
}

/// A root, a base shape and any upper extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chord {
    root: Key,
    quality: ChordQuality,
    #[serde(default)]
    extensions: Extensions,
}

impl Chord {
    pub const fn new(root: Key, quality: ChordQuality) -> Self {
        Self {
            root,
            quality,
            extensions: Extensions::NONE,
        }
    }

    pub const fn with_extensions(self, extensions: Extensions) -> Self {
        Self { extensions, ..self }
    }

    pub fn root(&self) -> Key {
        self.root
    }

    pub fn quality(&self) -> ChordQuality {
        self.quality
    }

    pub fn extensions(&self) -> Extensions {
        self.extensions
    }

    /// Semitone offsets of the chord tones from the root, ascending
    pub fn intervals(&self) -> Vec<u8> {
        self.quality
            .intervals()
            .iter()
            .copied()
            .chain(self.extensions.offsets())
            .collect()
    }

    /// Number of tones in the chord
    pub fn len(&self) -> usize {
        self.intervals().len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals().is_empty()
    }

    /// Root-position pitches with the root at `octave`.
    ///
    /// Upper tones land in the same or a later octave; there is no voicing
    /// or inversion.
    pub fn pitches(&self, octave: Octave) -> Vec<Pitch> {
        let root = Pitch::new(self.root, octave);
        self.intervals()
            .iter()
            .map(|&offset| root.transpose(offset as i32))
            .collect()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.extensions.suffix(self.quality.suffix()))
    }
}

/// Which chord size a harmonic field stacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonicFieldKind {
    Triad,
    Seventh,
    Ninth,
    Eleventh,
    Thirteenth,
}

impl HarmonicFieldKind {
    pub const ALL: [HarmonicFieldKind; 5] = [
        HarmonicFieldKind::Triad,
        HarmonicFieldKind::Seventh,
        HarmonicFieldKind::Ninth,
        HarmonicFieldKind::Eleventh,
        HarmonicFieldKind::Thirteenth,
    ];

    /// Number of stacked thirds, counting the root
    pub fn tone_count(self) -> usize {
        match self {
            HarmonicFieldKind::Triad => 3,
            HarmonicFieldKind::Seventh => 4,
            HarmonicFieldKind::Ninth => 5,
            HarmonicFieldKind::Eleventh => 6,
            HarmonicFieldKind::Thirteenth => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HarmonicFieldKind::Triad => "triad",
            HarmonicFieldKind::Seventh => "seventh",
            HarmonicFieldKind::Ninth => "ninth",
            HarmonicFieldKind::Eleventh => "eleventh",
            HarmonicFieldKind::Thirteenth => "thirteenth",
        }
    }
}

impl FromStr for HarmonicFieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "triad" | "triads" => Ok(HarmonicFieldKind::Triad),
            "seventh" | "sevenths" | "tetrad" | "7th" => Ok(HarmonicFieldKind::Seventh),
            "ninth" | "ninths" | "9th" => Ok(HarmonicFieldKind::Ninth),
            "eleventh" | "elevenths" | "11th" => Ok(HarmonicFieldKind::Eleventh),
            "thirteenth" | "thirteenths" | "13th" => Ok(HarmonicFieldKind::Thirteenth),
            _ => Err(Error::UnknownHarmonicField(s.to_string())),
        }
    }
}

impl fmt::Display for HarmonicFieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One slot per scale degree; `None` where no recognized chord forms
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicField {
    kind: HarmonicFieldKind,
    chords: Vec<Option<Chord>>,
}

impl HarmonicField {
    /// Stack thirds on every degree of `scale`
    pub fn build(scale: &Scale, kind: HarmonicFieldKind) -> Self {
        let chords = (0..scale.len())
            .map(|degree| Self::chord_on_degree(scale, degree, kind))
            .collect();
        Self { kind, chords }
    }

    /// Chord on a 0-based degree: scale steps degree, +2, +4, ...
    fn chord_on_degree(scale: &Scale, degree: usize, kind: HarmonicFieldKind) -> Option<Chord> {
        let intervals = scale.intervals();
        let n = intervals.len();
        if n < kind.tone_count() {
            return None;
        }

        let height = |step: usize| intervals[step % n] as i32 + 12 * (step / n) as i32;
        let base = height(degree);
        let mut offsets = Vec::with_capacity(kind.tone_count());
        for third in 0..kind.tone_count() {
            let offset = height(degree + 2 * third) - base;
            offsets.push(u8::try_from(offset).ok()?);
        }

        let (base, upper) = offsets.split_at(offsets.len().min(4));
        let quality = ChordQuality::identify(base)?;
        let extensions = Extensions::identify(upper)?;
        let root = scale.keys()[degree];
        Some(Chord::new(root, quality).with_extensions(extensions))
    }

    pub fn kind(&self) -> HarmonicFieldKind {
        self.kind
    }

    /// Number of degree slots (present or absent)
    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// Chord on a 1-based degree; `None` for an absent slot or out-of-range degree
    pub fn degree(&self, degree: usize) -> Option<&Chord> {
        if degree == 0 {
            return None;
        }
        self.chords.get(degree - 1)?.as_ref()
    }

    /// All slots in degree order, absences included
    pub fn slots(&self) -> &[Option<Chord>] {
        &self.chords
    }

    /// Present chords with their 1-based degree, absent slots skipped
    pub fn present(&self) -> impl Iterator<Item = (usize, &Chord)> {
        self.chords
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|chord| (i + 1, chord)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::scale::{Note, ScaleType, Spelling};

    fn names(field: &HarmonicField) -> Vec<Option<String>> {
        field
            .slots()
            .iter()
            .map(|slot| slot.map(|c| c.to_string()))
            .collect()
    }

    #[test]
    fn test_c_major_triads() {
        let scale = Scale::parse("C", "major").unwrap();
        let field = scale.harmonic_field(HarmonicFieldKind::Triad);
        assert_eq!(field.len(), 7);

        let symbols: Vec<String> = field.present().map(|(_, c)| c.to_string()).collect();
        assert_eq!(symbols, vec!["C", "Dm", "Em", "F", "G", "Am", "Bdim"]);

        let one = field.degree(1).unwrap();
        let tones: Vec<Note> = one.pitches(4).iter().map(|p| p.note()).collect();
        assert_eq!(tones, vec![Note::C, Note::E, Note::G]);

        let seven = field.degree(7).unwrap();
        assert_eq!(seven.quality(), ChordQuality::Diminished);
        let tones: Vec<Note> = seven.pitches(4).iter().map(|p| p.note()).collect();
        assert_eq!(tones, vec![Note::B, Note::D, Note::F]);
    }

    #[test]
    fn test_c_major_sevenths() {
        let scale = Scale::parse("C", "major").unwrap();
        let field = scale.harmonic_field(HarmonicFieldKind::Seventh);
        let symbols: Vec<String> = field.present().map(|(_, c)| c.to_string()).collect();
        assert_eq!(
            symbols,
            vec!["Cmaj7", "Dm7", "Em7", "Fmaj7", "G7", "Am7", "Bm7b5"]
        );
    }

    #[test]
    fn test_harmonic_minor_has_augmented_and_dim7() {
        let scale = Scale::parse("A", "harmonic minor").unwrap();
        let triads = scale.harmonic_field(HarmonicFieldKind::Triad);
        assert_eq!(triads.degree(3).unwrap().to_string(), "Caug");
        assert_eq!(triads.degree(5).unwrap().to_string(), "E");

        let sevenths = scale.harmonic_field(HarmonicFieldKind::Seventh);
        assert_eq!(sevenths.degree(1).unwrap().to_string(), "AmMaj7");
        assert_eq!(sevenths.degree(7).unwrap().to_string(), "G#dim7");
    }

    #[test]
    fn test_flat_keys_spell_chord_roots_with_flats() {
        let scale = Scale::parse("Eb", "major").unwrap();
        let field = scale.harmonic_field(HarmonicFieldKind::Triad);
        assert_eq!(
            names(&field),
            vec![
                Some("Eb".to_string()),
                Some("Fm".to_string()),
                Some("Gm".to_string()),
                Some("Ab".to_string()),
                Some("Bb".to_string()),
                Some("Cm".to_string()),
                Some("Ddim".to_string()),
            ]
        );
    }

    #[test]
    fn test_pentatonic_degrees_can_be_absent() {
        let scale = Scale::parse("C", "major pentatonic").unwrap();
        let field = scale.harmonic_field(HarmonicFieldKind::Triad);
        assert_eq!(field.len(), 5);
        // C E A is not a stacked-third triad
        assert!(field.degree(1).is_none());
        assert!(field.slots().iter().any(|slot| slot.is_none()));
        assert!(field.present().count() < field.len());
    }

    #[test]
    fn test_whole_tone_is_all_augmented() {
        let scale = Scale::parse("C", "whole tone").unwrap();
        let field = scale.harmonic_field(HarmonicFieldKind::Triad);
        assert_eq!(field.present().count(), 6);
        assert!(field
            .present()
            .all(|(_, c)| c.quality() == ChordQuality::Augmented));
    }

    #[test]
    fn test_field_length_matches_degree_count() {
        for key in Key::all(Spelling::Sharps) {
            for scale_type in ScaleType::ALL {
                let scale = Scale::new(key, scale_type);
                for kind in HarmonicFieldKind::ALL {
                    let field = scale.harmonic_field(kind);
                    assert_eq!(field.len(), scale_type.degree_count());
                    for (_, chord) in field.present() {
                        for pitch in chord.pitches(4) {
                            assert!(scale.contains(pitch.note()), "{} not in {}", pitch, scale);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_chord_pitches_round_trip_intervals() {
        let chord = Chord::new(Key::new(Note::A, Spelling::Sharps), ChordQuality::DominantSeventh);
        let pitches = chord.pitches(3);
        let offsets: Vec<u8> = pitches
            .iter()
            .map(|p| p.interval_from(&pitches[0]) as u8)
            .collect();
        assert_eq!(offsets, chord.intervals());

        let names: Vec<String> = pitches.iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["A3", "C#4", "E4", "G4"]);
    }

    #[test]
    fn test_degree_bounds() {
        let field = Scale::parse("C", "major")
            .unwrap()
            .harmonic_field(HarmonicFieldKind::Triad);
        assert!(field.degree(0).is_none());
        assert!(field.degree(8).is_none());
    }

    #[test]
    fn test_identify() {
        assert_eq!(ChordQuality::identify(&[0, 4, 7]), Some(ChordQuality::Major));
        assert_eq!(ChordQuality::identify(&[0, 3, 6, 10]), Some(ChordQuality::HalfDiminished));
        assert_eq!(ChordQuality::identify(&[0, 5, 7]), Some(ChordQuality::Sus4));
        assert_eq!(ChordQuality::identify(&[0, 5, 10]), None);
    }

    #[test]
    fn test_identify_extensions() {
        assert_eq!(Extensions::identify(&[]), Some(Extensions::NONE));
        let altered = Extensions::identify(&[13, 18, 20]).unwrap();
        assert_eq!(altered.ninth, Some(Alteration::Flat));
        assert_eq!(altered.eleventh, Some(Alteration::Sharp));
        assert_eq!(altered.thirteenth, Some(Alteration::Flat));
        assert_eq!(altered.offsets().collect::<Vec<_>>(), vec![13, 18, 20]);

        // b11 doubles the major third, #13 the minor seventh
        assert_eq!(Extensions::identify(&[14, 16]), None);
        assert_eq!(Extensions::identify(&[14, 17, 22]), None);
        assert_eq!(Extensions::identify(&[12]), None);
    }

    #[test]
    fn test_c_major_ninths() {
        let scale = Scale::parse("C", "major").unwrap();
        let field = scale.harmonic_field(HarmonicFieldKind::Ninth);
        let symbols: Vec<String> = field.present().map(|(_, c)| c.to_string()).collect();
        assert_eq!(
            symbols,
            vec!["Cmaj9", "Dm9", "Em7b9", "Fmaj9", "G9", "Am9", "Bm7b5b9"]
        );

        let tones: Vec<String> = field.degree(5).unwrap().pitches(3).iter().map(|p| p.to_string()).collect();
        assert_eq!(tones, vec!["G3", "B3", "D4", "F4", "A4"]);
    }

    #[test]
    fn test_c_major_elevenths_and_thirteenths() {
        let scale = Scale::parse("C", "major").unwrap();

        let elevenths = scale.harmonic_field(HarmonicFieldKind::Eleventh);
        assert_eq!(elevenths.present().count(), 7);
        assert_eq!(elevenths.degree(1).unwrap().to_string(), "Cmaj11");
        assert_eq!(elevenths.degree(4).unwrap().to_string(), "Fmaj9#11");

        let thirteenths = scale.harmonic_field(HarmonicFieldKind::Thirteenth);
        assert_eq!(thirteenths.present().count(), 7);
        assert_eq!(thirteenths.degree(5).unwrap().to_string(), "G13");
        assert_eq!(thirteenths.degree(3).unwrap().to_string(), "Em11b9b13");
        assert_eq!(thirteenths.degree(5).unwrap().len(), 7);
    }

    #[test]
    fn test_blues_has_suspended_triads() {
        let scale = Scale::parse("C", "blues").unwrap();
        let field = scale.harmonic_field(HarmonicFieldKind::Triad);
        assert_eq!(
            names(&field),
            vec![
                Some("Csus4".to_string()),
                Some("D#m".to_string()),
                Some("Fsus2".to_string()),
                None,
                None,
                None,
            ]
        );
    }

    #[test]
    fn test_extended_fields_need_enough_tones() {
        let pentatonic = Scale::parse("A", "minor pentatonic").unwrap();
        let elevenths = pentatonic.harmonic_field(HarmonicFieldKind::Eleventh);
        assert_eq!(elevenths.len(), 5);
        assert_eq!(elevenths.present().count(), 0);

        // The ninth of an octatonic stack wraps to the octave
        let diminished = Scale::parse("C", "diminished").unwrap();
        assert_eq!(diminished.harmonic_field(HarmonicFieldKind::Ninth).present().count(), 0);
    }

    #[test]
    fn test_field_kind_from_str() {
        assert_eq!("Triad".parse::<HarmonicFieldKind>().unwrap(), HarmonicFieldKind::Triad);
        assert_eq!("sevenths".parse::<HarmonicFieldKind>().unwrap(), HarmonicFieldKind::Seventh);
        assert_eq!("9th".parse::<HarmonicFieldKind>().unwrap(), HarmonicFieldKind::Ninth);
        assert_eq!(
            " Thirteenth ".parse::<HarmonicFieldKind>().unwrap(),
            HarmonicFieldKind::Thirteenth
        );
        assert!(matches!(
            "fifteenth".parse::<HarmonicFieldKind>(),
            Err(Error::UnknownHarmonicField(_))
        ));
    }
}
