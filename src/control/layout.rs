// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pad selection and the derived pad layout.
//!
//! A [`Selection`] holds what the performer picked. [`PadLayout::derive`]
//! computes everything the pads show from it in one go, so a layout is
//! never half updated.

use crate::error::{Error, Result};
use crate::midi::{DEFAULT_CHANNEL, DEFAULT_VELOCITY};
use crate::music::{
    Chord, HarmonicFieldKind, Key, Note, Octave, Pitch, Scale, ScaleType, Spelling, MAX_OCTAVE,
    MIN_OCTAVE,
};

/// Octaves shown on the pitch pads
pub const DEFAULT_OCTAVES: [Octave; 5] = [1, 2, 3, 4, 5];

/// Octave chord pads are voiced in
pub const DEFAULT_CHORD_OCTAVE: Octave = 2;

/// Check an octave list: non-empty, strictly ascending, every octave playable
pub fn validate_octaves(octaves: &[Octave]) -> Result<()> {
    if octaves.is_empty() {
        return Err(Error::InvalidOctaves("no octaves selected".to_string()));
    }
    if let Some(&octave) = octaves
        .iter()
        .find(|&&o| !(MIN_OCTAVE..=MAX_OCTAVE).contains(&o))
    {
        return Err(Error::InvalidOctaves(format!(
            "octave {} is outside {}..={}",
            octave, MIN_OCTAVE, MAX_OCTAVE
        )));
    }
    if octaves.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::InvalidOctaves(format!(
            "{:?} is not strictly ascending",
            octaves
        )));
    }
    Ok(())
}

/// Check a single octave is playable
pub fn validate_octave(octave: Octave) -> Result<()> {
    validate_octaves(&[octave])
}

/// Everything the performer has selected
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub key: Key,
    pub scale_type: ScaleType,
    /// Octaves for the pitch pads, ascending
    pub octaves: Vec<Octave>,
    pub chord_octave: Octave,
    /// Harmonic fields shown on the chord pads, in display order
    pub fields: Vec<HarmonicFieldKind>,
    /// MIDI channel, 0-15
    pub channel: u8,
    pub velocity: u8,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            key: Key::new(Note::C, Spelling::Flats),
            scale_type: ScaleType::Major,
            octaves: DEFAULT_OCTAVES.to_vec(),
            chord_octave: DEFAULT_CHORD_OCTAVE,
            fields: HarmonicFieldKind::ALL.to_vec(),
            channel: DEFAULT_CHANNEL,
            velocity: DEFAULT_VELOCITY,
        }
    }
}

/// One chord pad
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordPad {
    pub kind: HarmonicFieldKind,
    /// 1-based scale degree
    pub degree: usize,
    pub chord: Chord,
}

/// Snapshot of the scale, pitch pads and chord pads for one selection
#[derive(Debug, Clone, PartialEq)]
pub struct PadLayout {
    scale: Scale,
    pitches: Vec<Pitch>,
    chords: Vec<ChordPad>,
}

impl PadLayout {
    /// Derive the complete layout for `selection`.
    ///
    /// Chord pads come from each requested harmonic field in order; degrees
    /// with no chord are dropped here.
    pub fn derive(selection: &Selection) -> Self {
        let scale = Scale::new(selection.key, selection.scale_type);
        let pitches = scale.pitches(&selection.octaves);

        let chords = selection
            .fields
            .iter()
            .flat_map(|&kind| {
                scale
                    .harmonic_field(kind)
                    .present()
                    .map(|(degree, chord)| ChordPad {
                        kind,
                        degree,
                        chord: *chord,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            scale,
            pitches,
            chords,
        }
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }

    pub fn chords(&self) -> &[ChordPad] {
        &self.chords
    }

    pub fn pitch(&self, index: usize) -> Option<&Pitch> {
        self.pitches.get(index)
    }

    pub fn chord(&self, index: usize) -> Option<&ChordPad> {
        self.chords.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::ChordQuality;

    #[test]
    fn test_default_selection() {
        let selection = Selection::default();
        assert_eq!(selection.octaves, vec![1, 2, 3, 4, 5]);
        assert_eq!(selection.chord_octave, 2);
        assert_eq!(selection.velocity, 90);
        assert_eq!(selection.channel, 0);
        assert_eq!(selection.key.spelling(), Spelling::Flats);
    }

    #[test]
    fn test_derive_c_major() {
        let layout = PadLayout::derive(&Selection::default());

        assert_eq!(layout.pitches().len(), 35);
        assert_eq!(layout.pitch(0).unwrap().to_string(), "C1");
        assert_eq!(layout.pitch(34).unwrap().to_string(), "B5");

        // Seven chords per field: triads, sevenths, ninths, elevenths, thirteenths
        assert_eq!(layout.chords().len(), 35);
        let first = layout.chord(0).unwrap();
        assert_eq!(first.kind, HarmonicFieldKind::Triad);
        assert_eq!(first.degree, 1);
        assert_eq!(first.chord.quality(), ChordQuality::Major);

        let eighth = layout.chord(7).unwrap();
        assert_eq!(eighth.kind, HarmonicFieldKind::Seventh);
        assert_eq!(eighth.chord.to_string(), "Cmaj7");

        let ninth = layout.chord(14).unwrap();
        assert_eq!(ninth.kind, HarmonicFieldKind::Ninth);
        assert_eq!(ninth.chord.to_string(), "Cmaj9");
        assert_eq!(layout.chord(34).unwrap().kind, HarmonicFieldKind::Thirteenth);
    }

    #[test]
    fn test_absent_degrees_are_dropped() {
        let selection = Selection {
            scale_type: ScaleType::MajorPentatonic,
            ..Selection::default()
        };
        let layout = PadLayout::derive(&selection);
        let scale = layout.scale();

        let expected: usize = selection
            .fields
            .iter()
            .map(|&kind| scale.harmonic_field(kind).present().count())
            .sum();
        assert_eq!(layout.chords().len(), expected);
        assert!(layout.chords().len() < selection.fields.len() * scale.len());
    }

    #[test]
    fn test_fields_in_selection_order() {
        let selection = Selection {
            fields: vec![HarmonicFieldKind::Seventh],
            octaves: vec![4],
            ..Selection::default()
        };
        let layout = PadLayout::derive(&selection);
        assert_eq!(layout.pitches().len(), 7);
        assert!(layout
            .chords()
            .iter()
            .all(|pad| pad.kind == HarmonicFieldKind::Seventh));
    }

    #[test]
    fn test_validate_octaves() {
        assert!(validate_octaves(&[1, 2, 3]).is_ok());
        assert!(validate_octaves(&[-1, 9]).is_ok());
        assert!(validate_octaves(&[]).is_err());
        assert!(validate_octaves(&[2, 1]).is_err());
        assert!(validate_octaves(&[3, 3]).is_err());
        assert!(validate_octaves(&[10]).is_err());
        assert!(validate_octave(-2).is_err());
    }

    #[test]
    fn test_out_of_bounds_lookup() {
        let layout = PadLayout::derive(&Selection::default());
        assert!(layout.pitch(35).is_none());
        assert!(layout.chord(35).is_none());
    }
}
