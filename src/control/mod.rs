// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pad control: selector changes and press/release gestures.
//!
//! This module provides:
//! - The pad selection and its derived layout
//! - The pad controller, which turns gestures into conductor calls
//! - Keyboard shortcut handling for the terminal front end

pub mod keyboard;
pub mod layout;

pub use keyboard::{Category, KeyBinding, Keymap, Shortcut};
pub use layout::{ChordPad, PadLayout, Selection, DEFAULT_CHORD_OCTAVE, DEFAULT_OCTAVES};

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Result;
use crate::midi::{Conductor, EndpointId, Endpoints, MidiTransport};
use crate::music::{Key, Octave, Pitch, ScaleType, Spelling, MAX_OCTAVE, MIN_OCTAVE};

/// Action that can be triggered by controls
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    /// No action
    None,

    // Selectors
    /// Move the key up a semitone
    NextKey,
    /// Move the key down a semitone
    PreviousKey,
    NextScale,
    PreviousScale,
    /// Switch between sharp and flat names
    ToggleSpelling,
    ChordOctaveUp,
    ChordOctaveDown,
    /// Shift the whole pitch pad range up an octave
    OctavesUp,
    /// Shift the whole pitch pad range down an octave
    OctavesDown,

    // Output
    /// Step the target through all endpoints, then back to "all"
    CycleDestination,
    TogglePortSwap,
    ToggleOutput,
    /// Release every held pad
    ReleaseAll,

    // Pads
    /// Press (or, when latching, toggle) the focused pad
    PressPad,
    /// Switch focus between pitch and chord pads
    SwitchGrid,

    // UI
    /// Toggle help display
    ToggleHelp,
    /// Quit application
    Quit,

    // Navigation
    NavigateUp,
    NavigateDown,
    NavigateLeft,
    NavigateRight,
}

impl ControlAction {
    /// Check if this changes the selection
    pub fn is_selector(&self) -> bool {
        matches!(
            self,
            ControlAction::NextKey
                | ControlAction::PreviousKey
                | ControlAction::NextScale
                | ControlAction::PreviousScale
                | ControlAction::ToggleSpelling
                | ControlAction::ChordOctaveUp
                | ControlAction::ChordOctaveDown
                | ControlAction::OctavesUp
                | ControlAction::OctavesDown
        )
    }

    /// Check if this changes where or whether MIDI goes out
    pub fn is_output(&self) -> bool {
        matches!(
            self,
            ControlAction::CycleDestination
                | ControlAction::TogglePortSwap
                | ControlAction::ToggleOutput
                | ControlAction::ReleaseAll
        )
    }

    /// Check if this moves the pad cursor
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            ControlAction::NavigateUp
                | ControlAction::NavigateDown
                | ControlAction::NavigateLeft
                | ControlAction::NavigateRight
                | ControlAction::SwitchGrid
        )
    }
}

/// A pad on either grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PadId {
    Pitch(usize),
    Chord(usize),
}

/// What a held pad sent, so its release can undo exactly that
#[derive(Debug, Clone, PartialEq)]
struct HeldNotes {
    pitches: Vec<Pitch>,
    channel: u8,
    endpoints: Endpoints,
}

/// Owns the selection, its layout and the conductor; routes gestures
pub struct PadController<T: MidiTransport> {
    selection: Selection,
    layout: PadLayout,
    conductor: Conductor<T>,
    target: Endpoints,
    held: BTreeMap<PadId, HeldNotes>,
}

impl<T: MidiTransport> PadController<T> {
    pub fn new(conductor: Conductor<T>, selection: Selection) -> Self {
        let layout = PadLayout::derive(&selection);
        Self {
            selection,
            layout,
            conductor,
            target: Endpoints::All,
            held: BTreeMap::new(),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn layout(&self) -> &PadLayout {
        &self.layout
    }

    pub fn conductor(&self) -> &Conductor<T> {
        &self.conductor
    }

    pub fn conductor_mut(&mut self) -> &mut Conductor<T> {
        &mut self.conductor
    }

    pub fn into_conductor(self) -> Conductor<T> {
        self.conductor
    }

    /// Endpoints pad presses go to unless the caller overrides them
    pub fn target(&self) -> &Endpoints {
        &self.target
    }

    pub fn set_target(&mut self, target: Endpoints) {
        self.target = target;
    }

    /// Step the target: all, then each known endpoint, then all again
    pub fn cycle_target(&mut self) {
        let ids: Vec<EndpointId> = self.conductor.endpoints().iter().map(|e| e.id).collect();
        let next = match self.target.as_single() {
            None => ids.first().copied(),
            Some(current) => ids
                .iter()
                .position(|&id| id == current)
                .and_then(|i| ids.get(i + 1).copied()),
        };
        self.target = next.into();
    }

    /// Replace the selection and its layout together
    pub fn apply_selection(&mut self, selection: Selection) {
        let layout = PadLayout::derive(&selection);
        (self.selection, self.layout) = (selection, layout);
        debug!(
            "Selection: {} ({} pitch pads, {} chord pads)",
            self.layout.scale(),
            self.layout.pitches().len(),
            self.layout.chords().len()
        );
    }

    pub fn select_key(&mut self, key: Key) {
        let selection = Selection {
            key,
            ..self.selection.clone()
        };
        self.apply_selection(selection);
    }

    pub fn select_scale_type(&mut self, scale_type: ScaleType) {
        let selection = Selection {
            scale_type,
            ..self.selection.clone()
        };
        self.apply_selection(selection);
    }

    /// Select the pitch pad octaves; they must be ascending and playable
    pub fn select_octaves(&mut self, octaves: Vec<Octave>) -> Result<()> {
        layout::validate_octaves(&octaves)?;
        let selection = Selection {
            octaves,
            ..self.selection.clone()
        };
        self.apply_selection(selection);
        Ok(())
    }

    pub fn select_spelling(&mut self, spelling: Spelling) {
        self.select_key(self.selection.key.with_spelling(spelling));
    }

    pub fn select_chord_octave(&mut self, octave: Octave) -> Result<()> {
        layout::validate_octave(octave)?;
        let selection = Selection {
            chord_octave: octave,
            ..self.selection.clone()
        };
        self.apply_selection(selection);
        Ok(())
    }

    pub fn next_key(&mut self) {
        self.select_key(self.selection.key.transpose(1));
    }

    pub fn previous_key(&mut self) {
        self.select_key(self.selection.key.transpose(-1));
    }

    pub fn next_scale_type(&mut self) {
        self.select_scale_type(self.selection.scale_type.next());
    }

    pub fn previous_scale_type(&mut self) {
        self.select_scale_type(self.selection.scale_type.previous());
    }

    pub fn toggle_spelling(&mut self) {
        self.select_spelling(self.selection.key.spelling().toggled());
    }

    /// Move the chord octave by `delta`; stops at the playable range
    pub fn shift_chord_octave(&mut self, delta: Octave) -> Result<()> {
        let octave = self
            .selection
            .chord_octave
            .saturating_add(delta)
            .clamp(MIN_OCTAVE, MAX_OCTAVE);
        self.select_chord_octave(octave)
    }

    /// Move every pitch pad octave by `delta`, if the whole range still fits
    pub fn shift_octaves(&mut self, delta: Octave) -> Result<()> {
        let octaves = self
            .selection
            .octaves
            .iter()
            .map(|o| o.saturating_add(delta))
            .collect();
        self.select_octaves(octaves)
    }

    /// Change port swap. Held pads are released first, while their
    /// endpoints still resolve the way they did at press time.
    pub fn set_port_swapped(&mut self, swapped: bool) -> Result<()> {
        if swapped != self.conductor.is_port_swapped() {
            self.release_all()?;
            self.conductor.set_port_swapped(swapped);
        }
        Ok(())
    }

    /// Open or close the outputs, releasing held pads before a close
    pub fn set_output_open(&mut self, open: bool) -> Result<()> {
        if !open {
            self.release_all()?;
        }
        self.conductor.set_output_open(open);
        Ok(())
    }

    pub fn is_held(&self, pad: PadId) -> bool {
        self.held.contains_key(&pad)
    }

    pub fn held(&self) -> impl Iterator<Item = PadId> + '_ {
        self.held.keys().copied()
    }

    /// Press a pitch pad, sending to `endpoints`
    pub fn press_pitch(&mut self, index: usize, endpoints: &Endpoints) -> Result<()> {
        let Some(&pitch) = self.layout.pitch(index) else {
            debug!("No pitch pad {}", index);
            return Ok(());
        };
        self.press(PadId::Pitch(index), vec![pitch], endpoints)
    }

    pub fn release_pitch(&mut self, index: usize) -> Result<()> {
        self.release(PadId::Pitch(index))
    }

    /// Press a chord pad, voicing it at the selected chord octave
    pub fn press_chord(&mut self, index: usize, endpoints: &Endpoints) -> Result<()> {
        let Some(pad) = self.layout.chord(index) else {
            debug!("No chord pad {}", index);
            return Ok(());
        };
        let pitches = pad.chord.pitches(self.selection.chord_octave);
        self.press(PadId::Chord(index), pitches, endpoints)
    }

    pub fn release_chord(&mut self, index: usize) -> Result<()> {
        self.release(PadId::Chord(index))
    }

    /// Press if released, release if held
    pub fn toggle(&mut self, pad: PadId, endpoints: &Endpoints) -> Result<()> {
        match (pad, self.is_held(pad)) {
            (_, true) => self.release(pad),
            (PadId::Pitch(i), false) => self.press_pitch(i, endpoints),
            (PadId::Chord(i), false) => self.press_chord(i, endpoints),
        }
    }

    /// Release every held pad
    pub fn release_all(&mut self) -> Result<()> {
        let pads: Vec<PadId> = self.held.keys().copied().collect();
        for pad in pads {
            self.release(pad)?;
        }
        Ok(())
    }

    fn press(&mut self, pad: PadId, pitches: Vec<Pitch>, endpoints: &Endpoints) -> Result<()> {
        if self.held.contains_key(&pad) {
            debug!("{:?} already held", pad);
            return Ok(());
        }

        let channel = self.selection.channel;
        self.conductor
            .notes_on(&pitches, self.selection.velocity, channel, endpoints)?;
        self.held.insert(
            pad,
            HeldNotes {
                pitches,
                channel,
                endpoints: endpoints.clone(),
            },
        );
        Ok(())
    }

    fn release(&mut self, pad: PadId) -> Result<()> {
        let Some(notes) = self.held.remove(&pad) else {
            debug!("{:?} is not held", pad);
            return Ok(());
        };
        self.conductor
            .notes_off(&notes.pitches, notes.channel, &notes.endpoints)
    }
}
