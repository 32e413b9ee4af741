// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for the theory engine and MIDI dispatch.

use thiserror::Error;

use crate::music::Pitch;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown key: '{0}'")]
    UnknownKey(String),

    #[error("Unknown spelling: '{0}' (expected 'sharps' or 'flats')")]
    UnknownSpelling(String),

    #[error("Unknown scale type: '{0}'")]
    UnknownScaleType(String),

    #[error("Unknown harmonic field: '{0}' (expected triad, seventh, ninth, eleventh or thirteenth)")]
    UnknownHarmonicField(String),

    #[error("{pitch} maps to MIDI note {note_number}, outside 0-127")]
    PitchOutOfRange { pitch: Pitch, note_number: i32 },

    #[error("Invalid octave selection: {0}")]
    InvalidOctaves(String),

    #[error("MIDI channel {0} is outside 0-15")]
    InvalidChannel(u8),

    #[error("MIDI data byte {0} is outside 0-127")]
    InvalidDataByte(u8),

    #[error("MIDI device error: {0}")]
    MidiDevice(String),

    #[error("MIDI port error: {0}")]
    MidiPort(String),

    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),
}

impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::MidiDevice(e.to_string())
    }
}

impl From<midir::ConnectError<midir::MidiOutput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiOutput>) -> Self {
        Error::MidiPort(e.to_string())
    }
}

impl From<midir::SendError> for Error {
    fn from(e: midir::SendError) -> Self {
        Error::MidiPort(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
