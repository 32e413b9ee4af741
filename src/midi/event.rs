// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Logical MIDI events.
//!
//! A [`MidiEvent`] is the status/channel/data triple handed to the dispatch
//! layer for one gesture. It is validated on construction, encoded to raw
//! bytes for the transport, and dropped once sent.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::messages;
use crate::error::{Error, Result};

/// Highest MIDI channel number (0-based)
pub const MAX_CHANNEL: u8 = 15;

/// Highest value for a MIDI data byte
pub const MAX_DATA: u8 = 127;

/// Channel voice message kinds the controller sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusType {
    NoteOff,
    NoteOn,
    ControllerChange,
    ProgramChange,
}

impl StatusType {
    /// Upper nibble of the status byte
    pub fn status_nibble(self) -> u8 {
        match self {
            StatusType::NoteOff => messages::NOTE_OFF,
            StatusType::NoteOn => messages::NOTE_ON,
            StatusType::ControllerChange => messages::CONTROL_CHANGE,
            StatusType::ProgramChange => messages::PROGRAM_CHANGE,
        }
    }

    /// Recognize a status byte, ignoring its channel nibble
    pub fn from_status_byte(status: u8) -> Option<Self> {
        match status & 0xF0 {
            messages::NOTE_OFF => Some(StatusType::NoteOff),
            messages::NOTE_ON => Some(StatusType::NoteOn),
            messages::CONTROL_CHANGE => Some(StatusType::ControllerChange),
            messages::PROGRAM_CHANGE => Some(StatusType::ProgramChange),
            _ => None,
        }
    }

    /// Whether the wire message carries a second data byte
    pub fn has_data2(self) -> bool {
        !matches!(self, StatusType::ProgramChange)
    }
}

/// A validated channel voice event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiEvent {
    status: StatusType,
    channel: u8,
    data1: u8,
    data2: Option<u8>,
}

impl MidiEvent {
    /// Create an event, rejecting channels above 15 and data bytes above 127
    pub fn new(status: StatusType, channel: u8, data1: u8, data2: Option<u8>) -> Result<Self> {
        if channel > MAX_CHANNEL {
            return Err(Error::InvalidChannel(channel));
        }
        if data1 > MAX_DATA {
            return Err(Error::InvalidDataByte(data1));
        }
        if let Some(value) = data2.filter(|&v| v > MAX_DATA) {
            return Err(Error::InvalidDataByte(value));
        }
        Ok(Self {
            status,
            channel,
            data1,
            data2,
        })
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Result<Self> {
        Self::new(StatusType::NoteOn, channel, note, Some(velocity))
    }

    /// Note off carries no release velocity
    pub fn note_off(channel: u8, note: u8) -> Result<Self> {
        Self::new(StatusType::NoteOff, channel, note, None)
    }

    pub fn controller_change(channel: u8, controller: u8, value: u8) -> Result<Self> {
        Self::new(StatusType::ControllerChange, channel, controller, Some(value))
    }

    pub fn program_change(channel: u8, program: u8) -> Result<Self> {
        Self::new(StatusType::ProgramChange, channel, program, None)
    }

    pub fn status(&self) -> StatusType {
        self.status
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn data1(&self) -> u8 {
        self.data1
    }

    pub fn data2(&self) -> Option<u8> {
        self.data2
    }

    /// Encode to wire bytes; a missing second data byte is sent as 0
    pub fn to_bytes(&self) -> Vec<u8> {
        let status = self.status.status_nibble() | self.channel;
        if self.status.has_data2() {
            vec![status, self.data1, self.data2.unwrap_or(0)]
        } else {
            vec![status, self.data1]
        }
    }

    /// Parse wire bytes back into an event.
    ///
    /// A note off with release velocity 0 parses with no second data byte,
    /// matching [`MidiEvent::note_off`].
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (&status_byte, rest) = data.split_first()?;
        let status = StatusType::from_status_byte(status_byte)?;
        let channel = status_byte & 0x0F;
        let data1 = *rest.first()? & 0x7F;

        let data2 = match status {
            StatusType::ProgramChange => None,
            StatusType::NoteOff => rest.get(1).map(|v| v & 0x7F).filter(|&v| v > 0),
            _ => Some(*rest.get(1)? & 0x7F),
        };

        Some(Self {
            status,
            channel,
            data1,
            data2,
        })
    }
}

impl fmt::Display for MidiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Channels display 1-16
        let channel = self.channel + 1;
        match self.status {
            StatusType::NoteOn => write!(
                f,
                "Note On ch{} note {} vel {}",
                channel,
                self.data1,
                self.data2.unwrap_or(0)
            ),
            StatusType::NoteOff => write!(f, "Note Off ch{} note {}", channel, self.data1),
            StatusType::ControllerChange => write!(
                f,
                "CC ch{} {}={}",
                channel,
                self.data1,
                self.data2.unwrap_or(0)
            ),
            StatusType::ProgramChange => write!(f, "Program ch{} {}", channel, self.data1),
        }
    }
}
