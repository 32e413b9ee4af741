// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI dispatch layer.
//!
//! This module turns pitches and chords into channel voice events and routes
//! them to endpoints through a [`MidiTransport`]. The transport is a trait so
//! the real midir backend and the in-memory recording backend can be used
//! interchangeably.

pub mod conductor;
pub mod endpoint;
pub mod event;
pub mod midir_backend;
pub mod transport;

use crate::error::Result;

pub use conductor::{Conductor, MidiSettings, DEFAULT_CHANNEL, DEFAULT_VELOCITY};
pub use endpoint::{EndpointId, EndpointInfo, EndpointPair, Endpoints, PortSwap};
pub use event::{MidiEvent, StatusType};
pub use midir_backend::MidirTransport;
pub use transport::{MemoryTransport, MidiTransport, OpenOutputs, SentLog, SentMessage};

/// Trait for a single open MIDI output connection.
///
/// One implementation wraps a live midir connection; the in-memory transport
/// uses another that records bytes.
pub trait MidiOutput {
    /// Send a MIDI message immediately.
    ///
    /// # Arguments
    /// * `message` - Raw MIDI bytes (e.g., `[0x90, 60, 127]` for Note On)
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if the message could not be sent
    fn send(&mut self, message: &[u8]) -> Result<()>;
}

impl MidiOutput for midir::MidiOutputConnection {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        midir::MidiOutputConnection::send(self, message)?;
        Ok(())
    }
}

/// MIDI message constants
pub mod messages {
    // Channel Voice Messages (upper nibble, lower nibble is channel 0-15)
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;

    // Channel Mode Messages (controller numbers)
    pub const ALL_NOTES_OFF: u8 = 123;
}
