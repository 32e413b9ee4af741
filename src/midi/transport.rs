// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI transport abstraction.
//!
//! A [`MidiTransport`] owns the known endpoints and their open/closed state.
//! The conductor only reads that state and hands it bytes to send.
//!
//! Endpoint lifecycle: `Closed -> Open` through [`MidiTransport::open_output`]
//! for one endpoint, `Open -> Closed` through [`MidiTransport::close_output`]
//! for every endpoint at once. Sends only ever reach open endpoints.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use super::endpoint::{EndpointId, EndpointInfo, Endpoints};
use super::event::MidiEvent;
use super::MidiOutput;
use crate::error::{Error, Result};

/// Interface to the platform MIDI transport
pub trait MidiTransport {
    /// Destination endpoints currently visible to the transport
    fn destinations(&self) -> Vec<EndpointInfo>;

    /// Virtual outputs this process has created
    fn virtual_outputs(&self) -> Vec<EndpointInfo>;

    /// Create virtual output endpoints with the given ids and display names.
    ///
    /// Ids that already exist are left alone.
    fn create_virtual_outputs(&mut self, outputs: &[EndpointInfo]) -> Result<()>;

    /// Open one destination or virtual output
    fn open_output(&mut self, id: EndpointId) -> Result<()>;

    /// Close every open endpoint
    fn close_output(&mut self);

    fn is_open(&self, id: EndpointId) -> bool;

    /// Ids of every endpoint in the open state
    fn open_endpoints(&self) -> Vec<EndpointId>;

    /// Write raw bytes to the open endpoints addressed by `endpoints`
    fn send_message(&mut self, message: &[u8], endpoints: &Endpoints) -> Result<()>;

    fn send_note_on(
        &mut self,
        note: u8,
        velocity: u8,
        channel: u8,
        endpoints: &Endpoints,
    ) -> Result<()> {
        let event = MidiEvent::note_on(channel, note, velocity)?;
        self.send_message(&event.to_bytes(), endpoints)
    }

    fn send_note_off(&mut self, note: u8, channel: u8, endpoints: &Endpoints) -> Result<()> {
        let event = MidiEvent::note_off(channel, note)?;
        self.send_message(&event.to_bytes(), endpoints)
    }

    fn send_controller_change(
        &mut self,
        controller: u8,
        value: u8,
        channel: u8,
        endpoints: &Endpoints,
    ) -> Result<()> {
        let event = MidiEvent::controller_change(channel, controller, value)?;
        self.send_message(&event.to_bytes(), endpoints)
    }

    fn send_program_change(&mut self, program: u8, channel: u8, endpoints: &Endpoints) -> Result<()> {
        let event = MidiEvent::program_change(channel, program)?;
        self.send_message(&event.to_bytes(), endpoints)
    }
}

/// Table of open connections keyed by endpoint id
pub struct OpenOutputs<C> {
    connections: BTreeMap<EndpointId, C>,
}

impl<C: MidiOutput> OpenOutputs<C> {
    pub fn new() -> Self {
        Self {
            connections: BTreeMap::new(),
        }
    }

    /// Add a connection, returning any connection it replaced
    pub fn insert(&mut self, id: EndpointId, connection: C) -> Option<C> {
        self.connections.insert(id, connection)
    }

    pub fn remove(&mut self, id: EndpointId) -> Option<C> {
        self.connections.remove(&id)
    }

    /// Remove and return every connection
    pub fn take_all(&mut self) -> BTreeMap<EndpointId, C> {
        std::mem::take(&mut self.connections)
    }

    pub fn contains(&self, id: EndpointId) -> bool {
        self.connections.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<EndpointId> {
        self.connections.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Send to every addressed connection.
    ///
    /// Every target is attempted; the first failure is returned afterwards.
    /// Ids in an explicit set that are not open are skipped.
    pub fn send(&mut self, message: &[u8], endpoints: &Endpoints) -> Result<()> {
        let mut first_error = None;

        match endpoints {
            Endpoints::All => {
                for (id, connection) in self.connections.iter_mut() {
                    if let Err(e) = connection.send(message) {
                        warn!("Send to endpoint {} failed: {}", id, e);
                        first_error.get_or_insert(e);
                    }
                }
            }
            Endpoints::Only(ids) => {
                for id in ids {
                    match self.connections.get_mut(id) {
                        Some(connection) => {
                            if let Err(e) = connection.send(message) {
                                warn!("Send to endpoint {} failed: {}", id, e);
                                first_error.get_or_insert(e);
                            }
                        }
                        None => debug!("Endpoint {} is not open, skipping", id),
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<C: MidiOutput> Default for OpenOutputs<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// One message written by [`MemoryTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub endpoint: EndpointId,
    pub bytes: Vec<u8>,
}

impl SentMessage {
    /// Decode the bytes, if they form a channel voice event
    pub fn event(&self) -> Option<MidiEvent> {
        MidiEvent::parse(&self.bytes)
    }
}

/// Shared handle on the messages a [`MemoryTransport`] has written
#[derive(Debug, Clone, Default)]
pub struct SentLog {
    messages: Arc<Mutex<Vec<SentMessage>>>,
}

impl SentLog {
    fn lock(&self) -> MutexGuard<'_, Vec<SentMessage>> {
        // A panic while holding the lock cannot leave a Vec half-written
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, message: SentMessage) {
        self.lock().push(message);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.lock().clone()
    }

    pub fn take(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Output connection that appends to a [`SentLog`]
pub struct RecordingOutput {
    endpoint: EndpointId,
    log: SentLog,
}

impl MidiOutput for RecordingOutput {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        self.log.push(SentMessage {
            endpoint: self.endpoint,
            bytes: message.to_vec(),
        });
        Ok(())
    }
}

/// In-process transport that records instead of transmitting.
///
/// Used by tests and by the `--offline` mode of the binary.
pub struct MemoryTransport {
    destinations: Vec<EndpointInfo>,
    virtual_outputs: Vec<EndpointInfo>,
    outputs: OpenOutputs<RecordingOutput>,
    log: SentLog,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::with_destinations(Vec::new())
    }

    pub fn with_destinations(destinations: Vec<EndpointInfo>) -> Self {
        Self {
            destinations,
            virtual_outputs: Vec::new(),
            outputs: OpenOutputs::new(),
            log: SentLog::default(),
        }
    }

    pub fn add_destination(&mut self, destination: EndpointInfo) {
        if !self.destinations.iter().any(|d| d.id == destination.id) {
            self.destinations.push(destination);
        }
    }

    /// A handle that stays valid after the transport moves into a conductor
    pub fn log(&self) -> SentLog {
        self.log.clone()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.log.sent()
    }

    pub fn take_sent(&mut self) -> Vec<SentMessage> {
        self.log.take()
    }

    /// Recorded messages decoded as events, paired with their endpoint
    pub fn sent_events(&self) -> Vec<(EndpointId, MidiEvent)> {
        self.log
            .sent()
            .iter()
            .filter_map(|m| m.event().map(|e| (m.endpoint, e)))
            .collect()
    }

    fn knows(&self, id: EndpointId) -> bool {
        self.destinations
            .iter()
            .chain(self.virtual_outputs.iter())
            .any(|e| e.id == id)
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiTransport for MemoryTransport {
    fn destinations(&self) -> Vec<EndpointInfo> {
        self.destinations.clone()
    }

    fn virtual_outputs(&self) -> Vec<EndpointInfo> {
        self.virtual_outputs.clone()
    }

    fn create_virtual_outputs(&mut self, outputs: &[EndpointInfo]) -> Result<()> {
        for output in outputs {
            if self.virtual_outputs.iter().any(|v| v.id == output.id) {
                debug!("Virtual output {} already exists", output.id);
                continue;
            }
            self.virtual_outputs.push(output.clone());
        }
        Ok(())
    }

    fn open_output(&mut self, id: EndpointId) -> Result<()> {
        if !self.knows(id) {
            return Err(Error::MidiPort(format!("unknown endpoint {}", id)));
        }
        if !self.outputs.contains(id) {
            self.outputs.insert(
                id,
                RecordingOutput {
                    endpoint: id,
                    log: self.log.clone(),
                },
            );
        }
        Ok(())
    }

    fn close_output(&mut self) {
        self.outputs.take_all();
    }

    fn is_open(&self, id: EndpointId) -> bool {
        self.outputs.contains(id)
    }

    fn open_endpoints(&self) -> Vec<EndpointId> {
        self.outputs.ids()
    }

    fn send_message(&mut self, message: &[u8], endpoints: &Endpoints) -> Result<()> {
        self.outputs.send(message, endpoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> MemoryTransport {
        MemoryTransport::with_destinations(vec![
            EndpointInfo::new(1, "Synth A"),
            EndpointInfo::new(2, "Synth B"),
        ])
    }

    #[test]
    fn test_closed_endpoints_receive_nothing() {
        let mut t = transport();
        t.send_note_on(60, 90, 0, &Endpoints::All).unwrap();
        t.send_note_on(60, 90, 0, &Endpoints::single(EndpointId(1)))
            .unwrap();
        assert!(t.sent().is_empty());
    }

    #[test]
    fn test_all_reaches_every_open_endpoint() {
        let mut t = transport();
        t.open_output(EndpointId(1)).unwrap();
        t.open_output(EndpointId(2)).unwrap();

        t.send_note_on(60, 90, 0, &Endpoints::All).unwrap();

        let sent = t.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].endpoint, EndpointId(1));
        assert_eq!(sent[1].endpoint, EndpointId(2));
        assert!(sent.iter().all(|m| m.bytes == vec![0x90, 60, 90]));
    }

    #[test]
    fn test_explicit_set_skips_closed_ids() {
        let mut t = transport();
        t.open_output(EndpointId(2)).unwrap();

        let set = Endpoints::Only(vec![EndpointId(1), EndpointId(2), EndpointId(99)]);
        t.send_note_off(64, 3, &set).unwrap();

        let sent = t.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].endpoint, EndpointId(2));
        assert_eq!(sent[0].bytes, vec![0x83, 64, 0]);
    }

    #[test]
    fn test_close_closes_everything() {
        let mut t = transport();
        t.create_virtual_outputs(&[EndpointInfo::new(2_500_000, "Virtual Output Port")])
            .unwrap();
        t.open_output(EndpointId(1)).unwrap();
        t.open_output(EndpointId(2_500_000)).unwrap();
        assert_eq!(t.open_endpoints().len(), 2);

        t.close_output();
        assert!(t.open_endpoints().is_empty());
        assert!(!t.is_open(EndpointId(2_500_000)));
        // Virtual outputs survive a close
        assert_eq!(t.virtual_outputs().len(), 1);
    }

    #[test]
    fn test_open_unknown_endpoint_fails() {
        let mut t = transport();
        assert!(t.open_output(EndpointId(42)).is_err());
    }

    #[test]
    fn test_create_virtual_outputs_is_idempotent() {
        let mut t = transport();
        let port = EndpointInfo::new(2_500_000, "Virtual Output Port");
        t.create_virtual_outputs(&[port.clone()]).unwrap();
        t.create_virtual_outputs(&[port]).unwrap();
        assert_eq!(t.virtual_outputs().len(), 1);
    }

    #[test]
    fn test_typed_sends_encode() {
        let mut t = transport();
        t.open_output(EndpointId(1)).unwrap();

        t.send_controller_change(7, 100, 1, &Endpoints::All).unwrap();
        t.send_program_change(5, 1, &Endpoints::All).unwrap();

        let bytes: Vec<Vec<u8>> = t.take_sent().into_iter().map(|m| m.bytes).collect();
        assert_eq!(bytes, vec![vec![0xB1, 7, 100], vec![0xC1, 5]]);
        assert!(t.sent().is_empty());
    }

    #[test]
    fn test_sent_events_decode() {
        let mut t = transport();
        t.open_output(EndpointId(1)).unwrap();
        t.send_note_on(62, 90, 0, &Endpoints::All).unwrap();

        let events = t.sent_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, EndpointId(1));
        assert_eq!(events[0].1, MidiEvent::note_on(0, 62, 90).unwrap());
    }

    #[test]
    fn test_log_handle_is_shared() {
        let mut t = transport();
        let log = t.log();
        t.open_output(EndpointId(1)).unwrap();
        t.send_note_on(60, 90, 0, &Endpoints::All).unwrap();
        assert_eq!(log.len(), 1);
    }
}
