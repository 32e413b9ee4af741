// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The conductor: turns musical gestures into routed MIDI events.
//!
//! The conductor owns the transport handle, the port-swap flag and the
//! output-open flag. It never tracks which notes are sounding; pairing a
//! note off with its note on is up to the caller.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::endpoint::{EndpointId, EndpointInfo, Endpoints, PortSwap, MAIN_PAIR};
use super::event::{MidiEvent, StatusType};
use super::messages;
use super::transport::MidiTransport;
use crate::error::Result;
use crate::music::{Chord, MidiNote, Octave, Pitch};

/// Velocity used for pad presses
pub const DEFAULT_VELOCITY: u8 = 90;

/// Channel used for pad presses (0-based)
pub const DEFAULT_CHANNEL: u8 = 0;

/// Display name of the virtual output created at startup
pub const DEFAULT_VIRTUAL_OUTPUT_NAME: &str = "Virtual Output Port";

/// Transport-level settings for the conductor
#[derive(Debug, Clone, PartialEq)]
pub struct MidiSettings {
    pub client_name: String,
    pub open_on_start: bool,
    pub port_swap: bool,
    pub swap: PortSwap,
    pub virtual_outputs: Vec<EndpointInfo>,
    pub pinned: HashMap<String, EndpointId>,
}

impl Default for MidiSettings {
    fn default() -> Self {
        Self {
            client_name: "progression".to_string(),
            open_on_start: true,
            port_swap: false,
            swap: PortSwap::default(),
            virtual_outputs: vec![EndpointInfo::new(
                MAIN_PAIR.output,
                DEFAULT_VIRTUAL_OUTPUT_NAME,
            )],
            pinned: HashMap::new(),
        }
    }
}

/// MIDI dispatch layer
pub struct Conductor<T: MidiTransport> {
    transport: T,
    swap: PortSwap,
    port_swapped: bool,
    output_open: bool,
}

impl<T: MidiTransport> Conductor<T> {
    /// Wrap a transport without touching it
    pub fn new(transport: T, swap: PortSwap) -> Self {
        Self {
            transport,
            swap,
            port_swapped: false,
            output_open: false,
        }
    }

    /// Wrap a transport, create the configured virtual outputs and, if
    /// requested, open every output.
    ///
    /// A virtual output that cannot be created is logged and skipped so the
    /// controller still reaches hardware destinations.
    pub fn start(mut transport: T, settings: &MidiSettings) -> Self {
        if !settings.virtual_outputs.is_empty() {
            if let Err(e) = transport.create_virtual_outputs(&settings.virtual_outputs) {
                warn!("Could not create virtual outputs: {}", e);
            }
        }

        let mut conductor = Self::new(transport, settings.swap);
        conductor.set_port_swapped(settings.port_swap);
        if settings.open_on_start {
            conductor.set_output_open(true);
        }
        conductor
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn port_swap(&self) -> PortSwap {
        self.swap
    }

    pub fn is_port_swapped(&self) -> bool {
        self.port_swapped
    }

    pub fn set_port_swapped(&mut self, swapped: bool) {
        if swapped != self.port_swapped {
            info!("Port swap {}", if swapped { "on" } else { "off" });
        }
        self.port_swapped = swapped;
    }

    pub fn is_output_open(&self) -> bool {
        self.output_open
    }

    /// Open or close the transport's outputs.
    ///
    /// `true` opens every destination and every virtual output; endpoints that
    /// fail to open are logged and skipped. `false` closes all of them.
    /// Afterwards [`Conductor::is_output_open`] returns `open`.
    pub fn set_output_open(&mut self, open: bool) {
        if open {
            let ids: Vec<EndpointId> = self
                .transport
                .destinations()
                .into_iter()
                .chain(self.transport.virtual_outputs())
                .map(|e| e.id)
                .collect();
            for id in ids {
                if let Err(e) = self.transport.open_output(id) {
                    warn!("Could not open endpoint {}: {}", id, e);
                }
            }
            info!(
                "Outputs open: {} endpoint(s)",
                self.transport.open_endpoints().len()
            );
        } else {
            self.transport.close_output();
        }
        self.output_open = open;
    }

    /// Destinations followed by virtual outputs
    pub fn endpoints(&self) -> Vec<EndpointInfo> {
        let mut endpoints = self.transport.destinations();
        endpoints.extend(self.transport.virtual_outputs());
        endpoints
    }

    /// Apply port swap to a requested endpoint set.
    ///
    /// With swap on, exactly `[main output]` becomes `[main input]` and exactly
    /// `[develop output]` becomes `[develop input]`. Every other set, including
    /// `All` and multi-endpoint sets, passes through unchanged.
    pub fn resolve_endpoints(&self, requested: &Endpoints) -> Endpoints {
        if !self.port_swapped {
            return requested.clone();
        }
        requested
            .as_single()
            .and_then(|id| self.swap.substitute(id))
            .map(Endpoints::single)
            .unwrap_or_else(|| requested.clone())
    }

    /// Send one event to the resolved endpoints. Transport failures are
    /// logged, never returned.
    pub fn dispatch(&mut self, event: &MidiEvent, endpoints: &Endpoints) {
        let targets = self.resolve_endpoints(endpoints);
        debug!("Dispatch {} to {}", event, targets);

        let channel = event.channel();
        let data1 = event.data1();
        let data2 = event.data2().unwrap_or(0);

        let result = match event.status() {
            StatusType::NoteOn => self.transport.send_note_on(data1, data2, channel, &targets),
            StatusType::NoteOff => self.transport.send_note_off(data1, channel, &targets),
            StatusType::ControllerChange => {
                self.transport
                    .send_controller_change(data1, data2, channel, &targets)
            }
            StatusType::ProgramChange => {
                self.transport.send_program_change(data1, channel, &targets)
            }
        };

        if let Err(e) = result {
            warn!("Transport dropped {}: {}", event, e);
        }
    }

    pub fn note_on(
        &mut self,
        pitch: &Pitch,
        velocity: u8,
        channel: u8,
        endpoints: &Endpoints,
    ) -> Result<()> {
        self.notes_on(std::slice::from_ref(pitch), velocity, channel, endpoints)
    }

    pub fn note_off(&mut self, pitch: &Pitch, channel: u8, endpoints: &Endpoints) -> Result<()> {
        self.notes_off(std::slice::from_ref(pitch), channel, endpoints)
    }

    /// Note on for every tone of `chord` voiced at `octave`, in tone order
    pub fn chord_on(
        &mut self,
        chord: &Chord,
        octave: Octave,
        velocity: u8,
        channel: u8,
        endpoints: &Endpoints,
    ) -> Result<()> {
        self.notes_on(&chord.pitches(octave), velocity, channel, endpoints)
    }

    /// Note off for every tone of `chord` voiced at `octave`.
    ///
    /// The octave must match the one given to [`Conductor::chord_on`].
    pub fn chord_off(
        &mut self,
        chord: &Chord,
        octave: Octave,
        channel: u8,
        endpoints: &Endpoints,
    ) -> Result<()> {
        self.notes_off(&chord.pitches(octave), channel, endpoints)
    }

    /// Note on for each pitch in order.
    ///
    /// Every pitch is converted and every event validated before the first one
    /// is sent, so an error means nothing was transmitted.
    pub fn notes_on(
        &mut self,
        pitches: &[Pitch],
        velocity: u8,
        channel: u8,
        endpoints: &Endpoints,
    ) -> Result<()> {
        let events = note_numbers(pitches)?
            .into_iter()
            .map(|note| MidiEvent::note_on(channel, note, velocity))
            .collect::<Result<Vec<_>>>()?;
        self.dispatch_all(&events, endpoints);
        Ok(())
    }

    /// Note off for each pitch in order, all-or-nothing like [`Conductor::notes_on`]
    pub fn notes_off(&mut self, pitches: &[Pitch], channel: u8, endpoints: &Endpoints) -> Result<()> {
        let events = note_numbers(pitches)?
            .into_iter()
            .map(|note| MidiEvent::note_off(channel, note))
            .collect::<Result<Vec<_>>>()?;
        self.dispatch_all(&events, endpoints);
        Ok(())
    }

    /// All Notes Off (CC 123) on `channel`
    pub fn all_notes_off(&mut self, channel: u8, endpoints: &Endpoints) -> Result<()> {
        let event = MidiEvent::controller_change(channel, messages::ALL_NOTES_OFF, 0)?;
        self.dispatch(&event, endpoints);
        Ok(())
    }

    fn dispatch_all(&mut self, events: &[MidiEvent], endpoints: &Endpoints) {
        for event in events {
            self.dispatch(event, endpoints);
        }
    }
}

fn note_numbers(pitches: &[Pitch]) -> Result<Vec<MidiNote>> {
    pitches.iter().map(Pitch::midi_note).collect()
}
