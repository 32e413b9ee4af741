// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! midir backend.
//!
//! This module provides the real [`MidiTransport`], built on `midir` so the
//! controller can reach CoreMIDI, ALSA and WinMM destinations. Virtual
//! outputs are available on Unix platforms only.

use std::collections::{BTreeMap, HashMap};

use midir::{MidiOutput as MidirOutput, MidiOutputConnection, MidiOutputPort};
use tracing::{debug, info, warn};

use super::endpoint::{EndpointId, EndpointInfo, Endpoints};
use super::transport::{MidiTransport, OpenOutputs};
use crate::error::{Error, Result};

/// Stable id for a port name: 32-bit FNV-1a folded into a positive `i32`
pub fn port_id(name: &str) -> EndpointId {
    const FNV_OFFSET: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;

    let hash = name
        .bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ byte as u32).wrapping_mul(FNV_PRIME));
    EndpointId((hash & 0x7FFF_FFFF) as i32)
}

/// Drop a trailing ALSA address such as ` 128:0`
fn without_address(name: &str) -> &str {
    let is_address = |tail: &str| {
        tail.split_once(':').map_or(false, |(client, port)| {
            [client, port]
                .iter()
                .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
        })
    };
    match name.rsplit_once(' ') {
        Some((head, tail)) if is_address(tail) => head,
        _ => name,
    }
}

/// midir-backed transport
pub struct MidirTransport {
    client_name: String,
    pinned: HashMap<String, EndpointId>,
    virtual_outputs: Vec<EndpointInfo>,
    outputs: OpenOutputs<MidiOutputConnection>,
    /// Closed virtual ports; dropping the connection would remove the port
    parked: BTreeMap<EndpointId, MidiOutputConnection>,
}

impl MidirTransport {
    /// Create a transport.
    ///
    /// # Arguments
    /// * `client_name` - Name this process registers with the MIDI system
    /// * `pinned` - Fixed ids for destinations, by port name
    pub fn new(client_name: impl Into<String>, pinned: HashMap<String, EndpointId>) -> Self {
        Self {
            client_name: client_name.into(),
            pinned,
            virtual_outputs: Vec::new(),
            outputs: OpenOutputs::new(),
            parked: BTreeMap::new(),
        }
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    fn client(&self) -> Result<MidirOutput> {
        Ok(MidirOutput::new(&self.client_name)?)
    }

    fn id_for(&self, name: &str) -> EndpointId {
        self.pinned
            .get(name)
            .copied()
            .unwrap_or_else(|| port_id(name))
    }

    fn is_virtual(&self, id: EndpointId) -> bool {
        self.virtual_outputs.iter().any(|v| v.id == id)
    }

    /// Our own virtual ports show up in the system port list on some backends.
    ///
    /// CoreMIDI lists them by port name; ALSA as `client:port`, optionally
    /// followed by the numeric `client:port` address.
    fn is_own_port(&self, name: &str) -> bool {
        let name = without_address(name);
        self.virtual_outputs.iter().any(|v| {
            name == v.name
                || name
                    .strip_prefix(self.client_name.as_str())
                    .and_then(|rest| rest.strip_prefix(':'))
                    == Some(v.name.as_str())
        })
    }

    fn scan(&self, client: &MidirOutput) -> Vec<(EndpointInfo, MidiOutputPort)> {
        client
            .ports()
            .into_iter()
            .enumerate()
            .filter_map(|(index, port)| {
                let name = client
                    .port_name(&port)
                    .unwrap_or_else(|_| format!("Unknown Device {}", index));
                if self.is_own_port(&name) {
                    return None;
                }
                Some((EndpointInfo::new(self.id_for(&name), name), port))
            })
            .collect()
    }

    #[cfg(unix)]
    fn create_virtual(&self, output: &EndpointInfo) -> Result<MidiOutputConnection> {
        use midir::os::unix::VirtualOutput;

        Ok(self.client()?.create_virtual(&output.name)?)
    }

    #[cfg(not(unix))]
    fn create_virtual(&self, output: &EndpointInfo) -> Result<MidiOutputConnection> {
        Err(Error::Unsupported(format!(
            "virtual output '{}' needs CoreMIDI, ALSA or JACK",
            output.name
        )))
    }
}

impl MidiTransport for MidirTransport {
    fn destinations(&self) -> Vec<EndpointInfo> {
        match self.client() {
            Ok(client) => self.scan(&client).into_iter().map(|(info, _)| info).collect(),
            Err(e) => {
                warn!("Cannot list MIDI destinations: {}", e);
                Vec::new()
            }
        }
    }

    fn virtual_outputs(&self) -> Vec<EndpointInfo> {
        self.virtual_outputs.clone()
    }

    fn create_virtual_outputs(&mut self, outputs: &[EndpointInfo]) -> Result<()> {
        for output in outputs {
            if self.is_virtual(output.id) {
                debug!("Virtual output {} already exists", output.id);
                continue;
            }
            let connection = self.create_virtual(output)?;
            info!("Created virtual output {}", output);
            self.parked.insert(output.id, connection);
            self.virtual_outputs.push(output.clone());
        }
        Ok(())
    }

    fn open_output(&mut self, id: EndpointId) -> Result<()> {
        if self.outputs.contains(id) {
            return Ok(());
        }

        if let Some(connection) = self.parked.remove(&id) {
            self.outputs.insert(id, connection);
            info!("Opened virtual output {}", id);
            return Ok(());
        }

        let client = self.client()?;
        let (info, port) = self
            .scan(&client)
            .into_iter()
            .find(|(info, _)| info.id == id)
            .ok_or_else(|| Error::MidiPort(format!("MIDI destination {} not found", id)))?;

        let connection_name = format!("{} output", self.client_name);
        let connection = client.connect(&port, &connection_name)?;
        info!("Opened MIDI destination {}", info);
        self.outputs.insert(id, connection);
        Ok(())
    }

    fn close_output(&mut self) {
        for (id, connection) in self.outputs.take_all() {
            if self.is_virtual(id) {
                self.parked.insert(id, connection);
            } else {
                drop(connection);
            }
        }
        info!("Closed all MIDI outputs");
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
