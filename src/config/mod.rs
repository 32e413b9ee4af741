// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for the pad controller.
//!
//! This module provides data structures for loading and saving the YAML
//! configuration: the initial pad selection, MIDI transport settings and
//! logging.

pub mod watcher;

pub use watcher::{validate_config, ConfigEvent, ConfigWatcher};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::control::{layout, Selection, DEFAULT_CHORD_OCTAVE, DEFAULT_OCTAVES};
use crate::midi::conductor::DEFAULT_VIRTUAL_OUTPUT_NAME;
use crate::midi::endpoint::MAIN_PAIR;
use crate::midi::{EndpointId, EndpointInfo, MidiSettings, PortSwap, DEFAULT_VELOCITY};
use crate::music::{HarmonicFieldKind, Key, Octave, ScaleType, Spelling};

/// Root configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ControllerConfig {
    /// Initial pad selection
    #[serde(default)]
    pub controller: PadConfig,
    /// MIDI transport settings
    #[serde(default)]
    pub midi: MidiConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ControllerConfig {
    /// Read and parse a YAML file. Values are not validated here.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Cannot read configuration {:?}", path))?;
        Self::from_yaml(&yaml).with_context(|| format!("In {:?}", path))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Invalid YAML configuration")
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Cannot encode configuration as YAML")
    }

    /// Write the configuration as YAML, replacing `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_yaml()?)
            .with_context(|| format!("Cannot write configuration {:?}", path))
    }

    /// Check every value, without applying anything
    pub fn validate(&self) -> Result<()> {
        self.selection()?;
        self.logging
            .level
            .parse::<tracing::Level>()
            .map_err(|_| anyhow!("Unknown log level: '{}'", self.logging.level))?;
        Ok(())
    }

    /// The pad selection described by the `controller` section
    pub fn selection(&self) -> Result<Selection> {
        let c = &self.controller;

        let spelling: Spelling = c.spelling.parse()?;
        let key: Key = c.key.parse()?;
        let scale_type: ScaleType = c.scale.parse()?;

        layout::validate_octaves(&c.octaves)?;
        layout::validate_octave(c.chord_octave).context("Invalid chord_octave")?;

        let fields = c
            .harmonic_fields
            .iter()
            .map(|f| f.parse::<HarmonicFieldKind>())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if !(1..=16).contains(&c.channel) {
            bail!("MIDI channel {} is outside 1-16", c.channel);
        }
        if !(1..=127).contains(&c.velocity) {
            bail!("Velocity {} is outside 1-127", c.velocity);
        }

        Ok(Selection {
            key: key.with_spelling(spelling),
            scale_type,
            octaves: c.octaves.clone(),
            chord_octave: c.chord_octave,
            fields,
            channel: c.channel - 1,
            velocity: c.velocity,
        })
    }

    /// Transport settings described by the `midi` section
    pub fn midi_settings(&self) -> MidiSettings {
        let m = &self.midi;
        MidiSettings {
            client_name: m.client_name.clone(),
            open_on_start: m.open_on_start,
            port_swap: m.port_swap,
            swap: m.swap,
            virtual_outputs: m.virtual_outputs.clone(),
            pinned: m.pinned.clone(),
        }
    }
}

/// Initial pad selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PadConfig {
    /// Key name (e.g., "C", "Bb", "F#")
    #[serde(default = "default_key")]
    pub key: String,
    /// Note naming: "flats" or "sharps"
    #[serde(default = "default_spelling")]
    pub spelling: String,
    /// Scale type (e.g., "major", "dorian", "harmonic minor")
    #[serde(default = "default_scale")]
    pub scale: String,
    /// Octaves on the pitch pads, ascending
    #[serde(default = "default_octaves")]
    pub octaves: Vec<Octave>,
    #[serde(default = "default_chord_octave")]
    pub chord_octave: Octave,
    /// "triad", "seventh" or both
    #[serde(default = "default_harmonic_fields")]
    pub harmonic_fields: Vec<String>,
    /// MIDI channel (1-16)
    #[serde(default = "default_channel")]
    pub channel: u8,
    #[serde(default = "default_velocity")]
    pub velocity: u8,
}

fn default_key() -> String {
    "C".to_string()
}
fn default_spelling() -> String {
    "flats".to_string()
}
fn default_scale() -> String {
    "major".to_string()
}
fn default_octaves() -> Vec<Octave> {
    DEFAULT_OCTAVES.to_vec()
}
fn default_chord_octave() -> Octave {
    DEFAULT_CHORD_OCTAVE
}
fn default_harmonic_fields() -> Vec<String> {
    HarmonicFieldKind::ALL
        .iter()
        .map(|f| f.name().to_string())
        .collect()
}
fn default_channel() -> u8 {
    1
}
fn default_velocity() -> u8 {
    DEFAULT_VELOCITY
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            spelling: default_spelling(),
            scale: default_scale(),
            octaves: default_octaves(),
            chord_octave: default_chord_octave(),
            harmonic_fields: default_harmonic_fields(),
            channel: default_channel(),
            velocity: default_velocity(),
        }
    }
}

/// MIDI transport settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MidiConfig {
    /// Name registered with the system MIDI service
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// Open every output at startup
    #[serde(default = "default_true")]
    pub open_on_start: bool,
    /// Start with port swap on
    #[serde(default)]
    pub port_swap: bool,
    /// Virtual outputs to create at startup
    #[serde(default = "default_virtual_outputs")]
    pub virtual_outputs: Vec<EndpointInfo>,
    /// Endpoint ids used by port swap
    #[serde(default)]
    pub swap: PortSwap,
    /// Fixed ids for destinations, by port name
    #[serde(default)]
    pub pinned: HashMap<String, EndpointId>,
}

fn default_client_name() -> String {
    "progression".to_string()
}
fn default_true() -> bool {
    true
}
fn default_virtual_outputs() -> Vec<EndpointInfo> {
    vec![EndpointInfo::new(MAIN_PAIR.output, DEFAULT_VIRTUAL_OUTPUT_NAME)]
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            open_on_start: true,
            port_swap: false,
            virtual_outputs: default_virtual_outputs(),
            swap: PortSwap::default(),
            pinned: HashMap::new(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    #[serde(default = "default_level")]
    pub level: String,
    /// Log file; while the terminal UI runs, logs go only here
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
controller:
  key: "Bb"
  spelling: flats
  scale: dorian
  octaves: [2, 3, 4]
  chord_octave: 3
  harmonic_fields: [seventh]
  channel: 10
  velocity: 100

midi:
  client_name: "stage"
  open_on_start: false
  port_swap: true
  virtual_outputs:
    - { id: 2500000, name: "Virtual Output Port" }
    - { id: 1500000, name: "Develop Port" }
  swap:
    develop: { input: 1200000, output: 1500000 }
    main: { input: 2200000, output: 2500000 }
  pinned:
    "IAC Driver Bus 1": 2200000

logging:
  level: debug
  file: "/tmp/progression.log"
"#;

        let config = ControllerConfig::from_yaml(yaml).unwrap();
        config.validate().unwrap();

        let selection = config.selection().unwrap();
        assert_eq!(selection.key.to_string(), "Bb");
        assert_eq!(selection.scale_type, ScaleType::Dorian);
        assert_eq!(selection.octaves, vec![2, 3, 4]);
        assert_eq!(selection.chord_octave, 3);
        assert_eq!(selection.fields, vec![HarmonicFieldKind::Seventh]);
        assert_eq!(selection.channel, 9);
        assert_eq!(selection.velocity, 100);

        let settings = config.midi_settings();
        assert_eq!(settings.client_name, "stage");
        assert!(!settings.open_on_start);
        assert!(settings.port_swap);
        assert_eq!(settings.virtual_outputs.len(), 2);
        assert_eq!(
            settings.pinned.get("IAC Driver Bus 1"),
            Some(&EndpointId(2_200_000))
        );

        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.file,
            Some(PathBuf::from("/tmp/progression.log"))
        );
    }

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ControllerConfig::default());

        let selection = config.selection().unwrap();
        assert_eq!(selection, Selection::default());

        let settings = config.midi_settings();
        assert_eq!(settings, MidiSettings::default());
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let yaml = r#"
controller:
  key: "A"
  scale: "natural minor"
"#;
        let config = ControllerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.controller.octaves, vec![1, 2, 3, 4, 5]);
        assert_eq!(config.controller.velocity, 90);

        let selection = config.selection().unwrap();
        assert_eq!(selection.scale_type, ScaleType::NaturalMinor);
        assert_eq!(selection.key.spelling(), Spelling::Flats);
    }

    #[test]
    fn test_spelling_overrides_key_name() {
        let yaml = r#"
controller:
  key: "Bb"
  spelling: sharps
"#;
        let config = ControllerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.selection().unwrap().key.to_string(), "A#");
    }

    #[test]
    fn test_extended_fields() {
        let config =
            ControllerConfig::from_yaml("controller: { harmonic_fields: [ninth, 13th] }").unwrap();
        assert_eq!(
            config.selection().unwrap().fields,
            vec![HarmonicFieldKind::Ninth, HarmonicFieldKind::Thirteenth]
        );
        assert_eq!(ControllerConfig::default().controller.harmonic_fields.len(), 5);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = [
            "controller: { key: H }",
            "controller: { scale: bebop }",
            "controller: { spelling: both }",
            "controller: { octaves: [] }",
            "controller: { octaves: [3, 2] }",
            "controller: { chord_octave: 12 }",
            "controller: { harmonic_fields: [fifteenth] }",
            "controller: { channel: 0 }",
            "controller: { channel: 17 }",
            "controller: { velocity: 0 }",
            "controller: { velocity: 128 }",
            "logging: { level: loud }",
        ];
        for yaml in cases {
            let config = ControllerConfig::from_yaml(yaml).unwrap();
            assert!(config.validate().is_err(), "accepted: {}", yaml);
        }
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = ControllerConfig::default();
        config.controller.key = "F#".to_string();
        config.midi.pinned.insert("Synth".to_string(), EndpointId(7));

        let yaml = config.to_yaml().unwrap();
        let parsed = ControllerConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
