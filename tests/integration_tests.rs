// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for Progression
//!
//! These tests verify that the theory engine, the dispatch layer and the pad
//! controller work together, using the in-memory transport in place of MIDI
//! hardware.

use std::fs;

use progression::config::{validate_config, ControllerConfig};
use progression::control::{PadController, Selection};
use progression::midi::endpoint::{DEVELOP_PAIR, MAIN_PAIR};
use progression::midi::{
    Conductor, EndpointId, EndpointInfo, Endpoints, MemoryTransport, MidiEvent, MidiSettings,
    MidiTransport, PortSwap, StatusType,
};
use progression::music::{
    HarmonicFieldKind, Key, Note, Pitch, Scale, ScaleType, Spelling,
};
use progression::Error;
use tempfile::tempdir;

fn synth() -> EndpointInfo {
    EndpointInfo::new(7, "Synth")
}

fn conductor() -> Conductor<MemoryTransport> {
    let transport = MemoryTransport::with_destinations(vec![synth()]);
    Conductor::start(transport, &MidiSettings::default())
}

fn sent(conductor: &mut Conductor<MemoryTransport>) -> Vec<(EndpointId, MidiEvent)> {
    let events = conductor.transport().sent_events();
    conductor.transport_mut().take_sent();
    events
}

fn all_keys() -> Vec<Key> {
    let mut keys = Key::all(Spelling::Sharps).to_vec();
    keys.extend(Key::all(Spelling::Flats));
    keys
}

/// Every scale yields one pitch per degree per octave, ascending
#[test]
fn test_pitch_lists_for_every_scale() {
    let octaves = [1, 2, 3, 4, 5];
    for key in all_keys() {
        for scale_type in ScaleType::ALL {
            let scale = Scale::new(key, scale_type);
            let pitches = scale.pitches(&octaves);

            assert_eq!(pitches.len(), octaves.len() * scale_type.degree_count());
            assert!(
                pitches.windows(2).all(|w| w[0].semitones() <= w[1].semitones()),
                "{} is not ascending",
                scale
            );
        }
    }
}

/// Harmonic fields have one slot per degree and only use scale tones
#[test]
fn test_harmonic_fields_stay_in_scale() {
    for key in all_keys() {
        for scale_type in ScaleType::ALL {
            let scale = Scale::new(key, scale_type);
            for kind in HarmonicFieldKind::ALL {
                let field = scale.harmonic_field(kind);
                assert_eq!(field.len(), scale_type.degree_count());

                for (degree, chord) in field.present() {
                    for pitch in chord.pitches(4) {
                        assert!(
                            scale.contains(pitch.note()),
                            "{} on degree {} of {} leaves the scale",
                            chord,
                            degree,
                            scale
                        );
                    }
                }
            }
        }
    }
}

/// Voicing a chord and measuring back from the root gives its intervals
#[test]
fn test_chord_voicing_keeps_intervals() {
    let scale = Scale::new(Key::new(Note::E, Spelling::Flats), ScaleType::HarmonicMinor);
    for kind in HarmonicFieldKind::ALL {
        for (_, chord) in scale.harmonic_field(kind).present() {
            let pitches = chord.pitches(3);
            let offsets: Vec<i32> = pitches.iter().map(|p| p.interval_from(&pitches[0])).collect();
            let expected: Vec<i32> = chord.intervals().iter().map(|&i| i as i32).collect();
            assert_eq!(offsets, expected);
        }
    }
}

#[test]
fn test_c_major_scenarios() {
    let scale = Scale::parse("C", "major").unwrap();
    let names: Vec<String> = scale.pitches(&[4]).iter().map(|p| p.to_string()).collect();
    assert_eq!(names, vec!["C4", "D4", "E4", "F4", "G4", "A4", "B4"]);

    let triads = scale.harmonic_field(HarmonicFieldKind::Triad);
    let tonic: Vec<Note> = triads.degree(1).unwrap().pitches(4).iter().map(|p| p.note()).collect();
    assert_eq!(tonic, vec![Note::C, Note::E, Note::G]);
    let leading: Vec<Note> = triads.degree(7).unwrap().pitches(4).iter().map(|p| p.note()).collect();
    assert_eq!(leading, vec![Note::B, Note::D, Note::F]);
}

/// Chord on then off at octave 3 on channel 0
#[test]
fn test_chord_dispatch_scenario() {
    let mut conductor = conductor();
    let chord = *Scale::parse("C", "major")
        .unwrap()
        .harmonic_field(HarmonicFieldKind::Triad)
        .degree(1)
        .unwrap();
    let target = Endpoints::single(EndpointId(7));

    conductor.chord_on(&chord, 3, 90, 0, &target).unwrap();
    conductor.chord_off(&chord, 3, 0, &target).unwrap();

    let events: Vec<MidiEvent> = sent(&mut conductor).into_iter().map(|(_, e)| e).collect();
    assert_eq!(
        events,
        vec![
            MidiEvent::note_on(0, 48, 90).unwrap(),
            MidiEvent::note_on(0, 52, 90).unwrap(),
            MidiEvent::note_on(0, 55, 90).unwrap(),
            MidiEvent::note_off(0, 48).unwrap(),
            MidiEvent::note_off(0, 52).unwrap(),
            MidiEvent::note_off(0, 55).unwrap(),
        ]
    );
}

/// A pitch that lands on note 131 is reported and never sent
#[test]
fn test_out_of_range_pitch_is_not_sent() {
    let mut conductor = conductor();
    let pitch = Pitch::new(Key::new(Note::B, Spelling::Sharps), 9);

    let result = conductor.note_on(&pitch, 90, 0, &Endpoints::All);
    assert!(matches!(
        result,
        Err(Error::PitchOutOfRange { note_number: 131, .. })
    ));
    assert!(sent(&mut conductor).is_empty());
}

#[test]
fn test_resolve_endpoints_without_swap_is_identity() {
    let conductor = conductor();
    let cases = [
        Endpoints::All,
        Endpoints::single(MAIN_PAIR.output),
        Endpoints::single(DEVELOP_PAIR.output),
        Endpoints::Only(vec![EndpointId(1), EndpointId(2)]),
    ];
    for endpoints in cases {
        assert_eq!(conductor.resolve_endpoints(&endpoints), endpoints);
    }
}

#[test]
fn test_resolve_endpoints_with_swap() {
    let mut conductor = conductor();
    conductor.set_port_swapped(true);

    assert_eq!(
        conductor.resolve_endpoints(&Endpoints::single(MAIN_PAIR.output)),
        Endpoints::single(MAIN_PAIR.input)
    );
    assert_eq!(
        conductor.resolve_endpoints(&Endpoints::single(DEVELOP_PAIR.output)),
        Endpoints::single(DEVELOP_PAIR.input)
    );

    let unchanged = [
        Endpoints::All,
        Endpoints::single(EndpointId(7)),
        Endpoints::single(MAIN_PAIR.input),
        Endpoints::Only(vec![MAIN_PAIR.output, DEVELOP_PAIR.output]),
    ];
    for endpoints in unchanged {
        assert_eq!(conductor.resolve_endpoints(&endpoints), endpoints);
    }
}

/// With swap on, a message aimed at the main virtual output goes to its input
#[test]
fn test_swapped_send_reaches_main_input() {
    let transport = MemoryTransport::with_destinations(vec![EndpointInfo::new(
        MAIN_PAIR.input,
        "Main Input",
    )]);
    let mut conductor = Conductor::new(transport, PortSwap::default());
    conductor.set_output_open(true);
    conductor.set_port_swapped(true);

    let middle_c = Pitch::from_midi_note(60, Spelling::Sharps);
    conductor
        .note_on(&middle_c, 90, 0, &Endpoints::single(MAIN_PAIR.output))
        .unwrap();

    let events = sent(&mut conductor);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, MAIN_PAIR.input);
}

#[test]
fn test_send_to_all_reaches_every_open_endpoint() {
    let mut conductor = conductor();
    let middle_c = Pitch::from_midi_note(60, Spelling::Sharps);
    conductor.note_on(&middle_c, 90, 0, &Endpoints::All).unwrap();

    let mut endpoints: Vec<EndpointId> = sent(&mut conductor).into_iter().map(|(id, _)| id).collect();
    endpoints.sort();
    assert_eq!(endpoints, vec![EndpointId(7), MAIN_PAIR.output]);
}

#[test]
fn test_closed_output_sends_nothing() {
    let mut conductor = conductor();
    conductor.set_output_open(false);
    assert!(conductor.transport().open_endpoints().is_empty());

    let middle_c = Pitch::from_midi_note(60, Spelling::Sharps);
    conductor.note_on(&middle_c, 90, 0, &Endpoints::All).unwrap();
    assert!(sent(&mut conductor).is_empty());
}

/// Pads driven end to end from a configuration file
#[test]
fn test_config_file_to_pads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("progression.yaml");
    fs::write(
        &path,
        r#"
controller:
  key: "D"
  scale: "dorian"
  octaves: [3]
  chord_octave: 3
  harmonic_fields: ["seventh"]
  channel: 2
  velocity: 100
midi:
  open_on_start: true
"#,
    )
    .unwrap();

    let config = validate_config(&path).unwrap();
    let conductor = Conductor::start(
        MemoryTransport::with_destinations(vec![synth()]),
        &config.midi_settings(),
    );
    let mut pads = PadController::new(conductor, config.selection().unwrap());

    assert_eq!(pads.layout().pitches().len(), 7);
    assert_eq!(pads.layout().chord(0).unwrap().chord.to_string(), "Dm7");

    let synth_only = Endpoints::single(EndpointId(7));
    pads.press_pitch(0, &synth_only).unwrap();
    pads.press_chord(0, &synth_only).unwrap();
    pads.release_all().unwrap();

    let events = pads.conductor().transport().sent_events();
    assert_eq!(events.len(), 10);
    assert!(events.iter().all(|(id, e)| *id == EndpointId(7) && e.channel() == 1));
    // D3, then Dm7 at octave 3
    assert_eq!(events[0].1, MidiEvent::note_on(1, 50, 100).unwrap());
    let chord_notes: Vec<u8> = events[1..5].iter().map(|(_, e)| e.data1()).collect();
    assert_eq!(chord_notes, vec![50, 53, 57, 60]);
    assert!(events[5..].iter().all(|(_, e)| e.status() == StatusType::NoteOff));
}

#[test]
fn test_saved_config_loads_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saved.yaml");

    let mut config = ControllerConfig::default();
    config.controller.key = "F#".to_string();
    config.controller.spelling = "sharps".to_string();
    config.midi.port_swap = true;
    config.save(&path).unwrap();

    let loaded = validate_config(&path).unwrap();
    assert_eq!(loaded.selection().unwrap().key.to_string(), "F#");
    assert!(loaded.midi_settings().port_swap);
}

#[test]
fn test_defaults_agree() {
    let config = ControllerConfig::default();
    assert_eq!(config.selection().unwrap(), Selection::default());
}
