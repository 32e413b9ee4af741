// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, warn, Level};

use progression::config::{ConfigWatcher, ControllerConfig, LoggingConfig};
use progression::control::{Keymap, PadController, Selection};
use progression::midi::{
    Conductor, Endpoints, MemoryTransport, MidiTransport, MidirTransport, SentLog,
};
use progression::music::{HarmonicFieldKind, Octave, Pitch, Scale, Spelling};
use progression::ui::{degree_numeral, App};

/// Loaded when present and no `--config` is given
const DEFAULT_CONFIG_FILE: &str = "progression.yaml";

/// Middle C
const TEST_NOTE: u8 = 60;

const TEST_HOLD: Duration = Duration::from_millis(500);

fn print_usage() {
    println!("Progression - Touch-pad MIDI controller");
    println!();
    println!("Usage: progression [OPTIONS] [COMMAND]");
    println!();
    println!("Commands:");
    println!("  --list-midi                      List MIDI destinations and virtual outputs");
    println!("  --scale <KEY> <SCALE> [OCTAVE]   Print a scale's pitches and harmonic fields");
    println!("  --test-note <ID|all>             Send middle C for 500 ms");
    println!("  --test-chord <DEGREE> [ID|all]   Play the triad on a degree of the configured scale");
    println!("  --help                           Show this help message");
    println!("  (none)                           Run the pad UI");
    println!();
    println!("Options:");
    println!("  --config <PATH>   Configuration file (default: {} when present)", DEFAULT_CONFIG_FILE);
    println!("  --offline         Use an in-memory transport instead of MIDI hardware");
    println!("  --watch           Reload the configuration file while the UI runs");
}

/// Options accepted alongside any command
#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    offline: bool,
    watch: bool,
}

/// Split the options out, leaving the command and its arguments
fn parse_options(args: &[String]) -> Result<(Options, Vec<String>)> {
    let mut options = Options::default();
    let mut command = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config = Some(PathBuf::from(path));
            }
            "--offline" => options.offline = true,
            "--watch" => options.watch = true,
            _ => command.push(arg.clone()),
        }
    }
    Ok((options, command))
}

/// Load the configuration: an explicit path must exist, the default is optional
fn load_config(options: &Options) -> Result<(ControllerConfig, Option<PathBuf>)> {
    let path = match &options.config {
        Some(path) => Some(path.clone()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };

    let config = match &path {
        Some(path) => ControllerConfig::load(path)?,
        None => ControllerConfig::default(),
    };
    config.validate()?;
    Ok((config, path))
}

/// Install the tracing subscriber.
///
/// While the UI owns the terminal, log lines go to the configured file or
/// nowhere.
fn init_logging(config: &LoggingConfig, ui: bool) -> Result<()> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| anyhow!("Invalid log level: {}", config.level))?;

    match (&config.file, ui) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {:?}", path))?;
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        (None, false) => {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .init();
        }
        (None, true) => {}
    }
    Ok(())
}

fn list_midi<T: MidiTransport>(transport: &T, config: &ControllerConfig) {
    println!("MIDI destinations:");
    let destinations = transport.destinations();
    if destinations.is_empty() {
        println!("  (none)");
    }
    for destination in destinations {
        println!("  {:>12}  {}", destination.id.value(), destination.name);
    }

    println!();
    println!("Virtual outputs (created at startup):");
    for output in &config.midi.virtual_outputs {
        println!("  {:>12}  {}", output.id.value(), output.name);
    }
}

fn print_scale(key: &str, scale_type: &str, octave: Octave) -> Result<()> {
    let scale = Scale::parse(key, scale_type)?;
    println!("{}", scale);
    println!();

    println!("Pitches (octave {}):", octave);
    for pitch in scale.pitches(&[octave]) {
        match pitch.midi_note() {
            Ok(note) => println!("  {:<5} {}", pitch.to_string(), note),
            Err(_) => println!("  {:<5} out of range", pitch.to_string()),
        }
    }

    for kind in HarmonicFieldKind::ALL {
        println!();
        println!("Harmonic field ({}):", kind);
        for (i, slot) in scale.harmonic_field(kind).slots().iter().enumerate() {
            let degree = degree_numeral(i + 1);
            match slot {
                Some(chord) => println!("  {:<5} {}", degree, chord),
                None => println!("  {:<5} -", degree),
            }
        }
    }
    Ok(())
}

/// Conductor with its outputs open even if the config says not to open on start
fn open_conductor<T: MidiTransport>(transport: T, config: &ControllerConfig) -> Conductor<T> {
    let mut conductor = Conductor::start(transport, &config.midi_settings());
    if !conductor.is_output_open() {
        conductor.set_output_open(true);
    }
    conductor
}

fn send_test_note<T: MidiTransport>(
    transport: T,
    config: &ControllerConfig,
    endpoints: &Endpoints,
) -> Result<()> {
    let selection = config.selection()?;
    let mut conductor = open_conductor(transport, config);
    let pitch = Pitch::from_midi_note(TEST_NOTE, Spelling::Sharps);

    println!("Sending {} to {}...", pitch, endpoints);
    conductor.note_on(&pitch, selection.velocity, selection.channel, endpoints)?;
    thread::sleep(TEST_HOLD);
    conductor.note_off(&pitch, selection.channel, endpoints)?;
    println!("Test complete!");

    conductor.set_output_open(false);
    Ok(())
}

fn send_test_chord<T: MidiTransport>(
    transport: T,
    config: &ControllerConfig,
    degree: usize,
    endpoints: &Endpoints,
) -> Result<()> {
    let selection: Selection = config.selection()?;
    let scale = Scale::new(selection.key, selection.scale_type);
    let field = scale.harmonic_field(HarmonicFieldKind::Triad);
    let chord = *field
        .degree(degree)
        .ok_or_else(|| anyhow!("{} has no triad on degree {}", scale, degree))?;

    let mut conductor = open_conductor(transport, config);
    let octave = selection.chord_octave;

    println!("Playing {} ({}) at octave {} to {}...", chord, degree_numeral(degree), octave, endpoints);
    conductor.chord_on(&chord, octave, selection.velocity, selection.channel, endpoints)?;
    thread::sleep(TEST_HOLD);
    conductor.chord_off(&chord, octave, selection.channel, endpoints)?;
    println!("Test complete!");

    conductor.set_output_open(false);
    Ok(())
}

fn run_ui<T: MidiTransport>(
    transport: T,
    config: &ControllerConfig,
    config_path: Option<&Path>,
    watch: bool,
) -> Result<()> {
    let conductor = Conductor::start(transport, &config.midi_settings());
    let mut controller = PadController::new(conductor, config.selection()?);

    let watcher = match (watch, config_path) {
        (true, Some(path)) => Some(ConfigWatcher::new(path, None)?),
        (true, None) => {
            warn!("--watch needs a configuration file; not watching");
            None
        }
        (false, _) => None,
    };

    let result = {
        let mut app = App::new(Keymap::with_defaults())
            .context("Failed to set up the terminal")?;
        app.run(&mut controller, watcher.as_ref())
    };

    // Nothing may be left sounding once the terminal is restored
    controller.release_all()?;
    controller.set_output_open(false)?;
    info!("Exited cleanly");
    result.context("Terminal UI failed")
}

fn print_sent(log: &SentLog) {
    let sent = log.sent();
    println!();
    println!("Sent {} message(s):", sent.len());
    for message in sent {
        match message.event() {
            Some(event) => println!("  {:>12}  {}", message.endpoint.value(), event),
            None => println!("  {:>12}  {:02X?}", message.endpoint.value(), message.bytes),
        }
    }
}

fn parse_endpoints(arg: Option<&String>) -> Result<Endpoints> {
    match arg {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("Invalid endpoint: {}", arg)),
        None => Ok(Endpoints::All),
    }
}

/// Run a MIDI command on `transport`, or the pad UI when there is none
fn run_command<T: MidiTransport>(
    transport: T,
    command: &[String],
    config: &ControllerConfig,
    config_path: Option<&Path>,
    options: &Options,
) -> Result<()> {
    let Some(first) = command.first() else {
        return run_ui(transport, config, config_path, options.watch);
    };

    match first.as_str() {
        "--list-midi" => {
            list_midi(&transport, config);
            Ok(())
        }
        "--test-note" => {
            if command.len() < 2 {
                eprintln!("Error: --test-note requires an endpoint id or 'all'");
                eprintln!("Use --list-midi to see available destinations");
                std::process::exit(1);
            }
            let endpoints = parse_endpoints(command.get(1))?;
            send_test_note(transport, config, &endpoints)
        }
        "--test-chord" => {
            if command.len() < 2 {
                eprintln!("Error: --test-chord requires a scale degree");
                std::process::exit(1);
            }
            let degree: usize = command[1]
                .parse()
                .map_err(|_| anyhow!("Invalid scale degree: {}", command[1]))?;
            let endpoints = parse_endpoints(command.get(2))?;
            send_test_chord(transport, config, degree, &endpoints)
        }
        other => bail!("Unknown option: {}", other),
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let (options, command) = parse_options(&args)?;

    match command.first().map(String::as_str) {
        Some("--help") | Some("-h") => {
            print_usage();
            return Ok(());
        }
        Some("--scale") => {
            if command.len() < 3 {
                eprintln!("Error: --scale requires a key and a scale type");
                std::process::exit(1);
            }
            let octave: Octave = match command.get(3) {
                Some(arg) => arg
                    .parse()
                    .map_err(|_| anyhow!("Invalid octave: {}", arg))?,
                None => 4,
            };
            return print_scale(&command[1], &command[2], octave);
        }
        Some("--list-midi") | Some("--test-note") | Some("--test-chord") | None => {}
        Some(other) => {
            eprintln!("Unknown option: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }

    let (config, config_path) = load_config(&options)?;
    init_logging(&config.logging, command.is_empty())?;
    info!("Starting with {:?}", config_path);

    if options.offline {
        let transport = MemoryTransport::new();
        let log = transport.log();
        run_command(transport, &command, &config, config_path.as_deref(), &options)?;
        if !command.is_empty() {
            print_sent(&log);
        }
    } else {
        let transport =
            MidirTransport::new(config.midi.client_name.clone(), config.midi.pinned.clone());
        run_command(transport, &command, &config, config_path.as_deref(), &options)?;
    }

    Ok(())
}
